//! This file defines the API routes for creating, listing, updating and
//! deleting expenses.

use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    models::{DatabaseID, ExpenseData},
    stores::ExpenseStore,
};

/// The JSON body confirming that an expense was deleted.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteConfirmation {
    /// A human readable confirmation message.
    pub message: String,
}

/// A route handler for creating a new expense.
///
/// The store assigns the ID and the stored expense is echoed back to the
/// client.
pub async fn create_expense_endpoint<E>(
    State(state): State<AppState<E>>,
    Json(expense_data): Json<ExpenseData>,
) -> Response
where
    E: ExpenseStore + Clone + Send + Sync + 'static,
{
    match state.expense_store.create(expense_data) {
        Ok(expense) => Json(expense).into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating an expense: {error}");
            error.into_response()
        }
    }
}

/// A route handler for listing every expense.
pub async fn get_expenses_endpoint<E>(State(state): State<AppState<E>>) -> Response
where
    E: ExpenseStore + Clone + Send + Sync + 'static,
{
    match state.expense_store.get_all() {
        Ok(expenses) => Json(expenses).into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while listing expenses: {error}");
            error.into_response()
        }
    }
}

/// A route handler for replacing every field of an existing expense.
pub async fn update_expense_endpoint<E>(
    Path(expense_id): Path<DatabaseID>,
    State(state): State<AppState<E>>,
    Json(expense_data): Json<ExpenseData>,
) -> Response
where
    E: ExpenseStore + Clone + Send + Sync + 'static,
{
    match state.expense_store.update(expense_id, expense_data) {
        Ok(expense) => Json(expense).into_response(),
        Err(error @ Error::UpdateMissingExpense) => error.into_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating expense {expense_id}: {error}"
            );
            error.into_response()
        }
    }
}

/// A route handler for deleting an expense.
pub async fn delete_expense_endpoint<E>(
    Path(expense_id): Path<DatabaseID>,
    State(state): State<AppState<E>>,
) -> Response
where
    E: ExpenseStore + Clone + Send + Sync + 'static,
{
    match state.expense_store.delete(expense_id) {
        Ok(_) => Json(DeleteConfirmation {
            message: "Expense deleted successfully".to_owned(),
        })
        .into_response(),
        Err(error @ Error::DeleteMissingExpense) => error.into_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting expense {expense_id}: {error}"
            );
            error.into_response()
        }
    }
}
