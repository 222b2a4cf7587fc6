//! Implements a struct that holds the state of the REST server.

use std::marker::{Send, Sync};

use crate::stores::ExpenseStore;

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState<E>
where
    E: ExpenseStore + Send + Sync,
{
    /// The store for managing [expenses](crate::models::Expense).
    pub expense_store: E,
}

impl<E> AppState<E>
where
    E: ExpenseStore + Send + Sync,
{
    /// Create a new [AppState].
    pub fn new(expense_store: E) -> Self {
        Self { expense_store }
    }
}
