//! Serializes the full expense record set to a flat CSV table and serves it
//! as a file download.

use axum::{
    extract::State,
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};

use crate::{AppState, Error, models::Expense, stores::ExpenseStore};

/// The header row of the CSV export.
const CSV_HEADER: [&str; 5] = ["ID", "Title", "Amount", "Category", "Date"];

/// Write `expenses` as a CSV table.
///
/// The first line is the header `ID,Title,Amount,Category,Date` and each
/// subsequent line encodes one expense. Fields containing the delimiter, the
/// quote character or line breaks are quoted per the usual CSV rules. An
/// empty record set yields a header-only file.
///
/// # Errors
/// This function will return an [Error::CsvError] if a record cannot be
/// written.
pub fn write_expenses_csv(expenses: &[Expense]) -> Result<Vec<u8>, Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(CSV_HEADER)
        .map_err(|error| Error::CsvError(error.to_string()))?;

    for expense in expenses {
        writer
            .write_record([
                expense.id.to_string(),
                expense.title.clone(),
                expense.amount.to_string(),
                expense.category.clone(),
                expense.date.to_string(),
            ])
            .map_err(|error| Error::CsvError(error.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|error| Error::CsvError(error.to_string()))
}

/// A route handler for downloading every expense as a CSV file.
pub async fn export_csv_endpoint<E>(State(state): State<AppState<E>>) -> Response
where
    E: ExpenseStore + Clone + Send + Sync + 'static,
{
    let expenses = match state.expense_store.get_all() {
        Ok(expenses) => expenses,
        Err(error) => {
            tracing::error!("An unexpected error occurred while listing expenses: {error}");
            return error.into_response();
        }
    };

    match write_expenses_csv(&expenses) {
        Ok(bytes) => (
            [
                (CONTENT_TYPE, "text/csv"),
                (CONTENT_DISPOSITION, "attachment; filename=expenses.csv"),
            ],
            bytes,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while writing the CSV export: {error}");
            error.into_response()
        }
    }
}
