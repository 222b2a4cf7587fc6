//! This file defines the `Expense` type, the sole record type of the
//! application, and the data needed to create or replace one.

use serde::{Deserialize, Serialize};
use time::Date;

/// Alias for the integer type used for database primary keys.
pub type DatabaseID = i64;

/// An expense record, i.e. an event where money was spent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// The ID of the expense, assigned by the store on creation.
    pub id: DatabaseID,

    /// A short text label describing the expense.
    pub title: String,

    /// The amount of money spent.
    pub amount: f64,

    /// A free-text tag for grouping expenses, e.g. "Groceries".
    pub category: String,

    /// The calendar date the expense occurred.
    pub date: Date,
}

/// The data needed to create an expense or fully replace an existing one.
///
/// This is an [Expense] without an ID. Updates replace every field, there are
/// no partial updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseData {
    /// A short text label describing the expense.
    pub title: String,

    /// The amount of money spent.
    pub amount: f64,

    /// A free-text tag for grouping expenses.
    pub category: String,

    /// The calendar date the expense occurred.
    pub date: Date,
}
