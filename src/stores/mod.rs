//! Contains traits and implementations for objects that store the domain [models](crate::models).

mod expense;

pub mod sqlite;

pub use expense::ExpenseStore;
pub use sqlite::SQLiteExpenseStore;
