//! Defines the expense store trait.

use crate::{
    Error,
    models::{DatabaseID, Expense, ExpenseData},
};

/// Creates, retrieves, updates and deletes expense records.
pub trait ExpenseStore {
    /// Create a new expense and add it to the store.
    ///
    /// The store assigns the ID of the returned expense.
    fn create(&self, expense: ExpenseData) -> Result<Expense, Error>;

    /// Get an expense by its ID.
    fn get(&self, expense_id: DatabaseID) -> Result<Expense, Error>;

    /// Get all expenses in the store's natural return order.
    fn get_all(&self) -> Result<Vec<Expense>, Error>;

    /// Replace every field of the expense with `expense_id`.
    fn update(&self, expense_id: DatabaseID, expense: ExpenseData) -> Result<Expense, Error>;

    /// Remove the expense with `expense_id` from the store.
    fn delete(&self, expense_id: DatabaseID) -> Result<(), Error>;
}
