//! Implements a SQLite backed expense store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row};

use crate::{
    Error,
    db::{CreateTable, MapRow},
    models::{DatabaseID, Expense, ExpenseData},
    stores::ExpenseStore,
};

/// Creates, retrieves, updates and deletes expense records to/from a SQLite
/// database.
#[derive(Debug, Clone)]
pub struct SQLiteExpenseStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteExpenseStore {
    /// Create a new expense store with a SQLite database.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn lock_connection(&self) -> Result<std::sync::MutexGuard<'_, Connection>, Error> {
        self.connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {}", error);
            Error::DatabaseLockError
        })
    }
}

impl ExpenseStore for SQLiteExpenseStore {
    /// Create an expense in the database.
    ///
    /// # Errors
    /// This function will return an error if there is an SQL error.
    fn create(&self, expense: ExpenseData) -> Result<Expense, Error> {
        let connection = self.lock_connection()?;
        connection.execute(
            "INSERT INTO expense (title, amount, category, date) VALUES (?1, ?2, ?3, ?4);",
            (
                &expense.title,
                expense.amount,
                &expense.category,
                &expense.date,
            ),
        )?;

        let id = connection.last_insert_rowid();

        Ok(Expense {
            id,
            title: expense.title,
            amount: expense.amount,
            category: expense.category,
            date: expense.date,
        })
    }

    /// Retrieve the expense with `expense_id` from the database.
    ///
    /// # Errors
    /// This function will return an [Error::NotFound] if there is no expense
    /// with `expense_id`, or an error if there is an SQL error.
    fn get(&self, expense_id: DatabaseID) -> Result<Expense, Error> {
        self.lock_connection()?
            .prepare("SELECT id, title, amount, category, date FROM expense WHERE id = :id;")?
            .query_row(&[(":id", &expense_id)], SQLiteExpenseStore::map_row)
            .map_err(|error| error.into())
    }

    /// Retrieve all expenses in the database.
    ///
    /// Rows come back in the store's natural return order.
    ///
    /// # Errors
    /// This function will return an error if there is an SQL error.
    fn get_all(&self) -> Result<Vec<Expense>, Error> {
        self.lock_connection()?
            .prepare("SELECT id, title, amount, category, date FROM expense;")?
            .query_map([], SQLiteExpenseStore::map_row)?
            .map(|maybe_expense| maybe_expense.map_err(|error| error.into()))
            .collect()
    }

    /// Replace every field of the expense with `expense_id` in the database.
    ///
    /// # Errors
    /// This function will return an [Error::UpdateMissingExpense] if the
    /// expense doesn't exist, or an error if there is an SQL error.
    fn update(&self, expense_id: DatabaseID, expense: ExpenseData) -> Result<Expense, Error> {
        let rows_affected = self.lock_connection()?.execute(
            "UPDATE expense SET title = ?1, amount = ?2, category = ?3, date = ?4 WHERE id = ?5;",
            (
                &expense.title,
                expense.amount,
                &expense.category,
                &expense.date,
                expense_id,
            ),
        )?;

        if rows_affected == 0 {
            return Err(Error::UpdateMissingExpense);
        }

        Ok(Expense {
            id: expense_id,
            title: expense.title,
            amount: expense.amount,
            category: expense.category,
            date: expense.date,
        })
    }

    /// Delete the expense with `expense_id` from the database.
    ///
    /// # Errors
    /// This function will return an [Error::DeleteMissingExpense] if the
    /// expense doesn't exist, or an error if there is an SQL error.
    fn delete(&self, expense_id: DatabaseID) -> Result<(), Error> {
        let rows_affected = self
            .lock_connection()?
            .execute("DELETE FROM expense WHERE id = ?1;", [expense_id])?;

        if rows_affected == 0 {
            return Err(Error::DeleteMissingExpense);
        }

        Ok(())
    }
}

impl CreateTable for SQLiteExpenseStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS expense (
                id INTEGER PRIMARY KEY,
                title TEXT NOT NULL,
                amount REAL NOT NULL,
                category TEXT NOT NULL,
                date TEXT NOT NULL
            );",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteExpenseStore {
    type ReturnType = Expense;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        Ok(Self::ReturnType {
            id: row.get(offset)?,
            title: row.get(offset + 1)?,
            amount: row.get(offset + 2)?,
            category: row.get(offset + 3)?,
            date: row.get(offset + 4)?,
        })
    }
}

#[cfg(test)]
mod expense_store_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use time::macros::date;

    use crate::{Error, db::initialize, models::ExpenseData};

    use super::{ExpenseStore, SQLiteExpenseStore};

    fn get_test_store() -> SQLiteExpenseStore {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let connection = Arc::new(Mutex::new(connection));

        SQLiteExpenseStore::new(connection.clone())
    }

    fn sample_expense_data() -> ExpenseData {
        ExpenseData {
            title: "Weekly groceries".to_owned(),
            amount: 42.75,
            category: "Food".to_owned(),
            date: date!(2024 - 01 - 05),
        }
    }

    #[test]
    fn create_expense_succeeds() {
        let store = get_test_store();
        let expense_data = sample_expense_data();

        let expense = store.create(expense_data.clone()).unwrap();

        assert!(expense.id > 0);
        assert_eq!(expense.title, expense_data.title);
        assert_eq!(expense.amount, expense_data.amount);
        assert_eq!(expense.category, expense_data.category);
        assert_eq!(expense.date, expense_data.date);
    }

    #[test]
    fn get_expense_succeeds() {
        let store = get_test_store();
        let inserted_expense = store.create(sample_expense_data()).unwrap();

        let selected_expense = store.get(inserted_expense.id);

        assert_eq!(Ok(inserted_expense), selected_expense);
    }

    #[test]
    fn get_expense_with_invalid_id_returns_not_found() {
        let store = get_test_store();
        let inserted_expense = store.create(sample_expense_data()).unwrap();

        let selected_expense = store.get(inserted_expense.id + 123);

        assert_eq!(selected_expense, Err(Error::NotFound));
    }

    #[test]
    fn get_all_returns_expenses_in_insertion_order() {
        let store = get_test_store();

        let first = store.create(sample_expense_data()).unwrap();
        let second = store
            .create(ExpenseData {
                title: "Train ticket".to_owned(),
                amount: 12.5,
                category: "Travel".to_owned(),
                date: date!(2024 - 01 - 06),
            })
            .unwrap();

        let selected_expenses = store.get_all().unwrap();

        assert_eq!(selected_expenses, vec![first, second]);
    }

    #[test]
    fn update_replaces_all_fields() {
        let store = get_test_store();
        let inserted_expense = store.create(sample_expense_data()).unwrap();

        let replacement = ExpenseData {
            title: "Monthly groceries".to_owned(),
            amount: 180.0,
            category: "Household".to_owned(),
            date: date!(2024 - 02 - 01),
        };
        let updated_expense = store
            .update(inserted_expense.id, replacement.clone())
            .unwrap();

        assert_eq!(updated_expense.id, inserted_expense.id);
        assert_eq!(updated_expense.title, replacement.title);
        assert_eq!(updated_expense.amount, replacement.amount);
        assert_eq!(updated_expense.category, replacement.category);
        assert_eq!(updated_expense.date, replacement.date);
        assert_eq!(store.get(inserted_expense.id), Ok(updated_expense));
    }

    #[test]
    fn update_missing_expense_returns_error() {
        let store = get_test_store();

        let result = store.update(999, sample_expense_data());

        assert_eq!(result, Err(Error::UpdateMissingExpense));
    }

    #[test]
    fn delete_removes_expense() {
        let store = get_test_store();
        let inserted_expense = store.create(sample_expense_data()).unwrap();

        store.delete(inserted_expense.id).unwrap();

        assert_eq!(store.get(inserted_expense.id), Err(Error::NotFound));
        assert_eq!(store.get_all().unwrap(), vec![]);
    }

    #[test]
    fn delete_missing_expense_returns_error() {
        let store = get_test_store();

        let result = store.delete(999);

        assert_eq!(result, Err(Error::DeleteMissingExpense));
    }
}
