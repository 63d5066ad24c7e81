use std::collections::HashMap;
use std::sync::Arc;

use crate::types::RowValues;

/// A row from a database query result.
///
/// Column names and the name-to-index map are shared by every row of the
/// `ResultSet` the row came from.
#[derive(Debug, Clone)]
pub struct CustomDbRow {
    /// The column names for this row (shared across all rows in a result set)
    pub column_names: Arc<Vec<String>>,
    /// The values for this row
    pub rows: Vec<RowValues>,
    #[doc(hidden)]
    pub(crate) column_index: Arc<HashMap<String, usize>>,
}

pub(crate) fn index_columns(column_names: &[String]) -> Arc<HashMap<String, usize>> {
    Arc::new(
        column_names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect(),
    )
}

impl CustomDbRow {
    /// Create a new database row
    ///
    /// # Arguments
    ///
    /// * `column_names` - The column names
    /// * `rows` - The values for this row
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>, rows: Vec<RowValues>) -> Self {
        let column_index = index_columns(&column_names);
        Self {
            column_names,
            rows,
            column_index,
        }
    }

    /// Get the index of a column by name
    #[must_use]
    pub fn get_column_index(&self, column_name: &str) -> Option<usize> {
        self.column_index.get(column_name).copied()
    }

    /// Get a value from the row by column name
    ///
    /// Returns `None` if the column wasn't found.
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&RowValues> {
        self.get_column_index(column_name)
            .and_then(|idx| self.rows.get(idx))
    }

    /// Get a value from the row by column index
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&RowValues> {
        self.rows.get(index)
    }
}
