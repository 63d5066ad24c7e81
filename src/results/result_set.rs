use std::collections::HashMap;
use std::sync::Arc;

use super::row::{CustomDbRow, index_columns};
use crate::types::RowValues;

/// A result set from a database query
///
/// This struct represents the result of a database query,
/// containing the rows returned by the query and metadata.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    /// The rows returned by the query
    pub results: Vec<CustomDbRow>,
    /// The number of rows affected (for DML statements) or returned
    pub rows_affected: usize,
    column_names: Option<Arc<Vec<String>>>,
    column_index: Option<Arc<HashMap<String, usize>>>,
}

impl ResultSet {
    /// Create a new result set with preallocated capacity for `capacity` rows
    #[must_use]
    pub fn with_capacity(capacity: usize) -> ResultSet {
        ResultSet {
            results: Vec::with_capacity(capacity),
            ..ResultSet::default()
        }
    }

    /// Result of a statement that returns no columns, only an affected-row count
    #[must_use]
    pub fn with_rows_affected(rows_affected: usize) -> ResultSet {
        ResultSet {
            rows_affected,
            ..ResultSet::default()
        }
    }

    /// Set the column names for this result set (to be shared by all rows)
    pub fn set_column_names(&mut self, column_names: Arc<Vec<String>>) {
        self.column_index = Some(index_columns(&column_names));
        self.column_names = Some(column_names);
    }

    /// Get the column names for this result set
    #[must_use]
    pub fn get_column_names(&self) -> Option<&Arc<Vec<String>>> {
        self.column_names.as_ref()
    }

    /// Add a row to the result set.
    ///
    /// Rows are only recorded once column names have been set.
    pub fn add_row_values(&mut self, row_values: Vec<RowValues>) {
        if let (Some(column_names), Some(column_index)) = (&self.column_names, &self.column_index)
        {
            self.results.push(CustomDbRow {
                column_names: Arc::clone(column_names),
                rows: row_values,
                column_index: Arc::clone(column_index),
            });
            self.rows_affected += 1;
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }
}

impl IntoIterator for ResultSet {
    type Item = CustomDbRow;
    type IntoIter = std::vec::IntoIter<CustomDbRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_share_column_names() {
        let mut rs = ResultSet::with_capacity(2);
        rs.set_column_names(Arc::new(vec!["id".to_string()]));
        rs.add_row_values(vec![RowValues::Int(1)]);
        rs.add_row_values(vec![RowValues::Int(2)]);

        assert_eq!(rs.len(), 2);
        assert_eq!(rs.rows_affected, 2);
        assert!(Arc::ptr_eq(
            &rs.results[0].column_names,
            &rs.results[1].column_names
        ));
        assert_eq!(rs.results[1].get("id"), Some(&RowValues::Int(2)));
    }

    #[test]
    fn dml_count_without_rows() {
        let rs = ResultSet::with_rows_affected(3);
        assert!(rs.is_empty());
        assert_eq!(rs.rows_affected, 3);
        assert!(rs.get_column_names().is_none());
    }

    #[test]
    fn rows_without_columns_are_ignored() {
        let mut rs = ResultSet::default();
        rs.add_row_values(vec![RowValues::Null]);
        assert!(rs.is_empty());
    }
}
