//! Column/value pairs passed to the CRUD primitives
//!
//! A [`Filter`] constrains `SELECT`, `COUNT` and `DELETE` statements and
//! supplies the row for `INSERT`. Column names are validated against the
//! manager's schema before they reach SQL text; values are only ever bound
//! as parameters.

use rusqlite::types::Value;
use std::fmt;

/// Ordered `(column, value)` pairs with one value per column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pairs: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the value for `column` (builder style).
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(column, value);
        self
    }

    /// Add or replace the value for `column`, keeping the column's first position.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(c, _)| *c == column) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((column, value)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(c, _)| c.as_str())
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.pairs.iter().find(|(c, _)| c == column).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.pairs.iter().map(|(c, v)| (c.as_str(), v))
    }
}

impl<C, V> FromIterator<(C, V)> for Filter
where
    C: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (C, V)>>(iter: I) -> Self {
        let mut filter = Filter::new();
        for (column, value) in iter {
            filter.set(column, value);
        }
        filter
    }
}

/// Renders `('col', value), ...` for query traces.
impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (column, value)) in self.pairs.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "('{}', ", column)?;
            match value {
                Value::Null => write!(f, "NULL")?,
                Value::Integer(n) => write!(f, "{}", n)?,
                Value::Real(r) => write!(f, "{}", r)?,
                Value::Text(s) => write!(f, "{:?}", s)?,
                Value::Blob(b) => write!(f, "<{} bytes>", b.len())?,
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_and_keeps_position() {
        let filter = Filter::new()
            .with("id", 1)
            .with("name", "alice".to_string())
            .with("id", 2);

        assert_eq!(filter.len(), 2);
        assert_eq!(filter.columns().collect::<Vec<_>>(), vec!["id", "name"]);
        assert_eq!(filter.get("id"), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_from_iter() {
        let filter: Filter = vec![("a", 1i64), ("b", 2i64)].into_iter().collect();
        assert_eq!(filter.get("b"), Some(&Value::Integer(2)));
        assert!(!filter.is_empty());
        assert!(Filter::new().is_empty());
    }

    #[test]
    fn test_display() {
        let filter = Filter::new()
            .with("id", 1)
            .with("name", "alice".to_string())
            .with("note", Value::Null)
            .with("avatar", vec![0u8, 1, 2]);
        assert_eq!(
            filter.to_string(),
            r#"('id', 1), ('name', "alice"), ('note', NULL), ('avatar', <3 bytes>)"#
        );
    }
}
