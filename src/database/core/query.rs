//! SQL text generation
//!
//! Builders here only ever interpolate identifiers that were validated by
//! [`Schema`](super::Schema) and checked against it by the manager. Values are
//! referenced through named placeholders (`:column`) and bound separately.

use super::filter::Filter;
use super::schema::TableSchema;

/// Double-quote an identifier, doubling any embedded quote.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Named placeholder for a column.
pub fn placeholder(column: &str) -> String {
    format!(":{}", column)
}

/// `WHERE "a" = :a AND "b" = :b`, or an empty string when there are no columns.
pub fn where_clause<'a>(columns: impl IntoIterator<Item = &'a str>) -> String {
    let conditions: Vec<String> = columns
        .into_iter()
        .map(|c| format!("{} = {}", quote_ident(c), placeholder(c)))
        .collect();

    if conditions.is_empty() {
        return String::new();
    }
    format!("WHERE {}", conditions.join(" AND "))
}

/// `"a", "b"`
pub fn column_list<'a>(columns: impl IntoIterator<Item = &'a str>) -> String {
    columns
        .into_iter()
        .map(quote_ident)
        .collect::<Vec<_>>()
        .join(", ")
}

/// `:a, :b`
pub fn placeholder_list<'a>(columns: impl IntoIterator<Item = &'a str>) -> String {
    columns
        .into_iter()
        .map(placeholder)
        .collect::<Vec<_>>()
        .join(", ")
}

fn with_where(head: String, filter: &Filter) -> String {
    let clause = where_clause(filter.columns());
    if clause.is_empty() {
        head
    } else {
        format!("{} {}", head, clause)
    }
}

pub fn select_sql(table: &str, filter: &Filter) -> String {
    with_where(format!("SELECT * FROM {}", quote_ident(table)), filter)
}

pub fn count_sql(table: &str, filter: &Filter) -> String {
    with_where(format!("SELECT COUNT(*) FROM {}", quote_ident(table)), filter)
}

pub fn delete_sql(table: &str, filter: &Filter) -> String {
    with_where(format!("DELETE FROM {}", quote_ident(table)), filter)
}

pub fn insert_sql(table: &str, values: &Filter) -> String {
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(table),
        column_list(values.columns()),
        placeholder_list(values.columns())
    )
}

pub fn create_table_sql(table: &TableSchema) -> String {
    let columns = table
        .columns
        .iter()
        .map(|c| {
            if c.decl.trim().is_empty() {
                quote_ident(&c.name)
            } else {
                format!("{} {}", quote_ident(&c.name), c.decl.trim())
            }
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE {} ({})", quote_ident(&table.name), columns)
}

/// Named parameters in the shape rusqlite binds: `[(":col", &value), ...]`.
pub fn named_params(filter: &Filter) -> Vec<(String, &dyn rusqlite::ToSql)> {
    filter
        .iter()
        .map(|(c, v)| (placeholder(c), v as &dyn rusqlite::ToSql))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("users"), "\"users\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_where_clause() {
        assert_eq!(where_clause(Vec::<&str>::new()), "");
        assert_eq!(where_clause(["id"]), "WHERE \"id\" = :id");
        assert_eq!(
            where_clause(["id", "name"]),
            "WHERE \"id\" = :id AND \"name\" = :name"
        );
    }

    #[test]
    fn test_statements() {
        let filter = Filter::new().with("id", 1).with("name", "alice".to_string());

        assert_eq!(
            select_sql("users", &filter),
            "SELECT * FROM \"users\" WHERE \"id\" = :id AND \"name\" = :name"
        );
        assert_eq!(
            count_sql("users", &filter),
            "SELECT COUNT(*) FROM \"users\" WHERE \"id\" = :id AND \"name\" = :name"
        );
        assert_eq!(
            delete_sql("users", &Filter::new().with("id", 1)),
            "DELETE FROM \"users\" WHERE \"id\" = :id"
        );
        assert_eq!(
            insert_sql("users", &filter),
            "INSERT INTO \"users\" (\"id\", \"name\") VALUES (:id, :name)"
        );
        assert_eq!(select_sql("users", &Filter::new()), "SELECT * FROM \"users\"");
    }

    #[test]
    fn test_create_table_sql() {
        let table = TableSchema::new("users")
            .column("id", "INTEGER PRIMARY KEY")
            .column("name", "TEXT")
            .column("extra", "");
        assert_eq!(
            create_table_sql(&table),
            "CREATE TABLE \"users\" (\"id\" INTEGER PRIMARY KEY, \"name\" TEXT, \"extra\")"
        );
    }

    #[test]
    fn test_named_params() {
        let filter = Filter::new().with("id", 7);
        let params = named_params(&filter);
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].0, ":id");
    }
}
