use crate::sql::{schema::Column, types::{Conditions, Value}};

/// Operation descriptor: the structured form of one statement
///
/// Produced by the parser, or built directly by callers that bypass SQL
/// text, and consumed by `Engine::dispatch`. WHERE clauses are ANDed
/// equality tests, one per column.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// CREATE TABLE statement
    CreateTable {
        name: String,
        columns: Vec<Column>,
    },
    /// DROP TABLE statement
    DropTable {
        name: String,
    },
    /// INSERT statement, values in declared column order
    Insert {
        table_name: String,
        values: Vec<Value>,
    },
    /// SELECT statement
    Select {
        table_name: String,
        /// None selects every column (`SELECT *`)
        projection: Option<Vec<String>>,
        where_clause: Option<Conditions>,
    },
    /// UPDATE statement
    Update {
        table_name: String,
        assignments: Conditions,
        where_clause: Option<Conditions>,
    },
    /// DELETE statement
    Delete {
        table_name: String,
        where_clause: Option<Conditions>,
    },
}
