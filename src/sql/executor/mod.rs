use crate::{
    error::Result,
    sql::{
        engine::Engine,
        executor::{
            mutation::{Delete, Insert, Update},
            query::Select,
            schema::{CreateTable, DropTable},
        },
        parser::ast::Statement,
        types::Row,
    },
};

mod mutation;
mod query;
mod schema;

/// Statement executor
pub trait Executor {
    fn execute(self: Box<Self>, engine: &mut Engine) -> Result<ResultSet>;
}

/// Builds an executor from an operation descriptor
impl dyn Executor {
    pub fn build(stmt: Statement) -> Box<dyn Executor> {
        match stmt {
            Statement::CreateTable { name, columns } => CreateTable::new(name, columns),
            Statement::DropTable { name } => DropTable::new(name),
            Statement::Insert { table_name, values } => Insert::new(table_name, values),
            Statement::Select {
                table_name,
                projection,
                where_clause,
            } => Select::new(table_name, projection, where_clause),
            Statement::Update {
                table_name,
                assignments,
                where_clause,
            } => Update::new(table_name, assignments, where_clause),
            Statement::Delete {
                table_name,
                where_clause,
            } => Delete::new(table_name, where_clause),
        }
    }
}

/// Execution result set
#[derive(Debug, PartialEq)]
pub enum ResultSet {
    CreateTable { table_name: String },
    DropTable { table_name: String },
    Insert { count: usize },
    /// `columns` lists the returned column names in output order
    Select { columns: Vec<String>, rows: Vec<Row> },
    Update { count: usize },
    Delete { count: usize },
}
