use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    error::{Error, Result},
    sql::{
        executor::{Executor, ResultSet},
        parser::{Parser, ast::Statement},
        schema::Column,
        types::{Conditions, Row, Value},
    },
    storage::table::Table,
};

/// Per-table summary for inspection tools
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableInfo {
    /// Column descriptions, e.g. `id INT PRIMARY KEY`
    pub columns: Vec<String>,
    pub row_count: usize,
}

/// Catalog of named tables
///
/// All state lives in this value and is mutated through `&mut self`. A host
/// serving concurrent callers must serialize access to it.
#[derive(Debug, Default)]
pub struct Engine {
    tables: BTreeMap<String, Table>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a session that executes SQL text against this engine
    pub fn session(self) -> Session {
        Session::new(self)
    }

    /// Runs one operation descriptor
    pub fn dispatch(&mut self, stmt: Statement) -> Result<ResultSet> {
        <dyn Executor>::build(stmt).execute(self)
    }

    pub fn create_table(&mut self, name: &str, columns: Vec<Column>) -> Result<()> {
        if self.tables.contains_key(name) {
            return Err(Error::Schema(format!("table {} already exists", name)));
        }
        let table = Table::new(name, columns)?;
        tracing::debug!(table = name, columns = table.columns().len(), "created table");
        self.tables.insert(name.to_string(), table);
        Ok(())
    }

    pub fn insert_into(&mut self, table: &str, values: Vec<Value>) -> Result<()> {
        let id = self.must_get_table_mut(table)?.insert(values)?;
        tracing::debug!(table = table, row_id = id.0, "inserted row");
        Ok(())
    }

    /// Selects matching rows, keeping only the projected columns
    ///
    /// An absent or empty projection keeps every column. Requested names
    /// that the table does not have are skipped rather than rejected.
    pub fn select_from(
        &self,
        table: &str,
        projection: Option<&[String]>,
        conditions: Option<&Conditions>,
    ) -> Result<Vec<Row>> {
        let rows = self.must_get_table(table)?.select(conditions)?;
        Ok(match projection {
            Some(columns) if !columns.is_empty() => rows
                .into_iter()
                .map(|row| {
                    row.into_iter()
                        .filter(|(name, _)| columns.contains(name))
                        .collect()
                })
                .collect(),
            _ => rows,
        })
    }

    pub fn update_table(
        &mut self,
        table: &str,
        assignments: &Conditions,
        conditions: Option<&Conditions>,
    ) -> Result<usize> {
        self.must_get_table_mut(table)?.update(assignments, conditions)
    }

    pub fn delete_from(&mut self, table: &str, conditions: Option<&Conditions>) -> Result<usize> {
        self.must_get_table_mut(table)?.delete(conditions)
    }

    pub fn drop_table(&mut self, table: &str) -> Result<()> {
        match self.tables.remove(table) {
            Some(t) => {
                tracing::debug!(table = table, rows = t.len(), "dropped table");
                Ok(())
            }
            None => Err(Self::missing(table)),
        }
    }

    /// Column descriptions and row count of every table
    pub fn get_table_info(&self) -> BTreeMap<String, TableInfo> {
        self.tables
            .iter()
            .map(|(name, table)| {
                let info = TableInfo {
                    columns: table.columns().iter().map(|c| c.to_string()).collect(),
                    row_count: table.len(),
                };
                (name.clone(), info)
            })
            .collect()
    }

    pub fn get_table(&self, table: &str) -> Option<&Table> {
        self.tables.get(table)
    }

    /// Returns the table, or an error if it doesn't exist
    pub fn must_get_table(&self, table: &str) -> Result<&Table> {
        self.tables.get(table).ok_or(Self::missing(table))
    }

    fn must_get_table_mut(&mut self, table: &str) -> Result<&mut Table> {
        self.tables.get_mut(table).ok_or(Self::missing(table))
    }

    fn missing(table: &str) -> Error {
        Error::Schema(format!("table {} does not exist", table))
    }
}

/// SQL session: parses one statement at a time and runs it on its engine
pub struct Session {
    engine: Engine,
}

impl Session {
    pub fn new(engine: Engine) -> Self {
        Self { engine }
    }

    /// Executes a SQL statement
    pub fn execute(&mut self, sql: &str) -> Result<ResultSet> {
        let stmt = Parser::new(sql).parse()?;
        self.engine.dispatch(stmt)
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn into_engine(self) -> Engine {
        self.engine
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::{Engine, TableInfo};
    use crate::{
        error::{Error, Result},
        sql::{
            executor::ResultSet,
            parser::ast::Statement,
            schema::Column,
            types::{Conditions, DataType, Row, Value},
        },
    };

    fn users_columns() -> Vec<Column> {
        vec![
            Column::new("id", DataType::Int, true, false),
            Column::new("email", DataType::Text, false, true),
            Column::new("name", DataType::Text, false, false),
        ]
    }

    fn where_id(id: i64) -> Conditions {
        BTreeMap::from([("id".to_string(), Value::Int(id))])
    }

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_engine_api() -> Result<()> {
        let mut engine = Engine::new();
        engine.create_table("users", users_columns())?;
        engine.insert_into("users", vec![Value::Int(1), "a@x.com".into(), "A".into()])?;
        engine.insert_into("users", vec![Value::Int(2), "b@x.com".into(), "B".into()])?;

        assert_eq!(
            engine.select_from("users", None, Some(&where_id(1)))?,
            vec![row(&[("id", Value::Int(1)), ("email", "a@x.com".into()), ("name", "A".into())])]
        );

        let set_name = BTreeMap::from([("name".to_string(), Value::from("A2"))]);
        assert_eq!(engine.update_table("users", &set_name, Some(&where_id(1)))?, 1);
        assert_eq!(engine.select_from("users", None, Some(&where_id(1)))?[0]["name"], Value::from("A2"));

        assert!(matches!(
            engine.insert_into("users", vec![Value::Int(1), "c@x.com".into(), "C".into()]),
            Err(Error::Constraint(_))
        ));
        assert_eq!(engine.must_get_table("users")?.len(), 2);

        assert_eq!(engine.delete_from("users", Some(&where_id(1)))?, 1);
        let rest = engine.select_from("users", None, None)?;
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0]["id"], Value::Int(2));
        let table = engine.must_get_table("users")?;
        assert_eq!(table.index("id").and_then(|i| i.get(&Value::Int(2))), Some(0));
        Ok(())
    }

    #[test]
    fn test_unknown_and_duplicate_tables() -> Result<()> {
        let mut engine = Engine::new();
        engine.create_table("users", users_columns())?;
        assert!(matches!(engine.create_table("users", users_columns()), Err(Error::Schema(_))));
        assert!(matches!(engine.create_table("empty", vec![]), Err(Error::Schema(_))));
        assert!(engine.get_table("empty").is_none());

        assert!(matches!(engine.insert_into("nope", vec![]), Err(Error::Schema(_))));
        assert!(matches!(engine.select_from("nope", None, None), Err(Error::Schema(_))));
        assert!(matches!(engine.update_table("nope", &BTreeMap::new(), None), Err(Error::Schema(_))));
        assert!(matches!(engine.delete_from("nope", None), Err(Error::Schema(_))));
        assert!(matches!(engine.drop_table("nope"), Err(Error::Schema(_))));

        engine.drop_table("users")?;
        assert!(engine.get_table("users").is_none());
        assert!(matches!(engine.select_from("users", None, None), Err(Error::Schema(_))));
        engine.create_table("users", users_columns())?;
        Ok(())
    }

    #[test]
    fn test_projection() -> Result<()> {
        let mut engine = Engine::new();
        engine.create_table("users", users_columns())?;
        engine.insert_into("users", vec![Value::Int(1), "a@x.com".into(), "A".into()])?;

        let projection = vec!["name".to_string(), "missing".to_string()];
        assert_eq!(
            engine.select_from("users", Some(projection.as_slice()), None)?,
            vec![row(&[("name", "A".into())])]
        );
        assert_eq!(engine.select_from("users", Some(&[][..]), None)?[0].len(), 3);
        let nothing = vec!["missing".to_string()];
        assert_eq!(engine.select_from("users", Some(nothing.as_slice()), None)?, vec![Row::new()]);
        Ok(())
    }

    #[test]
    fn test_get_table_info() -> Result<()> {
        let mut engine = Engine::new();
        engine.create_table("users", users_columns())?;
        engine.insert_into("users", vec![Value::Int(1), Value::Null, "A".into()])?;

        let info = engine.get_table_info();
        assert_eq!(
            info["users"],
            TableInfo {
                columns: vec![
                    "id INT PRIMARY KEY".to_string(),
                    "email TEXT UNIQUE".to_string(),
                    "name TEXT".to_string(),
                ],
                row_count: 1,
            }
        );

        let json = serde_json::to_value(&info).map_err(|e| Error::Schema(e.to_string()))?;
        assert_eq!(json["users"]["row_count"], 1);
        assert_eq!(json["users"]["columns"][0], "id INT PRIMARY KEY");
        Ok(())
    }

    #[test]
    fn test_dispatch_descriptors() -> Result<()> {
        let mut engine = Engine::new();
        assert_eq!(
            engine.dispatch(Statement::CreateTable {
                name: "users".to_string(),
                columns: users_columns(),
            })?,
            ResultSet::CreateTable { table_name: "users".to_string() }
        );
        engine.dispatch(Statement::Insert {
            table_name: "users".to_string(),
            values: vec![Value::Int(1), "a@x.com".into(), "A".into()],
        })?;

        let result = engine.dispatch(Statement::Select {
            table_name: "users".to_string(),
            projection: Some(vec!["name".to_string(), "id".to_string(), "zzz".to_string()]),
            where_clause: None,
        })?;
        assert_eq!(
            result,
            ResultSet::Select {
                columns: vec!["name".to_string(), "id".to_string()],
                rows: vec![row(&[("id", Value::Int(1)), ("name", "A".into())])],
            }
        );

        assert_eq!(
            engine.dispatch(Statement::Delete {
                table_name: "users".to_string(),
                where_clause: Some(where_id(5)),
            })?,
            ResultSet::Delete { count: 0 }
        );
        Ok(())
    }

    #[test]
    fn test_session_sql() -> Result<()> {
        let mut s = Engine::new().session();
        s.execute("CREATE TABLE users (id INT PRIMARY KEY, email TEXT UNIQUE, name TEXT);")?;
        assert_eq!(s.execute("INSERT INTO users VALUES (1, 'a@x.com', 'A');")?, ResultSet::Insert { count: 1 });
        s.execute("INSERT INTO users VALUES (2, 'b@x.com', 'B')")?;

        match s.execute("SELECT * FROM users WHERE id = 1")? {
            ResultSet::Select { columns, rows } => {
                assert_eq!(columns, vec!["id", "email", "name"]);
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0]["email"], Value::from("a@x.com"));
            }
            other => panic!("unexpected result {:?}", other),
        }

        assert_eq!(s.execute("UPDATE users SET name = 'A2' WHERE id = 1")?, ResultSet::Update { count: 1 });
        assert!(matches!(
            s.execute("INSERT INTO users VALUES (1, 'c@x.com', 'C')"),
            Err(Error::Constraint(_))
        ));
        assert!(matches!(
            s.execute("INSERT INTO users VALUES (3, 'c@x.com')"),
            Err(Error::ValueCount { expected: 3, got: 2 })
        ));
        assert!(matches!(
            s.execute("INSERT INTO users VALUES (4.5, 'c@x.com', 'C')"),
            Err(Error::Type(_))
        ));
        assert!(matches!(s.execute("SELEC * FROM users"), Err(Error::Parse(_))));

        assert_eq!(s.execute("DELETE FROM users WHERE id = 1")?, ResultSet::Delete { count: 1 });
        assert_eq!(s.execute("DELETE FROM users WHERE name = 'nobody'")?, ResultSet::Delete { count: 0 });
        assert_eq!(s.engine().get_table_info()["users"].row_count, 1);

        assert_eq!(
            s.execute("DROP TABLE users")?,
            ResultSet::DropTable { table_name: "users".to_string() }
        );
        assert!(s.into_engine().get_table_info().is_empty());
        Ok(())
    }

    #[test]
    fn test_repeated_projection_column() -> Result<()> {
        let mut s = Engine::new().session();
        s.execute("CREATE TABLE users (id INT PRIMARY KEY, email TEXT UNIQUE, name TEXT)")?;
        s.execute("INSERT INTO users VALUES (1, 'a@x.com', 'A')")?;

        assert_eq!(
            s.execute("SELECT id, id FROM users")?,
            ResultSet::Select {
                columns: vec!["id".to_string()],
                rows: vec![row(&[("id", Value::Int(1))])],
            }
        );
        match s.execute("SELECT name, id, name, zzz FROM users")? {
            ResultSet::Select { columns, rows } => {
                assert_eq!(columns, vec!["name", "id"]);
                assert_eq!(rows[0].len(), columns.len());
            }
            other => panic!("unexpected result {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_update_validates_assignments_without_matches() -> Result<()> {
        let mut engine = Engine::new();
        engine.create_table("users", users_columns())?;
        engine.insert_into("users", vec![Value::Int(1), "a@x.com".into(), "A".into()])?;

        let bad_type = BTreeMap::from([("id".to_string(), Value::from("x"))]);
        assert!(matches!(
            engine.update_table("users", &bad_type, Some(&where_id(99))),
            Err(Error::Type(_))
        ));
        let bad_column = BTreeMap::from([("zzz".to_string(), Value::Int(1))]);
        assert!(matches!(
            engine.update_table("users", &bad_column, Some(&where_id(99))),
            Err(Error::Schema(_))
        ));
        let ok = BTreeMap::from([("name".to_string(), Value::from("Z"))]);
        assert_eq!(engine.update_table("users", &ok, Some(&where_id(99)))?, 0);
        Ok(())
    }
}
