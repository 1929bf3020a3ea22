use crate::{
    error::Result,
    sql::{
        engine::Engine,
        executor::{Executor, ResultSet},
        types::{Conditions, Value},
    },
};

/// INSERT executor
pub struct Insert {
    table_name: String,
    values: Vec<Value>,
}

impl Insert {
    pub fn new(table_name: String, values: Vec<Value>) -> Box<Self> {
        Box::new(Self { table_name, values })
    }
}

impl Executor for Insert {
    fn execute(self: Box<Self>, engine: &mut Engine) -> Result<ResultSet> {
        engine.insert_into(&self.table_name, self.values)?;
        Ok(ResultSet::Insert { count: 1 })
    }
}

/// UPDATE executor
pub struct Update {
    table_name: String,
    assignments: Conditions,
    where_clause: Option<Conditions>,
}

impl Update {
    pub fn new(table_name: String, assignments: Conditions, where_clause: Option<Conditions>) -> Box<Self> {
        Box::new(Self {
            table_name,
            assignments,
            where_clause,
        })
    }
}

impl Executor for Update {
    fn execute(self: Box<Self>, engine: &mut Engine) -> Result<ResultSet> {
        let count = engine.update_table(&self.table_name, &self.assignments, self.where_clause.as_ref())?;
        Ok(ResultSet::Update { count })
    }
}

/// DELETE executor
pub struct Delete {
    table_name: String,
    where_clause: Option<Conditions>,
}

impl Delete {
    pub fn new(table_name: String, where_clause: Option<Conditions>) -> Box<Self> {
        Box::new(Self {
            table_name,
            where_clause,
        })
    }
}

impl Executor for Delete {
    fn execute(self: Box<Self>, engine: &mut Engine) -> Result<ResultSet> {
        let count = engine.delete_from(&self.table_name, self.where_clause.as_ref())?;
        Ok(ResultSet::Delete { count })
    }
}
