use crate::{
    error::Result,
    sql::{
        engine::Engine,
        executor::{Executor, ResultSet},
        types::Conditions,
    },
};

/// SELECT executor: filter, then project
pub struct Select {
    table_name: String,
    projection: Option<Vec<String>>,
    where_clause: Option<Conditions>,
}

impl Select {
    pub fn new(table_name: String, projection: Option<Vec<String>>, where_clause: Option<Conditions>) -> Box<Self> {
        Box::new(Self {
            table_name,
            projection,
            where_clause,
        })
    }
}

impl Executor for Select {
    fn execute(self: Box<Self>, engine: &mut Engine) -> Result<ResultSet> {
        let projection = self.projection.as_deref();
        let rows = engine.select_from(&self.table_name, projection, self.where_clause.as_ref())?;

        // Output order: requested order under a projection, declared order otherwise
        let declared = engine
            .must_get_table(&self.table_name)?
            .columns()
            .iter()
            .map(|c| c.name.clone())
            .collect::<Vec<_>>();
        let columns = match projection {
            Some(requested) if !requested.is_empty() => {
                let mut columns: Vec<String> = Vec::with_capacity(requested.len());
                for name in requested {
                    // rows are keyed by column name, so a repeat would be a phantom column
                    if declared.contains(name) && !columns.contains(name) {
                        columns.push(name.clone());
                    }
                }
                columns
            }
            _ => declared,
        };

        Ok(ResultSet::Select { columns, rows })
    }
}
