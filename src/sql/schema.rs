use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{error::{Error, Result}, sql::types::{DataType, Value}};

/// Column schema definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub datatype: DataType,
    /// Whether this column is the primary key
    pub primary_key: bool,
    /// Always true for the primary key
    pub unique: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, datatype: DataType, primary_key: bool, unique: bool) -> Self {
        Self {
            name: name.into(),
            datatype,
            primary_key,
            unique: unique || primary_key,
        }
    }

    /// Whether the column is backed by a unique index
    pub fn is_indexed(&self) -> bool {
        self.primary_key || self.unique
    }

    /// Coerces a raw value into this column's type
    ///
    /// NULL passes through untouched; there is no NOT NULL constraint.
    pub fn validate(&self, value: Value) -> Result<Value> {
        match (self.datatype, value) {
            (_, Value::Null) => Ok(Value::Null),
            (DataType::Int, Value::Int(i)) => Ok(Value::Int(i)),
            (DataType::Int, Value::Text(s)) => match s.trim().parse::<i64>() {
                Ok(i) => Ok(Value::Int(i)),
                Err(_) => Err(Error::Type(format!(
                    "value '{}' cannot be converted to {} for column {}",
                    s, self.datatype, self.name
                ))),
            },
            (DataType::Text, Value::Int(i)) => Ok(Value::Text(i.to_string())),
            (DataType::Text, Value::Text(s)) => Ok(Value::Text(s)),
        }
    }
}

impl Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.name, self.datatype)?;
        if self.primary_key {
            write!(f, " PRIMARY KEY")
        } else if self.unique {
            write!(f, " UNIQUE")
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Column;
    use crate::{
        error::{Error, Result},
        sql::types::{DataType, Value},
    };

    #[test]
    fn test_primary_key_implies_unique() {
        let col = Column::new("id", DataType::Int, true, false);
        assert!(col.unique);
        assert!(col.is_indexed());

        let col = Column::new("name", DataType::Text, false, false);
        assert!(!col.is_indexed());
    }

    #[test]
    fn test_validate_int() -> Result<()> {
        let col = Column::new("age", DataType::Int, false, false);
        assert_eq!(col.validate(Value::Int(42))?, Value::Int(42));
        assert_eq!(col.validate(Value::from(" 17 "))?, Value::Int(17));
        assert_eq!(col.validate(Value::from("-5"))?, Value::Int(-5));
        assert_eq!(col.validate(Value::Null)?, Value::Null);

        match col.validate(Value::from("4.5")) {
            Err(Error::Type(msg)) => assert!(msg.contains("4.5") && msg.contains("INT")),
            other => panic!("expected type error, got {:?}", other),
        }
        assert!(col.validate(Value::from("abc")).is_err());
        Ok(())
    }

    #[test]
    fn test_validate_text() -> Result<()> {
        let col = Column::new("name", DataType::Text, false, false);
        assert_eq!(col.validate(Value::Int(12))?, Value::from("12"));
        assert_eq!(col.validate(Value::from("bob"))?, Value::from("bob"));
        assert_eq!(col.validate(Value::Null)?, Value::Null);
        Ok(())
    }

    #[test]
    fn test_validate_is_idempotent() -> Result<()> {
        let int_col = Column::new("n", DataType::Int, false, false);
        let text_col = Column::new("t", DataType::Text, false, false);
        for raw in [Value::from("8"), Value::Int(8), Value::Null] {
            let once = int_col.validate(raw.clone())?;
            assert_eq!(int_col.validate(once.clone())?, once);
            let once = text_col.validate(raw)?;
            assert_eq!(text_col.validate(once.clone())?, once);
        }
        Ok(())
    }

    #[test]
    fn test_column_display() {
        assert_eq!(Column::new("id", DataType::Int, true, false).to_string(), "id INT PRIMARY KEY");
        assert_eq!(Column::new("email", DataType::Text, false, true).to_string(), "email TEXT UNIQUE");
        assert_eq!(Column::new("name", DataType::Text, false, false).to_string(), "name TEXT");
    }
}
