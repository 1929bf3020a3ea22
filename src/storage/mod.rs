//! In-memory row storage
//!
//! - `index`: unique hash index from a column value to a row slot
//! - `table`: row store with constraint enforcement and CRUD

pub mod index;
pub mod table;
