//! SQL processing module
//!
//! This module provides:
//! - `parser`: SQL lexer and parser producing operation descriptors
//! - `types`: scalar values and data types
//! - `schema`: column definitions and value coercion
//! - `executor`: one executor per statement kind
//! - `engine`: table catalog and SQL session

pub mod parser;
pub mod types;
pub mod schema;
pub mod executor;
pub mod engine;
