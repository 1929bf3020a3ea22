//! minirdb - a minimal in-process relational store
//!
//! This crate provides:
//! - Typed tables (INT / TEXT) with PRIMARY KEY and UNIQUE constraints
//! - Hash indexes for O(1) equality lookups on unique columns
//! - Row-level insert/select/update/delete with per-statement atomicity
//! - A SQL-subset parser producing operation descriptors

pub mod error;
pub mod sql;
pub mod storage;
