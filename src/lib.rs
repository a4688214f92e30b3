//! nutricalc library
//!
//! Products, dishes, and the calorie calculator, backed by SQLite.

pub mod build_info;
pub mod config;
pub mod db;
pub mod mcp;
pub mod models;
pub mod nutrition;
pub mod tools;
