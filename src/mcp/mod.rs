//! MCP module
//!
//! Model Context Protocol server over stdio.

pub mod server;

pub use server::NutriService;
