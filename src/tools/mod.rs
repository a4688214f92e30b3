//! Tools module
//!
//! Workflows behind the MCP tools: validation, storage calls, logging, and
//! response shaping.

pub mod calculator;
pub mod dishes;
pub mod error;
pub mod products;
pub mod status;

pub use error::{ToolError, ToolResult};
