//! Service layer
//!
//! Services sit on top of the ports and expose them to outer surfaces.

pub mod tools;

pub use tools::{ToolDefinition, ToolService, DEFAULT_TRANSACTION_LIMIT};
