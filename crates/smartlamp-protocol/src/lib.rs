//! SmartLamp line protocol.
//!
//! The command catalog, the response line type and the matching rules that
//! decide whether a line answers a command.

pub mod attribute;
pub mod commands;
pub mod response;

pub use attribute::Attribute;
pub use commands::{CATALOG, CatalogEntry, Command, CommandCode};
pub use response::{Line, match_response};
