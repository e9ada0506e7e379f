//! Sugar Insider Tools module
//!
//! MCP tool implementations for the sweets diary.

pub mod catalog;
pub mod diary;
pub mod reports;
pub mod settings;
pub mod statistics;
pub mod status;
