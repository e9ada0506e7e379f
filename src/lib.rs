//! Sugar Insider Library
//!
//! Sweets diary with nutrition aggregation, unit conversion and statistics.

pub mod app;
pub mod build_info;
pub mod db;
pub mod mcp;
pub mod models;
pub mod notifications;
pub mod nutrition;
pub mod tools;
