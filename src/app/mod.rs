//! Application state
//!
//! Navigation between the app's screens.

pub mod screen;

pub use screen::{NavError, NavEvent, Screen};
