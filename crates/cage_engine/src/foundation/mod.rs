//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and 2D helpers
//! - Slot-map keys and handle collections
//! - Logging utilities

pub mod math;
pub mod collections;
pub mod logging;
