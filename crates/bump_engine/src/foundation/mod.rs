//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and operations
//! - Time measurement for tick profiling
//! - Logging utilities

pub mod math;
pub mod time;
pub mod logging;
