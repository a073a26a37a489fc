//! Core engine types
//!
//! Holds the typed physics configuration that every pipeline stage reads.

pub mod config;

pub use config::PhysicsConfig;
