//! Shared types, adapter traits, and core utilities for PauseGate.
//!
//! This crate holds everything the adapters and the feature crates agree on:
//! the settings record, request identity, the adapter traits and the error
//! type. Keeping it separate lets adapter crates build without pulling in
//! the web stack of the core crate.

pub mod error;
pub mod identity;
pub mod identity_adapter;
pub mod media_adapter;
pub mod prelude;
pub mod settings;
pub mod settings_adapter;
pub mod types;

// vim: ts=4
