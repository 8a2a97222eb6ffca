//! PauseGate puts a web site into maintenance mode.
//!
//! # Features
//!
//! - Visitors get a self-contained 503 page with optional countdown and
//!   call-to-action links
//! - Administrators (by role) and whitelisted addresses keep seeing the site
//! - The settings API and the ajax, cron and login paths are never gated
//! - Settings API for administrators
//! - Maintenance can end automatically at the countdown target

// Re-export shared types and adapter traits from pausegate-types
pub use pausegate_types::error;
pub use pausegate_types::identity;
pub use pausegate_types::identity_adapter;
pub use pausegate_types::media_adapter;
pub use pausegate_types::settings_adapter;
pub use pausegate_types::types;

// Feature crate re-exports
pub use pausegate_admin as admin;
pub use pausegate_core::countdown;
pub use pausegate_core::gate;
pub use pausegate_core::lifecycle;
pub use pausegate_core::scheduler;
pub use pausegate_core::settings;

// Local modules
pub mod app;
pub mod prelude;
pub mod routes;

pub use crate::app::{App, AppBuilder, ServerMode};

// vim: ts=4
