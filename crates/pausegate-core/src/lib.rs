//! Core of the PauseGate maintenance gate.
//!
//! Every inbound page request passes through [`gate::maintenance_gate`]:
//! bypass contexts (admin, ajax, cron, login) are let through untouched, then
//! the settings snapshot is consulted and, when maintenance is enabled, the
//! visitor's identity is checked against the bypass roles and whitelisted
//! addresses. Visitors who do not qualify receive the 503 maintenance page
//! and the request goes no further.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod access;
pub mod app;
pub mod auto_disable;
pub mod countdown;
pub mod extract;
pub mod gate;
pub mod lifecycle;
pub mod middleware;
pub mod prelude;
pub mod render;
pub mod sanitize;
pub mod scheduler;
pub mod settings;

pub use app::{Adapters, App, AppBuilderOpts, AppState, ServerMode, VERSION};
pub use extract::{Auth, OptionalAuth};
pub use gate::{Gate, GateState, RequestContext};

// vim: ts=4
