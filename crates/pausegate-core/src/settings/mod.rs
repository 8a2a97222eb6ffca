//! Settings subsystem: cached access to the global maintenance record

pub mod service;

pub use service::SettingsService;

// vim: ts=4
