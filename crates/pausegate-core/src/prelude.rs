pub use crate::app::{App, AppState};
pub use pausegate_types::prelude::*;

// vim: ts=4
