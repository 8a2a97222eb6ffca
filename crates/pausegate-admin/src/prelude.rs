pub use pausegate_core::prelude::*;

// vim: ts=4
