//! REST API endpoint modules.

pub mod email;
pub mod status;
