// HTTP routes
pub mod analyze;
pub mod health;
pub mod history;
pub mod results;

pub use analyze::*;
pub use health::*;
pub use history::*;
pub use results::*;

use serde::Serialize;

/// Error-shaped JSON body. Pollers receive this instead of transport-level
/// failures.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: message.into(),
        }
    }
}
