use serde::Serialize;

/// Error body returned by every failing endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    message: String,
}

impl ErrorResponse {
    pub(super) fn new(message: String) -> Self {
        Self { message }
    }
}
