use serde::Serialize;

pub const SUCCESS_GET: &str = "Data retrieved successfully";
pub const SUCCESS_SAVE: &str = "Data saved successfully";

/// Uniform JSON envelope: `{status, message, data}`.
#[derive(Serialize, Debug, Clone)]
pub struct ApiResponse<T: Serialize> {
    pub status: &'static str,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        ApiResponse {
            status: "success",
            message: message.into(),
            data,
        }
    }
}

impl ApiResponse<Vec<()>> {
    /// Error envelopes always carry an empty `data` array.
    pub fn error(message: impl Into<String>) -> Self {
        ApiResponse {
            status: "error",
            message: message.into(),
            data: Vec::new(),
        }
    }
}
