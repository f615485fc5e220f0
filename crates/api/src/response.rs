//! API response types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Standard success envelope: `{status, message, data, success: true}`.
///
/// Failures are rendered by `AppError` with the same `status`/`message`
/// fields and `success: false`.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    status: StatusCode,
    message: String,
    data: T,
}

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    status: u16,
    message: &'a str,
    data: &'a T,
    success: bool,
}

impl<T: Serialize> ApiResponse<T> {
    /// A `200 OK` response.
    pub fn ok(data: T) -> Self {
        Self {
            status: StatusCode::OK,
            message: "OK".to_string(),
            data,
        }
    }

    /// A `201 Created` response.
    pub fn created(data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            message: "Created".to_string(),
            data,
        }
    }

    /// Replace the human readable message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

impl ApiResponse<()> {
    /// A `200 OK` response with a message and no data.
    pub fn message(message: impl Into<String>) -> Self {
        Self::ok(()).with_message(message)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let body = Envelope {
            status: self.status.as_u16(),
            message: &self.message,
            data: &self.data,
            success: true,
        };
        (self.status, Json(body)).into_response()
    }
}
