use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Success envelope shared by every JSON endpoint under the API prefix.
#[derive(Debug, Serialize)]
pub(crate) struct ApiResponse<T> {
    pub(crate) success: bool,
    pub(crate) message: String,
    pub(crate) data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub(crate) fn ok(message: impl Into<String>, data: T) -> Self {
        Self { success: true, message: message.into(), data }
    }

    pub(crate) fn created(message: impl Into<String>, data: T) -> Created<T> {
        Created(Self::ok(message, data))
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Same envelope answered with 201.
pub(crate) struct Created<T>(ApiResponse<T>);

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, Json(self.0)).into_response()
    }
}
