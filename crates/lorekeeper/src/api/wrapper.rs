use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

use crate::api::error::InnerApiError;

/// Successful response: the payload is sent as the JSON body as is.
pub struct ApiResponse<T: Serialize> {
    status_code: StatusCode,
    data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            status_code: StatusCode::OK,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status_code, Json(self.data)).into_response()
    }
}

/// Body of every non-2xx response.
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

pub struct ApiError(anyhow::Error);

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(value: E) -> Self {
        Self(value.into())
    }
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        if let Some(inner) = self.0.downcast_ref::<InnerApiError>() {
            let status = match inner {
                InnerApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
                InnerApiError::NotFound(_) => StatusCode::NOT_FOUND,
                InnerApiError::EmptyAiResponse | InnerApiError::UnparseableAiResponse => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            return (status, inner.to_string());
        }
        if let Some(db_err) = self.0.downcast_ref::<DbErr>() {
            if let Some(SqlErr::UniqueConstraintViolation(_)) = db_err.sql_err() {
                return (
                    StatusCode::BAD_REQUEST,
                    "An entry with that name already exists in this campaign; merge the two entries instead"
                        .to_string(),
                );
            }
        }
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "An internal error occurred".to_string(),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            error!("request failed: {:#}", self.0);
        }
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
