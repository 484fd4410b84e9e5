use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Errors surfaced to API clients.
///
/// Every variant renders as `{"success": false, "error": <status>, "message": <text>}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The requested collection or record does not exist.
    #[error("Not found")]
    NotFound,

    /// The request could not be acted upon: malformed body, constraint
    /// failure, or a lookup-then-act sequence that failed part way.
    #[error("Unprocessable entity")]
    Unprocessable,

    /// A read query failed for reasons unrelated to the request.
    #[error("Internal server error")]
    Database(#[from] sqlx::Error),
}

pub type ApiResponse<T> = Result<Json<T>, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Unprocessable => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Database(err) = &self {
            tracing::error!(error = %err, "Database error");
        }
        let status = self.status();
        let body = json!({
            "success": false,
            "error": status.as_u16(),
            "message": self.to_string(),
        });

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::warn!(%rejection, "Rejected request body");
        ApiError::Unprocessable
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(%rejection, "Path did not match an integer id");
        ApiError::NotFound
    }
}

/// Collapses any failure of a write or lookup-then-act sequence into
/// [`ApiError::Unprocessable`], logging the cause.
pub trait OrUnprocessable<T> {
    fn or_unprocessable(self) -> Result<T, ApiError>;
}

impl<T> OrUnprocessable<T> for sqlx::Result<T> {
    fn or_unprocessable(self) -> Result<T, ApiError> {
        self.map_err(|err| {
            tracing::warn!(error = %err, "Query failed, reporting 422");
            ApiError::Unprocessable
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn not_found_renders_404_body() {
        let (status, json) = render(ApiError::NotFound).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], 404);
        assert_eq!(json["message"], "Not found");
    }

    #[tokio::test]
    async fn unprocessable_renders_422_body() {
        let (status, json) = render(ApiError::Unprocessable).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["error"], 422);
        assert_eq!(json["message"], "Unprocessable entity");
    }

    #[tokio::test]
    async fn database_error_hides_details() {
        let (status, json) = render(ApiError::Database(sqlx::Error::PoolTimedOut)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], 500);
        assert_eq!(json["message"], "Internal server error");
    }

    #[test]
    fn query_failures_collapse_to_unprocessable() {
        let result: sqlx::Result<()> = Err(sqlx::Error::RowNotFound);
        assert!(matches!(result.or_unprocessable(), Err(ApiError::Unprocessable)));
    }
}
