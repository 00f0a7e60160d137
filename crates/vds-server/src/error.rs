use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;
use vds_repo::{ErrorKind, RepoError};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Repo(#[from] RepoError),

    /// A `Wiki-Last-Id` header that is neither empty, `null`, nor an id.
    #[error("unparsable Wiki-Last-Id: {0:?}")]
    InvalidLastId(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Repo(e) => match e.kind() {
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::InvalidPath => StatusCode::BAD_REQUEST,
                ErrorKind::Conflict => StatusCode::CONFLICT,
                ErrorKind::Gone => StatusCode::GONE,
                ErrorKind::Io => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::InvalidLastId(_) => StatusCode::CONFLICT,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Config(_) | Self::Io(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn kind(&self) -> String {
        match self {
            Self::Repo(e) => e.kind().to_string(),
            Self::InvalidLastId(_) => ErrorKind::Conflict.to_string(),
            Self::BadRequest(_) => "bad_request".into(),
            Self::Config(_) | Self::Io(_) | Self::Internal(_) => ErrorKind::Io.to_string(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
        }
        let body = json!({ "error": self.kind(), "message": self.to_string() });
        (status, Json(body)).into_response()
    }
}
