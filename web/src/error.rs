use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::warn;

#[derive(thiserror::Error, Debug)]
pub(crate) enum Error {
    #[error(transparent)]
    Library(#[from] libnearby::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
    #[error("The request body was rejected: {0}")]
    BadRequestJsonRejection(#[from] JsonRejection),
    #[error("The request path was rejected: {0}")]
    BadRequestPathRejection(#[from] PathRejection),
}

impl Error {
    pub(crate) fn to_client_status(&self) -> (StatusCode, String) {
        use libnearby::Error as LibError;
        match self {
            Error::Library(LibError::InvalidArgument(message) | LibError::Validation(message)) => {
                (StatusCode::BAD_REQUEST, message.clone())
            }
            Error::Library(LibError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "Location not found".to_string())
            }
            Error::Library(LibError::StoreUnavailable(_) | LibError::DatabaseMigration(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error".to_string(),
            ),
            Error::Library(LibError::Provider(_)) => (
                StatusCode::BAD_GATEWAY,
                "Trip cost provider error".to_string(),
            ),
            Error::Library(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Library error".to_string()),
            Error::Other(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Unknown error".to_string(),
            ),
            Error::BadRequestJsonRejection(rejection) => {
                (StatusCode::BAD_REQUEST, rejection.body_text())
            }
            Error::BadRequestPathRejection(rejection) => {
                (StatusCode::BAD_REQUEST, rejection.body_text())
            }
        }
    }
}

// Tell axum how to convert `Error` into a response.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        warn!("Got error for response: {self:?}");
        // placeholder, will get refined in the response mapper
        let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
        // insert the error into the response so that the response mapper can render it
        response.extensions_mut().insert(Arc::new(self));
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_status() {
        let cases = [
            (
                Error::from(libnearby::Error::InvalidArgument("bad".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                Error::from(libnearby::Error::Validation("bad".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                Error::from(libnearby::Error::NotFound("location 1".into())),
                StatusCode::NOT_FOUND,
            ),
            (
                Error::from(libnearby::Error::StoreUnavailable(sqlx::Error::PoolClosed)),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                Error::from(anyhow::anyhow!("oops")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(error.to_client_status().0, status, "wrong status for {error:?}");
        }
    }

    #[test]
    fn test_into_response_carries_error() {
        let response = Error::from(libnearby::Error::NotFound("x".into())).into_response();
        assert!(response.extensions().get::<Arc<Error>>().is_some());
    }
}
