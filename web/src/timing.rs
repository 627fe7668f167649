//! Request timing. Every json response reports how long the request took to
//! handle, in nanoseconds, as the `time_ns` field.
use crate::error::Error;
use axum::{
    Json,
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::{sync::Arc, time::Instant};

/// The moment the request entered the response mapper, available to handlers
/// as a request extension
#[derive(Clone, Copy, Debug)]
pub(crate) struct RequestStart(Instant);

impl RequestStart {
    pub(crate) fn now() -> Self {
        Self(Instant::now())
    }

    /// nanoseconds elapsed since the start of the request, as a decimal string
    pub(crate) fn elapsed_ns(&self) -> String {
        self.0.elapsed().as_nanos().to_string()
    }
}

/// A response payload with the request's elapsed time added to it
#[derive(Serialize)]
pub(crate) struct Timed<T: Serialize> {
    #[serde(flatten)]
    body: T,
    time_ns: String,
}

impl<T: Serialize> Timed<T> {
    pub(crate) fn new(body: T, start: &RequestStart) -> Self {
        Self {
            body,
            time_ns: start.elapsed_ns(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Middleware that records the request start time and converts any [Error]
/// attached to the response into a json error body with the proper status code
pub(crate) async fn response_mapper(mut request: Request, next: Next) -> Response {
    let start = RequestStart::now();
    request.extensions_mut().insert(start);
    let response = next.run(request).await;
    match response.extensions().get::<Arc<Error>>() {
        Some(error) => {
            let (status, message) = error.to_client_status();
            (status, Json(Timed::new(ErrorBody { error: message }, &start))).into_response()
        }
        None => response,
    }
}
