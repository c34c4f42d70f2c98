use std::sync::Arc;

use axum::extract::rejection::FormRejection;
use axum::extract::{Form, Path, State};
use axum::http::{header, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use super::AppState;
use crate::errors::ServiceError;
use crate::models::job::parse_job_id;

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ServiceError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ServiceError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ServiceError::Draining(message) => (StatusCode::GONE, message),
            ServiceError::Internal(message) => {
                tracing::error!("Internal error: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };
        (status, message).into_response()
    }
}

fn require_method(actual: &Method, expected: Method) -> Result<(), ServiceError> {
    if *actual == expected {
        Ok(())
    } else {
        Err(ServiceError::BadRequest(format!(
            "Only {} supported.",
            expected
        )))
    }
}

// ---------------------------------------------------------------------------
// Form params
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default)]
pub struct SubmitForm {
    pub password: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /hash
pub async fn submit_hash(
    State(state): State<Arc<AppState>>,
    method: Method,
    form: Result<Form<SubmitForm>, FormRejection>,
) -> Result<String, ServiceError> {
    require_method(&method, Method::POST)?;

    let password = match form {
        Ok(Form(form)) => form.password.unwrap_or_default(),
        Err(e) => {
            tracing::debug!("Unreadable submit form: {}", e);
            String::new()
        }
    };

    let id = state.service.submit(&password).await?;
    Ok(id.to_string())
}

/// GET /hash/{id}
pub async fn fetch_hash(
    State(state): State<Arc<AppState>>,
    method: Method,
    Path(raw_id): Path<String>,
) -> Result<String, ServiceError> {
    require_method(&method, Method::GET)?;
    let id = parse_job_id(&raw_id).map_err(ServiceError::BadRequest)?;
    state.service.lookup(id).await
}

/// GET /hash/ with no id
pub async fn fetch_hash_missing_id(method: Method) -> Result<String, ServiceError> {
    require_method(&method, Method::GET)?;
    Err(ServiceError::BadRequest("Must provide valid id".to_string()))
}

/// Anything the routes above do not match. A path under `/hash/` whose id
/// holds a `/` (for example `/hash/1/2`) is a malformed id, not a missing job.
pub async fn fallback(method: Method, uri: Uri) -> Result<String, ServiceError> {
    match uri.path().strip_prefix("/hash/") {
        Some(raw_id) => {
            require_method(&method, Method::GET)?;
            parse_job_id(raw_id).map_err(ServiceError::BadRequest)?;
            Err(ServiceError::BadRequest("ID must be a number".to_string()))
        }
        None => Err(ServiceError::NotFound("Not found".to_string())),
    }
}

/// GET /stats
pub async fn stats(
    State(state): State<Arc<AppState>>,
    method: Method,
) -> Result<Response, ServiceError> {
    require_method(&method, Method::GET)?;
    let report = state.service.stats().await;
    let body = serde_json::to_string(&report)?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response())
}

/// /shutdown: drain (bounded by the configured timeout), then stop the HTTP
/// server.
pub async fn shutdown(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    tracing::info!("Shutdown requested");

    crate::daemon::drain(&state.service, &state.config).await;

    if let Some(ref tx) = state.shutdown_tx {
        let _ = tx.send(());
    }

    (StatusCode::OK, "Shutting down.")
}
