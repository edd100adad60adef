//! Development reverse proxy: `/api/*` is forwarded to the student backend so browser-side
//! tooling can talk to it from this origin.

use crate::state::RegistrarState;
use axum::{
    Json,
    body::{Body, to_bytes},
    extract::{Path, Request, State},
    http::{
        StatusCode,
        header::{ACCEPT, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use serde_json::json;

const MAX_BODY_SIZE: usize = 2 * 1024 * 1024;

pub async fn proxy_api(
    State(state): State<RegistrarState>,
    Path(rest): Path<String>,
    request: Request,
) -> Response {
    let api_config = state.config().api_config();
    let mut target = format!("{}/api/{rest}", api_config.base_url());
    if let Some(query) = request.uri().query() {
        target.push('?');
        target.push_str(query);
    }

    let method = request.method().clone();
    info!(%method, path = %request.uri().path(), %target, "Proxying request");

    match forward(&state, request, &target).await {
        Ok(rsp) => rsp,
        Err(details) => {
            error!(?details, %target, "Proxy error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Proxy error", "details": details})),
            )
                .into_response()
        }
    }
}

async fn forward(state: &RegistrarState, request: Request, target: &str) -> Result<Response, String> {
    let (parts, body) = request.into_parts();
    let body = to_bytes(body, MAX_BODY_SIZE)
        .await
        .map_err(|e| e.to_string())?;

    let mut upstream = state.http().request(parts.method, target).body(body);
    for name in [CONTENT_TYPE, ACCEPT] {
        if let Some(value) = parts.headers.get(&name) {
            upstream = upstream.header(name, value.clone());
        }
    }

    let rsp = upstream.send().await.map_err(|e| e.to_string())?;
    let status = rsp.status();
    let content_type = rsp.headers().get(CONTENT_TYPE).cloned();
    let bytes = rsp.bytes().await.map_err(|e| e.to_string())?;

    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    if let Some(content_type) = content_type {
        response.headers_mut().insert(CONTENT_TYPE, content_type);
    }
    Ok(response)
}
