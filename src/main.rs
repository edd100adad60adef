#![warn(clippy::pedantic, clippy::all, clippy::nursery)]
#![allow(clippy::single_match_else)]

use crate::{
    config::RuntimeConfiguration,
    routes::{
        index::get_index_route,
        overlays::{
            internal_get_overlay, internal_post_delete_student, internal_post_edit_student,
            internal_post_overlay_close, internal_post_overlay_delete, internal_post_overlay_edit,
            internal_post_overlay_edit_clear,
        },
        proxy::proxy_api,
        sse::{internal_get_dismiss, sse_feed},
        student_form::{
            internal_get_student_form, internal_post_clear_student_form,
            internal_post_new_student_form, internal_post_student_form,
        },
        students::{
            internal_get_search, internal_get_students, internal_post_clear_search,
            internal_post_refresh,
        },
    },
    state::RegistrarState,
};
use axum::{
    Router,
    routing::{any, get, post},
};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[macro_use]
extern crate tracing;

mod client;
mod config;
mod data;
mod error;
mod form;
mod maud_conveniences;
mod notify;
mod overlay;
mod routes;
mod state;
mod sync;
#[cfg(test)]
mod test_support;

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    warn!("signal received, starting graceful shutdown");
}

fn router(state: RegistrarState) -> Router {
    let mut api_proxy = Router::new().route("/api/{*rest}", any(proxy_api));
    if state.config().api_config().permissive_cors() {
        api_proxy = api_proxy.layer(CorsLayer::permissive());
    }

    Router::new()
        .route("/", get(get_index_route))
        .route("/internal/students", get(internal_get_students))
        .route("/internal/students/refresh", post(internal_post_refresh))
        .route("/internal/students/search", get(internal_get_search))
        .route(
            "/internal/students/search/clear",
            post(internal_post_clear_search),
        )
        .route("/internal/students/{id}/edit", post(internal_post_edit_student))
        .route(
            "/internal/students/{id}/delete",
            post(internal_post_delete_student),
        )
        .route(
            "/internal/student_form",
            get(internal_get_student_form).post(internal_post_student_form),
        )
        .route(
            "/internal/student_form/clear",
            post(internal_post_clear_student_form),
        )
        .route(
            "/internal/student_form/new",
            post(internal_post_new_student_form),
        )
        .route("/internal/overlay", get(internal_get_overlay))
        .route("/internal/overlay/edit", post(internal_post_overlay_edit))
        .route(
            "/internal/overlay/edit/clear",
            post(internal_post_overlay_edit_clear),
        )
        .route("/internal/overlay/delete", post(internal_post_overlay_delete))
        .route("/internal/overlay/close", post(internal_post_overlay_close))
        .route("/internal/dismiss", get(internal_get_dismiss))
        .route("/sse_feed", get(sse_feed))
        .merge(api_proxy)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() {
    let dotenv = dotenvy::dotenv();

    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .finish(),
    )
    .expect("unable to set tracing subscriber");

    info!("`tracing` online");
    if let Err(e) = dotenv {
        warn!(?e, "No .env file loaded, using the process environment");
    }

    let config = RuntimeConfiguration::new().expect("unable to create config");
    let state = RegistrarState::new(config.clone()).expect("unable to create state");
    info!(api = %config.api_config().base_url(), "Using student API");

    let app = router(state);

    let listener = TcpListener::bind(config.server_ip())
        .await
        .expect("unable to listen on server ip");

    info!(server_ip = %config.server_ip(), "Listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("unable to serve app");
}
