use crate::state::RegistrarState;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use maud::{Markup, html};
use std::convert::Infallible;
use tokio_stream::{StreamExt, wrappers::BroadcastStream};

pub async fn sse_feed(
    State(state): State<RegistrarState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(state.subscribe_to_sse_feed())
        .filter_map(|event| match event {
            Ok(event) => Some(event),
            Err(e) => {
                warn!(?e, "SSE subscriber lagged, dropping events");
                None
            }
        })
        .map(|event| Ok(event.into_sse_event()));

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Toasts ask for this after a few seconds and then remove themselves.
pub async fn internal_get_dismiss() -> Markup {
    html! {}
}
