use axum::response::sse::Event;
use maud::{Markup, html};
use tokio::sync::broadcast::{Receiver, Sender, channel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
    Toast(Toast),
    /// `records` changed; browsers re-fetch the rendered list.
    RosterChanged,
}

impl FeedEvent {
    pub fn into_sse_event(self) -> Event {
        match self {
            Self::Toast(toast) => Event::default()
                .event("toast")
                .data(render_toast(&toast).into_string()),
            Self::RosterChanged => Event::default().event("roster").data("changed"),
        }
    }
}

pub fn render_toast(toast: &Toast) -> Markup {
    let colours = match toast.kind {
        ToastKind::Success => "bg-green-100 border-green-400 text-green-800",
        ToastKind::Error => "bg-red-100 border-red-400 text-red-700",
    };

    html! {
        div role="alert" class={"border px-4 py-3 rounded shadow-md " (colours)} hx-get="/internal/dismiss" hx-trigger="load delay:5s" hx-swap="delete" {
            (toast.message)
        }
    }
}

#[derive(Clone, Debug)]
pub struct Notifier {
    sender: Sender<FeedEvent>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (sender, _rx) = channel(32);
        Self { sender }
    }

    pub fn subscribe(&self) -> Receiver<FeedEvent> {
        self.sender.subscribe()
    }

    pub fn success(&self, message: impl Into<String>) {
        self.send(FeedEvent::Toast(Toast {
            kind: ToastKind::Success,
            message: message.into(),
        }));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.send(FeedEvent::Toast(Toast {
            kind: ToastKind::Error,
            message: message.into(),
        }));
    }

    pub fn roster_changed(&self) {
        self.send(FeedEvent::RosterChanged);
    }

    fn send(&self, event: FeedEvent) {
        //no subscribers just means no browser is listening
        let _ = self.sender.send(event);
    }
}

#[cfg(test)]
pub fn drain(rx: &mut Receiver<FeedEvent>) -> Vec<FeedEvent> {
    std::iter::from_fn(|| rx.try_recv().ok()).collect()
}
