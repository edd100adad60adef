use crate::{
    client::HttpStudentApi,
    config::RuntimeConfiguration,
    error::RegistrarResult,
    maud_conveniences::render_nav,
    notify::{FeedEvent, Notifier},
    overlay::Workspace,
    sync::SyncController,
};
use maud::{DOCTYPE, Markup, html};
use std::{ops::Deref, sync::Arc};
use tokio::sync::{Mutex, broadcast::Receiver};

#[derive(Clone)]
pub struct RegistrarState {
    controller: Arc<SyncController<HttpStudentApi>>,
    workspace: Arc<Mutex<Workspace>>,
    api: HttpStudentApi,
    config: RuntimeConfiguration,
    notifier: Notifier,
}

impl RegistrarState {
    pub fn new(config: RuntimeConfiguration) -> RegistrarResult<Self> {
        let api = HttpStudentApi::new(&config.api_config())?;
        let notifier = Notifier::new();

        Ok(Self {
            controller: Arc::new(SyncController::new(api.clone(), notifier.clone())),
            workspace: Arc::new(Mutex::new(Workspace::default())),
            api,
            config,
            notifier,
        })
    }

    #[allow(clippy::unused_self)] //in case self is ever needed :)
    pub fn render(&self, markup: Markup) -> Markup {
        html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="UTF-8" {}
                    meta name="viewport" content="width=device-width, initial-scale=1.0" {}
                    script src="https://unpkg.com/htmx.org@2.0.4" integrity="sha384-HGfztofotfshcF7+8n44JQL2oJmowVChPTg48S+jvZoztPfvwD79OC/LTtG6dMp+" crossorigin="anonymous" {}
                    script src="https://unpkg.com/htmx-ext-sse@2.2.3" integrity="sha384-Y4gc0CK6Kg+hmulDc6rZPJu0tqvk7EWlih0Oh+2OkAi1ZDlCbBDCQEE2uVk472Ky" crossorigin="anonymous" {}
                    script src="https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4" {}
                    title { "School Management System" }
                }
                body hx-ext="sse" class="bg-gray-900 min-h-screen flex flex-col text-white" {
                    (render_nav())
                    (markup)
                }
            }
        }
    }

    pub fn workspace(&self) -> &Mutex<Workspace> {
        &self.workspace
    }

    /// The HTTP client shared with the controller, for the `/api` proxy.
    pub fn http(&self) -> &reqwest::Client {
        self.api.http()
    }

    pub const fn config(&self) -> &RuntimeConfiguration {
        &self.config
    }

    pub fn subscribe_to_sse_feed(&self) -> Receiver<FeedEvent> {
        self.notifier.subscribe()
    }
}

impl Deref for RegistrarState {
    type Target = SyncController<HttpStudentApi>;

    fn deref(&self) -> &Self::Target {
        &self.controller
    }
}
