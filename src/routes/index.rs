use crate::{
    routes::{student_form::render_form_card, students::render_search_bar},
    state::RegistrarState,
};
use axum::extract::State;
use maud::{Markup, html};

pub async fn get_index_route(State(state): State<RegistrarState>) -> Markup {
    let editing = state.editing().await;
    let search_term = state.snapshot().await.search_term;

    let (form_card, overlay) = {
        let mut workspace = state.workspace().lock().await;
        workspace.sync_main_form(editing);
        (
            render_form_card(&workspace.main_form),
            workspace.overlay.render(),
        )
    };

    state.render(html! {
        div hx-ext="sse" sse-connect="/sse_feed" class="w-full px-8 flex flex-col space-y-6" {
            header class="flex flex-row items-center justify-between" {
                h1 class="text-2xl font-semibold" {"School Management System"}
                div id="search_bar" class="max-w-md w-full" {
                    (render_search_bar(&search_term))
                }
            }

            div class="flex flex-col lg:flex-row gap-6" {
                div id="form_card" class="bg-gray-800 p-8 rounded shadow-md lg:w-1/3 w-full" {
                    (form_card)
                }
                div class="bg-gray-800 p-8 rounded shadow-md lg:w-2/3 w-full" {
                    div id="all_students" hx-post="/internal/students/refresh" hx-trigger="load" {}
                    div hx-get="/internal/students" hx-trigger="sse:roster" hx-target="#all_students" {}
                }
            }

            div id="overlay" {
                (overlay)
            }
            div id="toasts" sse-swap="toast" hx-swap="afterbegin" class="fixed top-4 right-4 flex flex-col space-y-2 z-50" {}
        }
    })
}
