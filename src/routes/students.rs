use crate::{
    data::student::Student,
    maud_conveniences::{render_table, spinner, title},
    state::RegistrarState,
    sync::RosterState,
};
use axum::extract::{Query, State};
use maud::{Markup, html};
use serde::Deserialize;

pub fn render_students(roster: &RosterState) -> Markup {
    let student_to_row = |student: &Student| {
        [
            html! {(student.id)},
            html! {(student.name)},
            html! {(student.email)},
            html! {(student.phone)},
            html! {
                div class="flex flex-row space-x-2" {
                    button class="border border-blue-500 text-blue-300 hover:bg-blue-800 py-1 px-3 rounded text-sm" hx-post={"/internal/students/" (student.id) "/edit"} hx-target="#overlay" {
                        "Edit"
                    }
                    button class="border border-red-500 text-red-300 hover:bg-red-800 py-1 px-3 rounded text-sm" hx-post={"/internal/students/" (student.id) "/delete"} hx-target="#overlay" {
                        "Delete"
                    }
                }
            },
        ]
    };

    let heading = html! {
        div class="flex flex-row items-center justify-between" {
            (title("Students List"))
            span class="bg-blue-600 rounded-full px-3 py-1 text-sm" {(roster.records.len()) " students"}
        }
    };

    html! {
        @if roster.loading {
            (heading)
            div class="flex flex-col items-center justify-center py-16 space-y-3" {
                (spinner())
                p {"Loading students..."}
            }
        } @else if roster.records.is_empty() {
            (heading)
            div class="bg-blue-100 border border-blue-400 text-blue-800 px-4 py-3 rounded" {"No students found."}
        } @else {
            (render_table(
                heading,
                ["ID", "Name", "Email", "Phone", "Actions"],
                roster.records.iter().map(student_to_row).collect(),
            ))
        }
    }
}

pub fn render_search_bar(search_term: &str) -> Markup {
    html! {
        form hx-get="/internal/students/search" hx-target="#all_students" class="flex flex-row space-x-2" {
            input type="search" name="term" value=(search_term) placeholder="Search students..." class="shadow appearance-none border rounded w-full py-2 px-3 leading-tight focus:outline-none focus:shadow-outline bg-gray-700 border-gray-600";
            button type="submit" class="bg-blue-600 hover:bg-blue-800 font-bold py-2 px-4 rounded" {"Search"}
            @if !search_term.is_empty() {
                button type="button" hx-post="/internal/students/search/clear" hx-target="#all_students" class="border border-gray-500 hover:bg-gray-700 font-bold py-2 px-4 rounded" {
                    "Clear"
                }
            }
        }
    }
}

/// The list plus an out-of-band refresh of the search bar, so its clear button tracks the term.
fn list_with_search_bar(roster: &RosterState) -> Markup {
    html! {
        (render_students(roster))
        div id="search_bar" hx-swap-oob="innerHTML" {
            (render_search_bar(&roster.search_term))
        }
    }
}

pub async fn internal_get_students(State(state): State<RegistrarState>) -> Markup {
    render_students(&state.snapshot().await)
}

pub async fn internal_post_refresh(State(state): State<RegistrarState>) -> Markup {
    state.refresh().await;
    render_students(&state.snapshot().await)
}

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub term: String,
}

pub async fn internal_get_search(
    State(state): State<RegistrarState>,
    Query(SearchQuery { term }): Query<SearchQuery>,
) -> Markup {
    state.search(&term).await;
    list_with_search_bar(&state.snapshot().await)
}

pub async fn internal_post_clear_search(State(state): State<RegistrarState>) -> Markup {
    state.clear_search().await;
    list_with_search_bar(&state.snapshot().await)
}
