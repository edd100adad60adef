use crate::{
    data::student::StudentDraft,
    form::{ClearOutcome, FormSlot, StudentForm},
    maud_conveniences::title,
    state::RegistrarState,
};
use axum::{Form, extract::State};
use maud::{Markup, html};

pub fn render_form_card(form: &StudentForm) -> Markup {
    html! {
        div class="flex flex-row items-center justify-between" {
            @if form.target().is_some() {
                (title("Edit Student"))
                button class="border border-gray-500 hover:bg-gray-700 py-1 px-3 rounded text-sm" hx-post="/internal/student_form/new" hx-target="#form_card" {
                    "+ New"
                }
            } @else {
                (title("Add New Student"))
            }
        }
        (form.render(FormSlot::Main))
    }
}

pub async fn internal_get_student_form(State(state): State<RegistrarState>) -> Markup {
    let editing = state.editing().await;
    let mut workspace = state.workspace().lock().await;
    workspace.sync_main_form(editing);
    render_form_card(&workspace.main_form)
}

pub async fn internal_post_student_form(
    State(state): State<RegistrarState>,
    Form(draft): Form<StudentDraft>,
) -> Markup {
    let submitted = state.workspace().lock().await.main_form.begin_submit(draft);
    let Some(draft) = submitted else {
        debug!("Ignoring a submit while a save is in flight");
        return render_form_card(&state.workspace().lock().await.main_form);
    };

    //owns the submit guard, and runs to completion even if this request is dropped
    let saving = tokio::spawn({
        let state = state.clone();
        async move {
            let result = state.save(draft).await;
            let editing = state.editing().await;

            let mut workspace = state.workspace().lock().await;
            workspace.main_form.finish_submit(&result);
            if result.is_ok() {
                workspace.main_form.retarget(editing);
            }
        }
    });
    if let Err(e) = saving.await {
        error!(?e, "Student save task failed");
        state
            .workspace()
            .lock()
            .await
            .main_form
            .finish_submit(&Ok(()));
    }

    render_form_card(&state.workspace().lock().await.main_form)
}

pub async fn internal_post_clear_student_form(State(state): State<RegistrarState>) -> Markup {
    let outcome = state.workspace().lock().await.main_form.clear();
    if outcome == ClearOutcome::CancelRequested {
        state.cancel_edit().await;
    }

    render_form_card(&state.workspace().lock().await.main_form)
}

pub async fn internal_post_new_student_form(State(state): State<RegistrarState>) -> Markup {
    state.cancel_edit().await;

    let mut workspace = state.workspace().lock().await;
    workspace.sync_main_form(None);
    render_form_card(&workspace.main_form)
}
