use crate::{
    data::student::{Student, StudentDraft},
    error::{MissingStudentSnafu, RegistrarResult},
    overlay::{Overlay, Workspace},
    routes::student_form::render_form_card,
    state::RegistrarState,
};
use axum::{
    Form,
    extract::{Path, State},
};
use maud::{Markup, html};
use snafu::OptionExt;

/// The overlay, plus the main form card swapped out-of-band since edit intents retarget it too.
fn overlay_and_form_card(workspace: &Workspace) -> Markup {
    html! {
        (workspace.overlay.render())
        div id="form_card" hx-swap-oob="innerHTML" {
            (render_form_card(&workspace.main_form))
        }
    }
}

async fn find_student(state: &RegistrarState, id: i64) -> RegistrarResult<Student> {
    state.lookup(id).await?.context(MissingStudentSnafu { id })
}

pub async fn internal_get_overlay(State(state): State<RegistrarState>) -> Markup {
    state.workspace().lock().await.overlay.render()
}

pub async fn internal_post_edit_student(
    State(state): State<RegistrarState>,
    Path(id): Path<i64>,
) -> RegistrarResult<Markup> {
    let student = find_student(&state, id).await?;
    state.begin_edit(student.clone()).await;

    let mut workspace = state.workspace().lock().await;
    workspace.sync_main_form(Some(student.clone()));
    workspace.open_edit(student);
    Ok(overlay_and_form_card(&workspace))
}

pub async fn internal_post_delete_student(
    State(state): State<RegistrarState>,
    Path(id): Path<i64>,
) -> RegistrarResult<Markup> {
    let student = find_student(&state, id).await?;

    let mut workspace = state.workspace().lock().await;
    workspace.open_delete(student);
    Ok(workspace.overlay.render())
}

pub async fn internal_post_overlay_edit(
    State(state): State<RegistrarState>,
    Form(draft): Form<StudentDraft>,
) -> Markup {
    let submitted = {
        let mut workspace = state.workspace().lock().await;
        match &mut workspace.overlay {
            Overlay::Edit(edit) => edit
                .form
                .begin_submit(draft)
                .map(|draft| (edit.student_id, draft)),
            _ => None,
        }
    };
    let Some((id, draft)) = submitted else {
        return state.workspace().lock().await.overlay.render();
    };

    let saving = tokio::spawn({
        let state = state.clone();
        async move { finish_overlay_edit(&state, id, draft).await }
    });
    if let Err(e) = saving.await {
        error!(?e, id, "Overlay save task failed");
    }

    let workspace = state.workspace().lock().await;
    overlay_and_form_card(&workspace)
}

async fn finish_overlay_edit(state: &RegistrarState, id: i64, draft: StudentDraft) {
    let result = match draft.ensure_complete() {
        Ok(()) => state.update(id, draft.into()).await,
        Err(e) => Err(e),
    };

    //the main form may be editing the record the overlay just saved
    let editing_this = result.is_ok() && state.editing().await.is_some_and(|s| s.id == id);
    if editing_this {
        state.cancel_edit().await;
    }

    let mut workspace = state.workspace().lock().await;
    if let Overlay::Edit(edit) = &mut workspace.overlay {
        if edit.student_id == id {
            edit.form.finish_submit(&result);
            if result.is_ok() {
                workspace.close_overlay();
            }
        }
    }
    if editing_this {
        workspace.sync_main_form(None);
    }
}

pub async fn internal_post_overlay_edit_clear(State(state): State<RegistrarState>) -> Markup {
    let mut workspace = state.workspace().lock().await;
    if let Overlay::Edit(edit) = &mut workspace.overlay {
        //always bound to a record, so this only blanks the draft
        edit.form.clear();
    }
    workspace.overlay.render()
}

pub async fn internal_post_overlay_delete(State(state): State<RegistrarState>) -> Markup {
    let confirmed = match &mut state.workspace().lock().await.overlay {
        Overlay::ConfirmDelete(delete) => delete.begin_confirm(),
        _ => None,
    };
    let Some(id) = confirmed else {
        return state.workspace().lock().await.overlay.render();
    };

    //clears the busy flag even if the confirming request goes away first
    let deleting = tokio::spawn({
        let state = state.clone();
        async move {
            let success = state.remove(id).await;
            state.workspace().lock().await.finish_delete(id, success);
        }
    });
    if let Err(e) = deleting.await {
        error!(?e, id, "Delete task failed");
        state.workspace().lock().await.finish_delete(id, false);
    }

    state.workspace().lock().await.overlay.render()
}

pub async fn internal_post_overlay_close(State(state): State<RegistrarState>) -> Markup {
    state.workspace().lock().await.close_overlay();
    html! {}
}
