use crate::{
    data::student::{Student, StudentDraft},
    error::RegistrarResult,
    maud_conveniences::{form_submit_button, simple_form_element},
};
use maud::{Markup, html};

/// Which form on the page this is; decides where it posts and what it swaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormSlot {
    Main,
    EditOverlay,
}

impl FormSlot {
    const fn submit_url(self) -> &'static str {
        match self {
            Self::Main => "/internal/student_form",
            Self::EditOverlay => "/internal/overlay/edit",
        }
    }

    const fn clear_url(self) -> &'static str {
        match self {
            Self::Main => "/internal/student_form/clear",
            Self::EditOverlay => "/internal/overlay/edit/clear",
        }
    }

    const fn target(self) -> &'static str {
        match self {
            Self::Main => "#form_card",
            Self::EditOverlay => "#overlay",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    /// Nothing was being edited: the parent should leave "new record" mode.
    CancelRequested,
    StillEditing,
}

#[derive(Debug, Clone, Default)]
pub struct StudentForm {
    target: Option<Student>,
    draft: StudentDraft,
    is_submitting: bool,
    error: Option<String>,
}

impl StudentForm {
    pub fn editing(student: Student) -> Self {
        let mut form = Self::default();
        form.retarget(Some(student));
        form
    }

    pub fn target(&self) -> Option<&Student> {
        self.target.as_ref()
    }

    pub const fn draft(&self) -> &StudentDraft {
        &self.draft
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub const fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    pub fn retarget(&mut self, target: Option<Student>) {
        self.draft = target.as_ref().map(StudentDraft::from).unwrap_or_default();
        self.target = target;
        self.error = None;
    }

    /// Takes the submitted fields as the new draft. `None` if a save is already in flight.
    pub fn begin_submit(&mut self, draft: StudentDraft) -> Option<StudentDraft> {
        if self.is_submitting {
            return None;
        }

        self.is_submitting = true;
        self.error = None;
        self.draft = draft;
        Some(self.draft.clone())
    }

    pub fn finish_submit(&mut self, result: &RegistrarResult<()>) {
        self.is_submitting = false;
        if let Err(e) = result {
            self.error = Some(e.to_string());
        }
    }

    pub fn clear(&mut self) -> ClearOutcome {
        self.draft = StudentDraft::default();
        self.error = None;

        if self.target.is_some() {
            ClearOutcome::StillEditing
        } else {
            ClearOutcome::CancelRequested
        }
    }

    pub fn render(&self, slot: FormSlot) -> Markup {
        let submit_label = if self.target.is_some() { "Update" } else { "Save" };
        let draft = self.draft();

        html! {
            form hx-post=(slot.submit_url()) hx-target=(slot.target()) hx-swap="innerHTML" hx-disabled-elt="find button" class="p-4" {
                (simple_form_element("name", "Name", true, None, Some(&draft.name)))
                (simple_form_element("email", "Email", true, Some("email"), Some(&draft.email)))
                (simple_form_element("phone", "Phone", true, Some("tel"), Some(&draft.phone)))

                @if let Some(error) = self.error() {
                    div class="bg-red-100 border border-red-400 text-red-700 px-4 py-3 rounded relative mb-4" role="alert" {
                        (error)
                    }
                }

                div class="flex items-center justify-end space-x-2" {
                    button type="button" hx-post=(slot.clear_url()) hx-target=(slot.target()) disabled[draft.is_blank() || self.is_submitting()] class="border border-gray-500 hover:bg-gray-700 font-bold py-2 px-4 rounded disabled:opacity-50" {
                        "Clear"
                    }
                    (form_submit_button(Some(submit_label)))
                }
            }
        }
    }
}
