use crate::{
    data::student::Student,
    form::{FormSlot, StudentForm},
    maud_conveniences::{modal, spinner},
};
use maud::{Markup, html};

#[derive(Debug, Clone)]
pub struct EditOverlay {
    pub student_id: i64,
    pub form: StudentForm,
}

#[derive(Debug, Clone)]
pub struct DeleteOverlay {
    pub student: Student,
    busy: bool,
}

impl DeleteOverlay {
    pub const fn new(student: Student) -> Self {
        Self {
            student,
            busy: false,
        }
    }

    pub const fn is_busy(&self) -> bool {
        self.busy
    }

    /// The id to delete, or `None` if a delete for this overlay is already running.
    pub const fn begin_confirm(&mut self) -> Option<i64> {
        if self.busy {
            return None;
        }
        self.busy = true;
        Some(self.student.id)
    }

    pub const fn finish(&mut self) {
        self.busy = false;
    }
}

#[derive(Debug, Clone, Default)]
pub enum Overlay {
    #[default]
    Closed,
    Edit(EditOverlay),
    ConfirmDelete(DeleteOverlay),
}

impl Overlay {
    pub fn render(&self) -> Markup {
        match self {
            Self::Closed => html! {},
            Self::Edit(EditOverlay { form, .. }) => modal("Edit Student", form.render(FormSlot::EditOverlay)),
            Self::ConfirmDelete(delete) => {
                let body = html! {
                    p class="py-4 text-gray-200" {
                        "Are you sure you want to delete "
                        span class="font-semibold" {"\"" (delete.student) "\""}
                        "? This action cannot be undone."
                    }
                    div class="flex items-center justify-end space-x-2" {
                        button type="button" hx-post="/internal/overlay/close" hx-target="#overlay" class="border border-gray-500 hover:bg-gray-700 font-bold py-2 px-4 rounded" {
                            "Cancel"
                        }
                        button type="button" hx-post="/internal/overlay/delete" hx-target="#overlay" hx-disabled-elt="this" disabled[delete.is_busy()] class="bg-red-600 hover:bg-red-800 font-bold py-2 px-4 rounded disabled:opacity-50 flex items-center space-x-2" {
                            span {"Delete"}
                            span class="htmx-indicator" {(spinner())}
                        }
                    }
                };
                modal("Confirm Deletion", body)
            }
        }
    }
}

/// Everything on screen besides the list itself: the main form and whichever overlay is open.
#[derive(Debug, Default)]
pub struct Workspace {
    pub main_form: StudentForm,
    pub overlay: Overlay,
}

impl Workspace {
    pub fn open_edit(&mut self, student: Student) {
        self.overlay = Overlay::Edit(EditOverlay {
            student_id: student.id,
            form: StudentForm::editing(student),
        });
    }

    pub fn open_delete(&mut self, student: Student) {
        self.overlay = Overlay::ConfirmDelete(DeleteOverlay::new(student));
    }

    pub fn close_overlay(&mut self) {
        self.overlay = Overlay::Closed;
    }

    /// Points the main form at `target` unless it already is.
    pub fn sync_main_form(&mut self, target: Option<Student>) {
        if self.main_form.target() != target.as_ref() {
            self.main_form.retarget(target);
        }
    }

    /// Settles a confirmed delete: close on success, otherwise stay open for a retry or cancel.
    pub fn finish_delete(&mut self, id: i64, success: bool) {
        if let Overlay::ConfirmDelete(delete) = &mut self.overlay {
            if delete.student.id != id {
                return;
            }
            if success {
                self.overlay = Overlay::Closed;
            } else {
                delete.finish();
            }
        }
    }
}
