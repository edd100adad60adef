use crate::error::{MissingFieldSnafu, RegistrarResult};
use maud::Render;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// A student before the server has given it an id: the create body, and what forms submit.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

/// Update body. Absent fields are left alone by the server.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl StudentDraft {
    pub fn ensure_complete(&self) -> RegistrarResult<()> {
        for (field, value) in [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
        ] {
            snafu::ensure!(!value.trim().is_empty(), MissingFieldSnafu { field });
        }
        Ok(())
    }

    pub fn is_blank(&self) -> bool {
        self.name.is_empty() && self.email.is_empty() && self.phone.is_empty()
    }
}

impl From<&Student> for StudentDraft {
    fn from(student: &Student) -> Self {
        Self {
            name: student.name.clone(),
            email: student.email.clone(),
            phone: student.phone.clone(),
        }
    }
}

impl From<StudentDraft> for StudentPatch {
    fn from(StudentDraft { name, email, phone }: StudentDraft) -> Self {
        Self {
            name: Some(name),
            email: Some(email),
            phone: Some(phone),
        }
    }
}

impl Render for Student {
    fn render_to(&self, buffer: &mut String) {
        self.name.render_to(buffer);
    }
}
