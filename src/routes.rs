pub mod index;
pub mod overlays;
pub mod proxy;
pub mod sse;
pub mod student_form;
pub mod students;
