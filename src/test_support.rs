//! An in-process stand-in for the student REST API, bound to an ephemeral port.

use crate::{
    config::ApiConfig,
    data::student::{Student, StudentDraft},
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::net::TcpListener;

pub fn student(id: i64, name: &str) -> Student {
    Student {
        id,
        name: name.to_string(),
        email: format!("{}@x.com", name.to_lowercase().replace(' ', ".")),
        phone: id.to_string(),
    }
}

#[derive(Default, Debug)]
struct Backend {
    students: Vec<Student>,
    next_id: i64,
    failure: Option<(StatusCode, String)>,
    list_override: Option<String>,
    updates_with_no_content: bool,
    last_search_term: Option<String>,
    last_content_type: Option<String>,
    requests: Vec<String>,
    stall_writes: bool,
}

type Shared = Arc<Mutex<Backend>>;

#[derive(Clone)]
pub struct MockBackend {
    addr: SocketAddr,
    inner: Shared,
}

impl MockBackend {
    pub async fn start(students: Vec<Student>) -> Self {
        let next_id = students.iter().map(|s| s.id).max().unwrap_or(0) + 1;
        let inner = Arc::new(Mutex::new(Backend {
            students,
            next_id,
            ..Backend::default()
        }));

        let app = Router::new()
            .route("/api/students", get(list).post(create))
            .route("/api/students/search", get(search))
            .route(
                "/api/students/{id}",
                get(get_one).put(update).delete(delete),
            )
            .with_state(inner.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, inner }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig::from_parts(&self.base_url(), false)
    }

    pub fn fail_with(&self, status: u16, body: &str) {
        self.inner.lock().unwrap().failure =
            Some((StatusCode::from_u16(status).unwrap(), body.to_string()));
    }

    pub fn recover(&self) {
        self.inner.lock().unwrap().failure = None;
    }

    /// Writes arriving while this is set hang for far longer than any client timeout.
    pub fn stall_writes(&self, stall: bool) {
        self.inner.lock().unwrap().stall_writes = stall;
    }

    pub fn respond_to_list_with(&self, raw_body: &str) {
        self.inner.lock().unwrap().list_override = Some(raw_body.to_string());
    }

    pub fn answer_updates_with_no_content(&self) {
        self.inner.lock().unwrap().updates_with_no_content = true;
    }

    pub fn students(&self) -> Vec<Student> {
        self.inner.lock().unwrap().students.clone()
    }

    pub fn last_search_term(&self) -> Option<String> {
        self.inner.lock().unwrap().last_search_term.clone()
    }

    pub fn last_content_type(&self) -> Option<String> {
        self.inner.lock().unwrap().last_content_type.clone()
    }

    /// Every request seen so far, as `METHOD path`.
    pub fn requests(&self) -> Vec<String> {
        self.inner.lock().unwrap().requests.clone()
    }
}

async fn stall_if_asked(inner: &Shared) {
    let stalled = inner.lock().unwrap().stall_writes;
    if stalled {
        tokio::time::sleep(Duration::from_secs(60)).await;
    }
}

impl Backend {
    fn record(&mut self, request: String) -> Result<(), Response> {
        self.requests.push(request);
        match &self.failure {
            Some((status, body)) => Err((*status, body.clone()).into_response()),
            None => Ok(()),
        }
    }
}

async fn list(State(inner): State<Shared>) -> Response {
    let mut backend = inner.lock().unwrap();
    if let Err(rsp) = backend.record("GET /api/students".into()) {
        return rsp;
    }
    match backend.list_override.clone() {
        Some(raw) => ([(CONTENT_TYPE, "application/json")], raw).into_response(),
        None => Json(backend.students.clone()).into_response(),
    }
}

#[derive(Deserialize)]
struct SearchQuery {
    name: String,
}

async fn search(State(inner): State<Shared>, Query(SearchQuery { name }): Query<SearchQuery>) -> Response {
    let mut backend = inner.lock().unwrap();
    backend.last_search_term = Some(name.clone());
    if let Err(rsp) = backend.record("GET /api/students/search".into()) {
        return rsp;
    }
    let needle = name.to_lowercase();
    let found: Vec<_> = backend
        .students
        .iter()
        .filter(|s| s.name.to_lowercase().contains(&needle))
        .cloned()
        .collect();
    Json(found).into_response()
}

async fn get_one(State(inner): State<Shared>, Path(id): Path<i64>) -> Response {
    let mut backend = inner.lock().unwrap();
    if let Err(rsp) = backend.record(format!("GET /api/students/{id}")) {
        return rsp;
    }
    match backend.students.iter().find(|s| s.id == id) {
        Some(found) => Json(found.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, format!("Student {id} not found")).into_response(),
    }
}

async fn create(State(inner): State<Shared>, headers: HeaderMap, Json(draft): Json<StudentDraft>) -> Response {
    stall_if_asked(&inner).await;
    let mut backend = inner.lock().unwrap();
    backend.last_content_type = content_type(&headers);
    if let Err(rsp) = backend.record("POST /api/students".into()) {
        return rsp;
    }
    let created = Student {
        id: backend.next_id,
        name: draft.name,
        email: draft.email,
        phone: draft.phone,
    };
    backend.next_id += 1;
    backend.students.push(created.clone());
    (StatusCode::CREATED, Json(created)).into_response()
}

#[derive(Deserialize)]
struct Patch {
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
}

async fn update(
    State(inner): State<Shared>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(patch): Json<Patch>,
) -> Response {
    stall_if_asked(&inner).await;
    let mut backend = inner.lock().unwrap();
    backend.last_content_type = content_type(&headers);
    if let Err(rsp) = backend.record(format!("PUT /api/students/{id}")) {
        return rsp;
    }
    let no_content = backend.updates_with_no_content;
    let Some(found) = backend.students.iter_mut().find(|s| s.id == id) else {
        return (StatusCode::NOT_FOUND, format!("Student {id} not found")).into_response();
    };
    if let Some(name) = patch.name {
        found.name = name;
    }
    if let Some(email) = patch.email {
        found.email = email;
    }
    if let Some(phone) = patch.phone {
        found.phone = phone;
    }

    if no_content {
        StatusCode::NO_CONTENT.into_response()
    } else {
        Json(found.clone()).into_response()
    }
}

async fn delete(State(inner): State<Shared>, Path(id): Path<i64>) -> Response {
    stall_if_asked(&inner).await;
    let mut backend = inner.lock().unwrap();
    if let Err(rsp) = backend.record(format!("DELETE /api/students/{id}")) {
        return rsp;
    }
    let before = backend.students.len();
    backend.students.retain(|s| s.id != id);
    if backend.students.len() == before {
        return (StatusCode::NOT_FOUND, String::new()).into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}

fn content_type(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}
