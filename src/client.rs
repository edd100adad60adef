use crate::{
    config::ApiConfig,
    data::student::{Student, StudentDraft, StudentPatch},
    error::{
        BuildClientSnafu, ParseBodySnafu, ReadBodySnafu, RegistrarError, RegistrarResult,
        SendRequestSnafu,
    },
};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use snafu::ResultExt;

/// The remote student collection.
///
/// Every method issues exactly one request. `list` and `search` coerce any non-array body into an
/// empty list; the single-record methods resolve to `None` on `204 No Content` or an empty body.
#[allow(async_fn_in_trait)]
pub trait StudentApi {
    async fn list(&self) -> RegistrarResult<Vec<Student>>;
    async fn search(&self, term: &str) -> RegistrarResult<Vec<Student>>;
    async fn get(&self, id: i64) -> RegistrarResult<Option<Student>>;
    async fn create(&self, draft: &StudentDraft) -> RegistrarResult<Option<Student>>;
    async fn update(&self, id: i64, patch: &StudentPatch) -> RegistrarResult<Option<Student>>;
    async fn delete(&self, id: i64) -> RegistrarResult<()>;
}

#[derive(Clone, Debug)]
pub struct HttpStudentApi {
    http: Client,
    students_url: String,
}

impl HttpStudentApi {
    pub fn new(config: &ApiConfig) -> RegistrarResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .context(BuildClientSnafu)?;
        Ok(Self::with_client(http, config))
    }

    pub fn with_client(http: Client, config: &ApiConfig) -> Self {
        Self {
            http,
            students_url: config.students_url(),
        }
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    fn student_url(&self, id: i64) -> String {
        format!("{}/{id}", self.students_url)
    }

    async fn send(&self, request: RequestBuilder, url: &str) -> RegistrarResult<reqwest::Response> {
        request.send().await.context(SendRequestSnafu { url })
    }

    async fn fetch_list(&self, request: RequestBuilder, url: &str) -> RegistrarResult<Vec<Student>> {
        let rsp = self.send(request, url).await?;
        let body: Option<serde_json::Value> = handle_response(rsp, url).await?;
        records_from(body, url)
    }
}

impl StudentApi for HttpStudentApi {
    async fn list(&self) -> RegistrarResult<Vec<Student>> {
        debug!(url = %self.students_url, "Fetching students");
        let students = self
            .fetch_list(self.http.get(&self.students_url), &self.students_url)
            .await?;
        debug!(count = students.len(), "Fetched students");
        Ok(students)
    }

    async fn search(&self, term: &str) -> RegistrarResult<Vec<Student>> {
        let url = format!("{}/search", self.students_url);
        debug!(?term, %url, "Searching students");

        let students = self
            .fetch_list(self.http.get(&url).query(&[("name", term)]), &url)
            .await
            .inspect_err(|e| error!(?e, ?term, "Error searching students"))?;
        debug!(count = students.len(), "Search results");
        Ok(students)
    }

    async fn get(&self, id: i64) -> RegistrarResult<Option<Student>> {
        let url = self.student_url(id);
        let rsp = self.send(self.http.get(&url), &url).await?;
        handle_response(rsp, &url).await
    }

    async fn create(&self, draft: &StudentDraft) -> RegistrarResult<Option<Student>> {
        debug!(?draft, "Creating student");
        let rsp = self
            .send(self.http.post(&self.students_url).json(draft), &self.students_url)
            .await?;
        let created: Option<Student> = handle_response(rsp, &self.students_url).await?;
        debug!(?created, "Created student");
        Ok(created)
    }

    async fn update(&self, id: i64, patch: &StudentPatch) -> RegistrarResult<Option<Student>> {
        let url = self.student_url(id);
        debug!(id, ?patch, "Updating student");
        let rsp = self.send(self.http.put(&url).json(patch), &url).await?;
        let updated: Option<Student> = handle_response(rsp, &url).await?;
        debug!(?updated, "Updated student");
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> RegistrarResult<()> {
        let url = self.student_url(id);
        debug!(id, "Deleting student");

        let rsp = self
            .send(
                self.http
                    .delete(&url)
                    .header(reqwest::header::CONTENT_TYPE, "application/json"),
                &url,
            )
            .await?;

        let status = rsp.status();
        if !status.is_success() {
            let body = rsp.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                format!("Failed to delete student with ID {id}")
            } else {
                body
            };
            error!(id, %status, ?message, "Error deleting student");
            return Err(RegistrarError::Remote { status, message });
        }

        debug!(id, "Student deleted successfully");
        Ok(())
    }
}

/// Fails on any non-2xx status with the body text as the message. `204` and empty bodies give `None`.
async fn handle_response<T: DeserializeOwned>(
    rsp: reqwest::Response,
    url: &str,
) -> RegistrarResult<Option<T>> {
    let status = rsp.status();
    if !status.is_success() {
        let message = rsp.text().await.context(ReadBodySnafu { url })?;
        return Err(RegistrarError::Remote { status, message });
    }
    if status == StatusCode::NO_CONTENT {
        return Ok(None);
    }

    let text = rsp.text().await.context(ReadBodySnafu { url })?;
    if text.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(&text)
        .context(ParseBodySnafu { url })
        .map(Some)
}

fn records_from(body: Option<serde_json::Value>, url: &str) -> RegistrarResult<Vec<Student>> {
    match body {
        Some(list @ serde_json::Value::Array(_)) => {
            serde_json::from_value(list).context(ParseBodySnafu { url })
        }
        other => {
            warn!(?other, %url, "Expected a list of students, treating as empty");
            Ok(Vec::new())
        }
    }
}
