use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use maud::html;
use snafu::Snafu;
use std::{num::ParseIntError, str::ParseBoolError};

pub type RegistrarResult<T> = Result<T, RegistrarError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RegistrarError {
    #[snafu(display("HTTP error! status: {}, message: {}", status, message))]
    Remote {
        status: reqwest::StatusCode,
        message: String,
    },
    #[snafu(display("Error sending request to {}", url))]
    SendRequest { source: reqwest::Error, url: String },
    #[snafu(display("Error reading response body from {}", url))]
    ReadBody { source: reqwest::Error, url: String },
    #[snafu(display("Error parsing JSON response from {}", url))]
    ParseBody {
        source: serde_json::Error,
        url: String,
    },
    #[snafu(display("Error building HTTP client"))]
    BuildClient { source: reqwest::Error },
    #[snafu(display("Unable to retrieve env var `{}`", name))]
    BadEnvVar {
        source: dotenvy::Error,
        name: &'static str,
    },
    #[snafu(display("Unable to parse env var `{}` as a boolean", name))]
    ParseFlag {
        source: ParseBoolError,
        name: &'static str,
    },
    #[snafu(display("Unable to parse env var `{}` as a number of seconds", name))]
    ParseSeconds {
        source: ParseIntError,
        name: &'static str,
    },
    #[snafu(display("The {} field is required", field))]
    MissingField { field: &'static str },
    #[snafu(display("Unable to find student with ID: {}", id))]
    MissingStudent { id: i64 },
}

impl RegistrarError {
    pub const fn status_code(&self) -> StatusCode {
        const ISE: StatusCode = StatusCode::INTERNAL_SERVER_ERROR; //internal server error
        const NF: StatusCode = StatusCode::NOT_FOUND; //not found
        const BI: StatusCode = StatusCode::BAD_REQUEST; //bad input
        const BG: StatusCode = StatusCode::BAD_GATEWAY; //upstream misbehaved

        match self {
            Self::Remote { .. } | Self::SendRequest { .. } | Self::ReadBody { .. } => BG,
            Self::ParseBody { .. } => BG,
            Self::BuildClient { .. }
            | Self::BadEnvVar { .. }
            | Self::ParseFlag { .. }
            | Self::ParseSeconds { .. } => ISE,
            Self::MissingField { .. } => BI,
            Self::MissingStudent { .. } => NF,
        }
    }
}

impl IntoResponse for RegistrarError {
    fn into_response(self) -> Response {
        let basic_error = |desc| {
            html! {
                div class="bg-red-100 border border-red-400 text-red-700 px-4 py-3 rounded relative mb-4" role="alert" {
                    strong class="font-bold" {"Registrar Error "}
                    span {(desc)}
                }
            }
        };

        error!(?self, "Error!");
        (self.status_code(), Html(basic_error(self.to_string()))).into_response()
    }
}
