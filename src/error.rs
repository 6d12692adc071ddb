use crate::data::student::FieldError;
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use snafu::Snafu;
use std::{io, num::ParseIntError};

pub type StudentsResult<T> = Result<T, StudentsError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum StudentsError {
    #[snafu(display("Invalid student fields: {:?}", errors.iter().map(|e| e.loc.join(".")).collect::<Vec<_>>()))]
    Validation { errors: Vec<FieldError> },
    #[snafu(display("Unable to find student with ID: {}", id))]
    MissingStudent { id: i64 },
    #[snafu(display("Error with JSON body"))]
    JsonBody { source: JsonRejection },
    #[snafu(display("Unable to decode student fields"))]
    DecodeBody { source: serde_json::Error },
    #[snafu(display("Error with path parameters"))]
    BadPath { source: PathRejection },
    #[snafu(display("Unable to retrieve env var `{}`", name))]
    BadEnvVar {
        source: dotenvy::Error,
        name: &'static str,
    },
    #[snafu(display("Unable to parse request body limit"))]
    ParseBodyLimit { source: ParseIntError },
    #[snafu(display("Unable to listen on {}", address))]
    BindListener { source: io::Error, address: String },
    #[snafu(display("Error serving app"))]
    Serve { source: io::Error },
}

impl IntoResponse for StudentsError {
    #[allow(clippy::match_same_arms)]
    fn into_response(self) -> Response {
        const ISE: StatusCode = StatusCode::INTERNAL_SERVER_ERROR; //internal server error
        const NF: StatusCode = StatusCode::NOT_FOUND; //not found
        const BI: StatusCode = StatusCode::UNPROCESSABLE_ENTITY; //bad input

        let status_code = match &self {
            Self::Validation { .. } => BI,
            Self::MissingStudent { .. } => NF,
            Self::JsonBody { source } => match source {
                JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => BI,
                _ => source.status(),
            },
            Self::DecodeBody { .. } => BI,
            Self::BadPath { .. } => BI,
            Self::BadEnvVar { .. } | Self::ParseBodyLimit { .. } => ISE,
            Self::BindListener { .. } | Self::Serve { .. } => ISE,
        };

        if status_code.is_server_error() {
            error!(?self, "Error!");
        } else {
            warn!(%self, %status_code, "Rejected request");
        }

        let detail = match self {
            Self::Validation { errors } => json!(errors),
            Self::MissingStudent { .. } => json!("Student not found"),
            Self::JsonBody { source } => json!(source.body_text()),
            Self::BadPath { source } => json!(source.body_text()),
            other => json!(other.to_string()),
        };

        (status_code, Json(json!({ "detail": detail }))).into_response()
    }
}
