use crate::{
    data::student::{Student, StudentCreate, StudentUpdate},
    error::{BadPathSnafu, JsonBodySnafu, StudentsResult},
    state::StudentsState,
};
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use serde_json::Value;
use snafu::ResultExt;

pub async fn get_students(State(state): State<StudentsState>) -> Json<Vec<Student>> {
    Json(state.list().await)
}

pub async fn post_student(
    State(state): State<StudentsState>,
    body: Result<Json<Value>, JsonRejection>,
) -> StudentsResult<(StatusCode, Json<Student>)> {
    let Json(body) = body.context(JsonBodySnafu)?;
    let student = state.create(StudentCreate::from_json(body)?).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

pub async fn get_student(
    State(state): State<StudentsState>,
    id: Result<Path<i64>, PathRejection>,
) -> StudentsResult<Json<Student>> {
    let Path(id) = id.context(BadPathSnafu)?;
    Ok(Json(state.get_by_id(id).await?))
}

pub async fn put_student(
    State(state): State<StudentsState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> StudentsResult<Json<Student>> {
    let Path(id) = id.context(BadPathSnafu)?;
    let Json(body) = body.context(JsonBodySnafu)?;
    let update = StudentUpdate::from_json(body)?;
    Ok(Json(state.update(id, update).await?))
}

pub async fn delete_student(
    State(state): State<StudentsState>,
    id: Result<Path<i64>, PathRejection>,
) -> StudentsResult<StatusCode> {
    let Path(id) = id.context(BadPathSnafu)?;
    state.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
