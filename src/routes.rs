use crate::state::StudentsState;
use axum::{Router, routing::get};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

pub mod students;

pub fn router(state: StudentsState, body_limit: usize) -> Router {
    let trace_layer = TraceLayer::new_for_http();

    Router::new()
        .route(
            "/students",
            get(students::get_students).post(students::post_student),
        )
        .route(
            "/students/{id}",
            get(students::get_student)
                .put(students::put_student)
                .delete(students::delete_student),
        )
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(trace_layer)
        .with_state(state)
}
