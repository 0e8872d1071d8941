use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State as Extract, rejection::JsonRejection},
};
use serde::Serialize;
use tracing::info;

use crate::{
    challenges::{Challenge, challenges_for_department, validate_department},
    error::AppError,
    login::{FacultyLogin, LoginSuccess, StudentLogin, check_faculty, check_student},
    sheets::{CHALLENGES_RANGE, FACULTY_RANGE, STUDENTS_RANGE},
    state::State,
    table::{Table, distinct_column_values, filter_by_column},
};

pub const CLASS_COLUMN: &str = "Class";

#[derive(Serialize)]
pub struct Added {
    success: bool,
    message: &'static str,
}

pub async fn health_handler() -> &'static str {
    "ok"
}

pub async fn student_login_handler(
    Extract(state): Extract<Arc<State>>,
    payload: Result<Json<StudentLogin>, JsonRejection>,
) -> Result<Json<LoginSuccess>, AppError> {
    let Json(login) = payload.map_err(|_| AppError::MalformedPayload)?;

    let students = state
        .sheets
        .read(STUDENTS_RANGE)
        .await
        .map_err(AppError::store("Login failed"))?;

    check_student(&students, &login)
        .map(Json)
        .ok_or(AppError::AuthenticationDenied)
}

pub async fn faculty_login_handler(
    Extract(state): Extract<Arc<State>>,
    payload: Result<Json<FacultyLogin>, JsonRejection>,
) -> Result<Json<LoginSuccess>, AppError> {
    let Json(login) = payload.map_err(|_| AppError::MalformedPayload)?;

    let users = state
        .sheets
        .read(FACULTY_RANGE)
        .await
        .map_err(AppError::store("Login failed"))?;

    check_faculty(&users, &login)
        .map(Json)
        .ok_or(AppError::AuthenticationDenied)
}

pub async fn students_handler(Extract(state): Extract<Arc<State>>) -> Result<Json<Table>, AppError> {
    state
        .sheets
        .read(STUDENTS_RANGE)
        .await
        .map(Json)
        .map_err(AppError::store("Failed to fetch students"))
}

pub async fn students_by_class_handler(
    Extract(state): Extract<Arc<State>>,
    Path(class_name): Path<String>,
) -> Result<Json<Table>, AppError> {
    let students = state
        .sheets
        .read(STUDENTS_RANGE)
        .await
        .map_err(AppError::store("Failed to fetch students by class"))?;

    Ok(Json(filter_by_column(&students, CLASS_COLUMN, &class_name)))
}

pub async fn classes_handler(
    Extract(state): Extract<Arc<State>>,
) -> Result<Json<Vec<String>>, AppError> {
    let students = state
        .sheets
        .read(STUDENTS_RANGE)
        .await
        .map_err(AppError::store("Failed to fetch classes"))?;

    Ok(Json(
        distinct_column_values(&students, CLASS_COLUMN)
            .into_values()
            .collect(),
    ))
}

pub async fn add_challenge_handler(
    Extract(state): Extract<Arc<State>>,
    payload: Result<Json<Challenge>, JsonRejection>,
) -> Result<Json<Added>, AppError> {
    let Json(challenge) = payload.map_err(|_| AppError::MalformedPayload)?;

    let students = state
        .sheets
        .read(STUDENTS_RANGE)
        .await
        .map_err(AppError::store("Failed to add challenge"))?;

    validate_department(&students, &challenge.department)?;

    info!(title = %challenge.title, department = %challenge.department, "Adding challenge");

    state
        .sheets
        .append(CHALLENGES_RANGE, vec![challenge.into_row()])
        .await
        .map_err(AppError::store("Failed to add challenge"))?;

    Ok(Json(Added {
        success: true,
        message: "Challenge added successfully!",
    }))
}

pub async fn challenges_handler(
    Extract(state): Extract<Arc<State>>,
) -> Result<Json<Table>, AppError> {
    state
        .sheets
        .read(CHALLENGES_RANGE)
        .await
        .map(Json)
        .map_err(AppError::store("Failed to fetch challenges"))
}

pub async fn challenges_by_department_handler(
    Extract(state): Extract<Arc<State>>,
    Path(department): Path<String>,
) -> Result<Json<Table>, AppError> {
    let context = "Failed to fetch challenges by department";

    let students = state
        .sheets
        .read(STUDENTS_RANGE)
        .await
        .map_err(AppError::store(context))?;

    let challenges = state
        .sheets
        .read(CHALLENGES_RANGE)
        .await
        .map_err(AppError::store(context))?;

    Ok(Json(challenges_for_department(
        &students,
        &challenges,
        &department,
    )))
}
