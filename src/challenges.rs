use serde::Deserialize;

use crate::{
    error::AppError,
    table::{Row, Table, cross_validate, filter_by_column},
};

pub const DEPARTMENT_COLUMN: &str = "Department";

#[derive(Debug, Deserialize)]
pub struct Challenge {
    pub title: String,
    pub department: String,
    pub link: String,
    pub date: String,
}

impl Challenge {
    /// Sheet row, columns A to D, stored exactly as submitted.
    pub fn into_row(self) -> Row {
        vec![self.title, self.department, self.link, self.date]
    }
}

/// Rejects departments that no student belongs to.
///
/// Unlike the read paths, a Students sheet without a department column is an error here.
pub fn validate_department(students: &Table, department: &str) -> Result<(), AppError> {
    if students.column(DEPARTMENT_COLUMN).is_none() {
        return Err(AppError::ValidationFailed(
            "Department column not found in Students sheet".to_string(),
        ));
    }

    if !cross_validate(students, DEPARTMENT_COLUMN, department) {
        return Err(AppError::ValidationFailed(format!(
            "Invalid department: {department}"
        )));
    }

    Ok(())
}

/// Challenges for a department, or nothing when no student is in that department.
pub fn challenges_for_department(students: &Table, challenges: &Table, department: &str) -> Table {
    if !cross_validate(students, DEPARTMENT_COLUMN, department) {
        return Table::default();
    }

    filter_by_column(challenges, DEPARTMENT_COLUMN, department)
}
