//! # Login
//!
//! Two unrelated checks against two unrelated sheets. Both compare raw cells with the
//! submitted values, exactly and case-sensitively. Header rows never match.
//!
//! - Students sign in with their email and use their registration number as password
//! - Faculty and admins sign in with email and password, their role is whatever the sheet says
//!
//! No sessions are issued. The frontend keeps what it gets back.
use serde::{Deserialize, Serialize};

use crate::table::{Table, cell};

pub const STUDENT_ROLE: &str = "student";

const STUDENT_EMAIL: usize = 1;
const STUDENT_REG_NO: usize = 3;

const FACULTY_EMAIL: usize = 0;
const FACULTY_PASSWORD: usize = 1;
const FACULTY_ROLE: usize = 2;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentLogin {
    pub email: String,
    pub reg_no: String,
}

#[derive(Deserialize)]
pub struct FacultyLogin {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct LoginSuccess {
    pub success: bool,
    pub role: String,
    pub identifier: String,
}

impl LoginSuccess {
    fn new(role: &str, identifier: &str) -> Self {
        Self {
            success: true,
            role: role.to_string(),
            identifier: identifier.to_string(),
        }
    }
}

pub fn check_student(students: &Table, login: &StudentLogin) -> Option<LoginSuccess> {
    students
        .data_rows()
        .iter()
        .find(|row| {
            cell(row, STUDENT_EMAIL) == Some(login.email.as_str())
                && cell(row, STUDENT_REG_NO) == Some(login.reg_no.as_str())
        })
        .map(|_| LoginSuccess::new(STUDENT_ROLE, &login.reg_no))
}

pub fn check_faculty(faculty: &Table, login: &FacultyLogin) -> Option<LoginSuccess> {
    faculty
        .data_rows()
        .iter()
        .find(|row| {
            cell(row, FACULTY_EMAIL) == Some(login.email.as_str())
                && cell(row, FACULTY_PASSWORD) == Some(login.password.as_str())
        })
        .map(|row| LoginSuccess::new(cell(row, FACULTY_ROLE).unwrap_or_default(), &login.email))
}
