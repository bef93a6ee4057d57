use rocket::serde::json::json;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    audit::LogKind,
    directory::{optional, required, Directory},
};

/// A registered student, keyed by admission number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub admission: String,
    pub name: String,
    pub class: String,
    pub dorm: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

/// A registration request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub admission: String,
    pub name: String,
    pub class: String,
    pub dorm: String,
    #[serde(default)]
    pub photo: Option<String>,
}

/// A student login request. Every field must match the registered student.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentCredentials {
    pub admission: String,
    pub name: String,
    pub class: String,
    pub dorm: String,
}

impl StudentCredentials {
    /// Admission number, class and dorm must match exactly; the name ignores case.
    pub fn matches(&self, student: &Student) -> bool {
        student.admission == self.admission.trim()
            && student.class == self.class.trim()
            && student.dorm == self.dorm.trim()
            && student.name.to_lowercase() == self.name.trim().to_lowercase()
    }
}

impl Directory {
    pub fn student(&self, admission: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.admission == admission)
    }

    /// Admit a new student.
    pub fn register_student(&mut self, registration: Registration) -> Result<Student> {
        let student = Student {
            admission: required("Admission number", &registration.admission)?,
            name: required("Name", &registration.name)?,
            class: required("Class", &registration.class)?,
            dorm: required("Dorm", &registration.dorm)?,
            photo: optional(registration.photo),
        };
        if !self.has_class(&student.class) {
            return Err(Error::validation(format!("Unknown class '{}'", student.class)));
        }
        if !self.has_dorm(&student.dorm) {
            return Err(Error::validation(format!("Unknown dorm '{}'", student.dorm)));
        }
        if self.student(&student.admission).is_some() {
            return Err(Error::duplicate(format!(
                "Admission number {} is already registered",
                student.admission
            )));
        }

        self.students.push(student.clone());
        self.log_with(
            LogKind::Register,
            format!("New student registered: {}", student.name),
            json!({ "adm": student.admission, "class": student.class, "dorm": student.dorm }),
        );
        Ok(student)
    }

    /// Check a student's credentials, logging the successful login.
    pub fn login_student(&mut self, credentials: &StudentCredentials) -> Result<Student> {
        let student = self
            .students
            .iter()
            .find(|s| credentials.matches(s))
            .cloned()
            .ok_or_else(|| Error::unauthorized("Invalid student credentials"))?;

        self.log_with(
            LogKind::Login,
            format!("Student logged in: {}", student.name),
            json!({ "adm": student.admission }),
        );
        Ok(student)
    }
}
