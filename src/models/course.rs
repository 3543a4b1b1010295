use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "lowercase")]
pub enum CourseRole {
    Student,
    Teacher,
}

impl CourseRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseRole::Student => "student",
            CourseRole::Teacher => "teacher",
        }
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct CourseInstitution {
    pub id: i64,
    pub nombre: String,
    #[serde(default)]
    pub colorinstitucional: Option<String>,
    #[serde(default)]
    pub logotipo: Option<String>,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct CourseGrade {
    pub id: i64,
    pub name: String,
    pub order: i32,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct CourseDto {
    pub id: i64,
    pub nombre: String,
    #[serde(default)]
    pub prompt: Option<String>,
    pub institution_id: i64,
    #[serde(default)]
    pub grade_id: Option<i64>,
    #[serde(default)]
    pub institution: Option<CourseInstitution>,
    #[serde(default)]
    pub grade: Option<CourseGrade>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teachers_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub students_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files_count: Option<u32>,
    #[serde(default)]
    pub emoji: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Inscripción del usuario en un curso (elemento de la caché de cursos)
#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct CourseEnrollment {
    pub id: i64,
    pub user_id: i64,
    pub course_id: i64,
    pub year: i32,
    pub role_in_course: CourseRole,
    #[serde(default)]
    pub enrolled_at: Option<String>,
    #[serde(default)]
    pub course: Option<CourseDto>,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug, Default)]
pub struct MyCoursesResponse {
    #[serde(default)]
    pub enrollments: Vec<CourseEnrollment>,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct CourseEnrollmentUser {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<crate::models::auth::UserRole>,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct CourseEnrollmentWithUser {
    #[serde(flatten)]
    pub enrollment: CourseEnrollment,
    #[serde(default)]
    pub user: Option<CourseEnrollmentUser>,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct CourseEnrollmentsResponse {
    pub course: CourseDto,
    pub enrollments: Vec<CourseEnrollmentWithUser>,
    pub total: u32,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct CourseFileDto {
    pub id: i64,
    pub filename: String,
    pub filepath: String,
    pub filesize: u64,
    pub mimetype: String,
    pub uploaded_by: i64,
    #[serde(default)]
    pub uploaded_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_parsed_content: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed_at: Option<String>,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct CourseRef {
    pub id: i64,
    pub nombre: String,
}

/// Respuesta de `POST /courses/{id}/files`
#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct CourseFileUploadResponse {
    #[serde(default)]
    pub msg: Option<String>,
    pub file: CourseFileDto,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct CourseFilesResponse {
    pub course: CourseRef,
    pub files: Vec<CourseFileDto>,
    pub total: u32,
}

/// Cambios parciales de un curso. `None` = campo no enviado;
/// `Some(None)` en los campos anulables = enviar `null`.
#[derive(Clone, PartialEq, Serialize, Deserialize, Debug, Default)]
pub struct CourseUpdatePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institution_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade_id: Option<Option<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct CourseResponse {
    pub course: CourseDto,
}
