// ============================================================================
// API CLIENT - SOLO COMUNICACIÓN HTTP (Stateless)
// ============================================================================
// NO tiene lógica de negocio, solo arma requests y parsea respuestas.
// La firma de requests la pone el transporte (ver `SignedTransport`).
// ============================================================================

use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;
use crate::models::auth::{
    AuthUser, ChangePasswordRequest, LoginRequest, LoginResponse, MessageResponse, ProfileResponse,
    ProfileUpdate, RefreshResponse, RegisterRequest, RegisterResponse,
};
use crate::models::chat::{CourseChatRequest, CourseChatResponse};
use crate::models::course::{
    CourseDto, CourseEnrollment, CourseEnrollmentsResponse, CourseFileDto,
    CourseFileUploadResponse, CourseFilesResponse, CourseResponse, CourseRole,
    CourseUpdatePayload, MyCoursesResponse,
};
use crate::services::http::{ApiRequest, FormField, HttpTransport, UploadFile};
use crate::utils::constants::AUTH_HEADER;

const CHAT_FALLBACK_MESSAGE: &str = "No se pudo procesar la respuesta del chatbot.";

/// Cliente API - SOLO comunicación HTTP (stateless)
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    transport: Rc<dyn HttpTransport>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, transport: Rc<dyn HttpTransport>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn fetch_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let response = self.transport.send(request).await?;
        response.json::<T>()
    }

    // ------------------------------------------------------------------
    // Auth
    // ------------------------------------------------------------------

    pub async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse, ApiError> {
        log::info!("🔐 Iniciando sesión: {}", credentials.email);
        let request = ApiRequest::post(self.url("/auth/login")).with_json(credentials)?;
        self.fetch_json(request).await
    }

    pub async fn register(&self, details: &RegisterRequest) -> Result<RegisterResponse, ApiError> {
        log::info!("📝 Registrando usuario: {}", details.email);
        let request = ApiRequest::post(self.url("/auth/register")).with_json(details)?;
        self.fetch_json(request).await
    }

    pub async fn update_profile(&self, changes: &ProfileUpdate) -> Result<AuthUser, ApiError> {
        let request = ApiRequest::patch(self.url("/auth/profile")).with_json(changes)?;
        let response: ProfileResponse = self.fetch_json(request).await?;
        Ok(response.user)
    }

    /// El backend devuelve el usuario sin envolver
    pub async fn get_profile(&self) -> Result<AuthUser, ApiError> {
        self.fetch_json(ApiRequest::get(self.url("/auth/profile"))).await
    }

    pub async fn change_password(&self, request: &ChangePasswordRequest) -> Result<MessageResponse, ApiError> {
        log::info!("🔑 Cambiando contraseña: {}", request.email);
        let request = ApiRequest::post(self.url("/auth/change-password")).with_json(request)?;
        self.fetch_json(request).await
    }

    /// Lleva su propio `Authorization` con el refresh token
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<RefreshResponse, ApiError> {
        let request = ApiRequest::post(self.url("/auth/refresh"))
            .with_header(AUTH_HEADER, format!("Bearer {}", refresh_token));
        self.fetch_json(request).await
    }

    // ------------------------------------------------------------------
    // Cursos
    // ------------------------------------------------------------------

    pub async fn my_courses(&self) -> Result<Vec<CourseEnrollment>, ApiError> {
        log::info!("📚 Obteniendo mis cursos");
        let response: MyCoursesResponse = self
            .fetch_json(ApiRequest::get(self.url("/courses/my-courses")))
            .await?;
        log::info!("✅ {} inscripciones recibidas", response.enrollments.len());
        Ok(response.enrollments)
    }

    /// El GET devuelve el curso sin envolver (el PUT sí lo envuelve)
    pub async fn get_course(&self, course_id: i64) -> Result<CourseDto, ApiError> {
        self.fetch_json(ApiRequest::get(self.url(&format!("/courses/{}", course_id))))
            .await
    }

    pub async fn update_course(
        &self,
        course_id: i64,
        payload: &CourseUpdatePayload,
    ) -> Result<CourseDto, ApiError> {
        log::info!("✏️ Actualizando curso {}", course_id);
        let request = ApiRequest::put(self.url(&format!("/courses/{}", course_id))).with_json(payload)?;
        let response: CourseResponse = self.fetch_json(request).await?;
        Ok(response.course)
    }

    pub async fn list_course_files(&self, course_id: i64) -> Result<CourseFilesResponse, ApiError> {
        self.fetch_json(ApiRequest::get(self.url(&format!("/courses/{}/files", course_id))))
            .await
    }

    /// Sube un archivo al curso como `multipart/form-data` (campo `file`)
    pub async fn upload_course_file(
        &self,
        course_id: i64,
        file: UploadFile,
    ) -> Result<CourseFileDto, ApiError> {
        log::info!(
            "📤 Subiendo {} ({} bytes) al curso {}",
            file.filename,
            file.bytes.len(),
            course_id
        );
        let request = ApiRequest::post(self.url(&format!("/courses/{}/files", course_id)))
            .with_multipart(vec![("file".to_string(), FormField::File(file))]);
        let response: CourseFileUploadResponse = self.fetch_json(request).await?;
        Ok(response.file)
    }

    pub async fn delete_course_file(&self, file_id: i64) -> Result<MessageResponse, ApiError> {
        log::info!("🗑️ Eliminando archivo {}", file_id);
        self.fetch_json(ApiRequest::delete(self.url(&format!("/files/{}", file_id))))
            .await
    }

    pub async fn list_course_enrollments(
        &self,
        course_id: i64,
        role: Option<CourseRole>,
    ) -> Result<CourseEnrollmentsResponse, ApiError> {
        let mut path = format!("/enrollments/course/{}", course_id);
        if let Some(role) = role {
            path.push_str("?role_in_course=");
            path.push_str(role.as_str());
        }
        self.fetch_json(ApiRequest::get(self.url(&path))).await
    }

    // ------------------------------------------------------------------
    // Chat
    // ------------------------------------------------------------------

    /// Un payload sin `response` de texto es un error aunque venga en 2xx
    pub async fn send_course_message(
        &self,
        course_id: i64,
        body: &CourseChatRequest,
    ) -> Result<CourseChatResponse, ApiError> {
        log::info!("💬 Enviando {} mensajes al curso {}", body.messages.len(), course_id);
        let request = ApiRequest::post(self.url(&format!("/courses/{}/chat", course_id))).with_json(body)?;
        let payload: Value = self.fetch_json(request).await?;

        if payload.get("response").map_or(false, Value::is_string) {
            return serde_json::from_value(payload).map_err(|e| ApiError::Parse(e.to_string()));
        }

        let message = payload
            .get("msg")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|msg| !msg.is_empty())
            .unwrap_or(CHAT_FALLBACK_MESSAGE);
        log::warn!("⚠️ Respuesta de chat sin contenido: {}", message);
        Err(ApiError::Backend(message.to_string()))
    }
}
