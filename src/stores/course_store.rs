// ============================================================================
// COURSE STORE - Cursos del usuario (caché reactiva) + endpoints de cursos
// ============================================================================

use futures::FutureExt;

use crate::error::ApiError;
use crate::models::auth::MessageResponse;
use crate::models::chat::{CourseChatRequest, CourseChatResponse};
use crate::models::course::{
    CourseDto, CourseEnrollment, CourseEnrollmentsResponse, CourseFileDto, CourseFilesResponse,
    CourseRole, CourseUpdatePayload,
};
use crate::services::api_client::ApiClient;
use crate::services::http::UploadFile;
use crate::state::reactivity::Subscription;
use crate::state::resource_cache::{FetchResult, ResourceCache};
use crate::utils::spawner::Spawner;

#[derive(Clone)]
pub struct CourseStore {
    cache: ResourceCache<CourseEnrollment>,
    api: ApiClient,
}

impl CourseStore {
    pub fn new(api: ApiClient, spawner: Spawner) -> Self {
        let fetch_api = api.clone();
        let cache = ResourceCache::new("courses", spawner, move || {
            let api = fetch_api.clone();
            async move { api.my_courses().await }.boxed_local()
        });
        Self { cache, api }
    }

    /// Inscripciones del usuario; dispara la carga inicial si hace falta
    pub fn watch_my_courses(&self) -> Subscription<Vec<CourseEnrollment>> {
        self.cache.watch()
    }

    pub async fn load_my_courses(&self, force: bool) -> FetchResult<CourseEnrollment> {
        self.cache.load(force).await
    }

    pub fn set_my_courses(&self, enrollments: Vec<CourseEnrollment>) {
        self.cache.set_items(enrollments);
    }

    pub fn my_courses(&self) -> Vec<CourseEnrollment> {
        self.cache.items()
    }

    pub fn clear_cache(&self) {
        self.cache.invalidate();
    }

    pub fn cache(&self) -> &ResourceCache<CourseEnrollment> {
        &self.cache
    }

    pub async fn get_course(&self, course_id: i64) -> Result<CourseDto, ApiError> {
        self.api.get_course(course_id).await
    }

    /// Actualiza el curso y refleja el cambio en las inscripciones cacheadas
    pub async fn update_course(
        &self,
        course_id: i64,
        payload: &CourseUpdatePayload,
    ) -> Result<CourseDto, ApiError> {
        let course = self.api.update_course(course_id, payload).await?;

        if self.cache.is_loaded() {
            let mut enrollments = self.cache.items();
            let mut touched = false;
            for enrollment in enrollments.iter_mut().filter(|e| e.course_id == course.id) {
                enrollment.course = Some(course.clone());
                touched = true;
            }
            if touched {
                self.cache.set_items(enrollments);
            }
        }

        Ok(course)
    }

    pub async fn list_course_files(&self, course_id: i64) -> Result<CourseFilesResponse, ApiError> {
        self.api.list_course_files(course_id).await
    }

    pub async fn upload_course_file(
        &self,
        course_id: i64,
        file: UploadFile,
    ) -> Result<CourseFileDto, ApiError> {
        self.api.upload_course_file(course_id, file).await
    }

    pub async fn delete_course_file(&self, file_id: i64) -> Result<MessageResponse, ApiError> {
        self.api.delete_course_file(file_id).await
    }

    pub async fn list_course_enrollments(
        &self,
        course_id: i64,
        role: Option<CourseRole>,
    ) -> Result<CourseEnrollmentsResponse, ApiError> {
        self.api.list_course_enrollments(course_id, role).await
    }

    pub async fn send_course_message(
        &self,
        course_id: i64,
        request: &CourseChatRequest,
    ) -> Result<CourseChatResponse, ApiError> {
        self.api.send_course_message(course_id, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::http::HttpMethod;
    use crate::testing::{drain, enrollment_json, local_pool, MockTransport, TEST_API};
    use futures::executor::LocalPool;
    use serde_json::json;
    use std::rc::Rc;

    fn store() -> (CourseStore, Rc<MockTransport>, LocalPool) {
        let (pool, spawner) = local_pool();
        let mock = MockTransport::new();
        let store = CourseStore::new(ApiClient::new(TEST_API, mock.clone()), spawner);
        (store, mock, pool)
    }

    fn nombres(enrollments: &[CourseEnrollment]) -> Vec<String> {
        enrollments
            .iter()
            .filter_map(|e| e.course.as_ref().map(|c| c.nombre.clone()))
            .collect()
    }

    #[test]
    fn two_watchers_share_one_fetch() {
        let (store, mock, mut pool) = store();
        mock.reply_json(
            HttpMethod::Get,
            "/courses/my-courses",
            200,
            json!({ "enrollments": [enrollment_json(1, 10, "Historia")] }),
        );

        let mut a = store.watch_my_courses();
        let mut b = store.watch_my_courses();
        pool.run_until_stalled();

        assert_eq!(mock.calls(HttpMethod::Get, "/courses/my-courses"), 1);
        let a = drain(&mut a);
        assert!(a[0].is_empty());
        assert_eq!(nombres(&a[1]), vec!["Historia"]);
        assert_eq!(drain(&mut b).len(), 2);
    }

    #[test]
    fn update_course_patches_cached_enrollments() {
        let (store, mock, mut pool) = store();
        mock.reply_json(
            HttpMethod::Get,
            "/courses/my-courses",
            200,
            json!({ "enrollments": [enrollment_json(1, 10, "Historia"), enrollment_json(2, 11, "Arte")] }),
        );
        mock.reply_json(
            HttpMethod::Put,
            "/courses/10",
            200,
            json!({ "course": { "id": 10, "nombre": "Historia de Chile", "institution_id": 1, "emoji": "📜" } }),
        );

        pool.run_until(store.load_my_courses(false)).unwrap();
        let mut courses = store.watch_my_courses();
        drain(&mut courses);

        let payload = CourseUpdatePayload {
            nombre: Some("Historia de Chile".into()),
            emoji: Some(Some("📜".into())),
            ..Default::default()
        };
        let course = pool.run_until(store.update_course(10, &payload)).unwrap();
        assert_eq!(course.emoji.as_deref(), Some("📜"));

        let published = drain(&mut courses);
        assert_eq!(published.len(), 1);
        assert_eq!(nombres(&published[0]), vec!["Historia de Chile", "Arte"]);
        assert_eq!(
            mock.last_sent().unwrap().json_body(),
            Some(&json!({ "nombre": "Historia de Chile", "emoji": "📜" }))
        );
    }

    #[test]
    fn update_course_without_cache_does_not_publish() {
        let (store, mock, mut pool) = store();
        mock.reply_json(
            HttpMethod::Put,
            "/courses/10",
            200,
            json!({ "course": { "id": 10, "nombre": "Historia", "institution_id": 1 } }),
        );

        pool.run_until(store.update_course(10, &CourseUpdatePayload::default()))
            .unwrap();
        assert!(!store.cache().is_loaded());
        assert!(store.my_courses().is_empty());
    }

    #[test]
    fn upload_goes_to_the_course_files_endpoint() {
        let (store, mock, mut pool) = store();
        mock.reply_json(
            HttpMethod::Post,
            "/courses/10/files",
            201,
            json!({
                "file": {
                    "id": 8, "filename": "mapa.png", "filepath": "uploads/10/mapa.png",
                    "filesize": 2, "mimetype": "image/png", "uploaded_by": 1
                }
            }),
        );

        let file = UploadFile {
            filename: "mapa.png".into(),
            mimetype: "image/png".into(),
            bytes: vec![0x89, 0x50],
        };
        let uploaded = pool.run_until(store.upload_course_file(10, file)).unwrap();
        assert_eq!(uploaded.filename, "mapa.png");
        assert_eq!(mock.calls(HttpMethod::Post, "/courses/10/files"), 1);
        // Subir archivos no toca la caché de inscripciones
        assert!(!store.cache().is_loaded());
    }

    #[test]
    fn clear_cache_forces_a_new_fetch() {
        let (store, mock, mut pool) = store();
        mock.reply_json(HttpMethod::Get, "/courses/my-courses", 200, json!({ "enrollments": [] }));
        mock.reply_json(
            HttpMethod::Get,
            "/courses/my-courses",
            200,
            json!({ "enrollments": [enrollment_json(3, 12, "Ciencias")] }),
        );

        pool.run_until(store.load_my_courses(false)).unwrap();
        pool.run_until(store.load_my_courses(false)).unwrap();
        assert_eq!(mock.calls(HttpMethod::Get, "/courses/my-courses"), 1);

        store.clear_cache();
        let enrollments = pool.run_until(store.load_my_courses(false)).unwrap();
        assert_eq!(nombres(&enrollments), vec!["Ciencias"]);
        assert_eq!(mock.calls(HttpMethod::Get, "/courses/my-courses"), 2);
    }
}
