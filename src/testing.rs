//! Dobles de prueba compartidos por los tests de cada módulo.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use futures::channel::oneshot;
use futures::executor::LocalPool;
use futures::task::LocalSpawnExt;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::models::auth::{AuthInstitution, AuthTokens, AuthUser, StoredSession, UserRole};
use crate::services::http::{ApiRequest, ApiResponse, HttpFuture, HttpMethod, HttpTransport};
use crate::services::navigator::Navigator;
use crate::state::reactivity::Subscription;
use crate::utils::spawner::Spawner;

pub const TEST_API: &str = "http://api.test";

pub type HttpResult = Result<ApiResponse, ApiError>;

/// Executor single-thread y su spawner
pub fn local_pool() -> (LocalPool, Spawner) {
    let pool = LocalPool::new();
    let handle = pool.spawner();
    let spawner: Spawner = Rc::new(move |task| {
        handle.spawn_local(task).expect("spawn en LocalPool");
    });
    (pool, spawner)
}

/// Todo lo que ya está en la cola del suscriptor
pub fn drain<T>(subscription: &mut Subscription<T>) -> Vec<T> {
    let mut values = Vec::new();
    while let Some(value) = subscription.try_next_now() {
        values.push(value);
    }
    values
}

/// Respuesta con `status`; las >= 400 se convierten en `ApiError::Http`
pub fn json_reply(status: u16, body: Value) -> HttpResult {
    if status >= 400 {
        Err(ApiError::Http {
            status,
            message: format!("status {}", status),
            body: Some(body),
        })
    } else {
        Ok(ApiResponse {
            status,
            body: body.to_string(),
        })
    }
}

enum Reply {
    Ready(HttpResult),
    Deferred(oneshot::Receiver<HttpResult>),
}

/// Transporte simulado: respuestas encoladas por "MÉTODO /ruta"
#[derive(Default)]
pub struct MockTransport {
    routes: RefCell<HashMap<String, VecDeque<Reply>>>,
    sent: RefCell<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    fn key(method: HttpMethod, path: &str) -> String {
        format!("{} {}", method.as_str(), path)
    }

    pub fn reply(&self, method: HttpMethod, path: &str, result: HttpResult) {
        self.routes
            .borrow_mut()
            .entry(Self::key(method, path))
            .or_default()
            .push_back(Reply::Ready(result));
    }

    pub fn reply_json(&self, method: HttpMethod, path: &str, status: u16, body: Value) {
        self.reply(method, path, json_reply(status, body));
    }

    /// La respuesta queda pendiente hasta que el test la envíe
    pub fn reply_deferred(&self, method: HttpMethod, path: &str) -> oneshot::Sender<HttpResult> {
        let (tx, rx) = oneshot::channel();
        self.routes
            .borrow_mut()
            .entry(Self::key(method, path))
            .or_default()
            .push_back(Reply::Deferred(rx));
        tx
    }

    pub fn sent(&self) -> Vec<ApiRequest> {
        self.sent.borrow().clone()
    }

    pub fn last_sent(&self) -> Option<ApiRequest> {
        self.sent.borrow().last().cloned()
    }

    pub fn calls(&self, method: HttpMethod, path: &str) -> usize {
        let url = format!("{}{}", TEST_API, path);
        self.sent
            .borrow()
            .iter()
            .filter(|r| r.method == method && r.url == url)
            .count()
    }
}

impl HttpTransport for MockTransport {
    fn send(&self, request: ApiRequest) -> HttpFuture<'_> {
        let path = request
            .url
            .strip_prefix(TEST_API)
            .unwrap_or(request.url.as_str())
            .to_string();
        let key = Self::key(request.method, &path);
        self.sent.borrow_mut().push(request);

        let reply = self
            .routes
            .borrow_mut()
            .get_mut(&key)
            .and_then(|queue| queue.pop_front());

        Box::pin(async move {
            match reply {
                Some(Reply::Ready(result)) => result,
                Some(Reply::Deferred(rx)) => rx
                    .await
                    .unwrap_or_else(|_| Err(ApiError::Network("cancelled".into()))),
                None => Err(ApiError::http(404, format!("sin respuesta para {}", key))),
            }
        })
    }
}

/// Navegador que solo registra las rutas
pub struct RecordingNavigator {
    path: RefCell<String>,
    navigations: RefCell<Vec<String>>,
}

impl RecordingNavigator {
    pub fn at(path: &str) -> Rc<Self> {
        Rc::new(Self {
            path: RefCell::new(path.to_string()),
            navigations: RefCell::new(Vec::new()),
        })
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.borrow().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn current_path(&self) -> String {
        self.path.borrow().clone()
    }

    fn navigate(&self, route: &str) {
        self.navigations.borrow_mut().push(route.to_string());
        *self.path.borrow_mut() = route.to_string();
    }
}

pub fn sample_user(id: i64, username: &str, color: Option<&str>) -> AuthUser {
    AuthUser {
        id,
        username: username.to_string(),
        email: format!("{}@b.com", username),
        role: UserRole::Student,
        rut: "11.111.111-1".to_string(),
        region: "Metropolitana".to_string(),
        comuna: "Providencia".to_string(),
        institution_id: Some(1),
        grade_id: None,
        institution: Some(AuthInstitution {
            id: 1,
            nombre: "Colegio Andino".to_string(),
            direccion: None,
            paginaweb: None,
            colorinstitucional: color.map(str::to_string),
            logotipo: None,
            fundacion: None,
            courses_count: None,
        }),
        grade: None,
        is_active: Some(true),
        created_at: None,
        updated_at: None,
    }
}

pub fn sample_session(access_token: &str, user: AuthUser) -> StoredSession {
    StoredSession {
        tokens: AuthTokens {
            access_token: access_token.to_string(),
            refresh_token: format!("{}-refresh", access_token),
        },
        user,
    }
}

pub fn login_body(access_token: &str, user: &AuthUser) -> Value {
    json!({
        "access_token": access_token,
        "refresh_token": format!("{}-refresh", access_token),
        "user": user,
    })
}

pub fn enrollment_json(id: i64, course_id: i64, nombre: &str) -> Value {
    json!({
        "id": id,
        "user_id": 1,
        "course_id": course_id,
        "year": 2025,
        "role_in_course": "student",
        "enrolled_at": null,
        "course": { "id": course_id, "nombre": nombre, "institution_id": 1, "grade_id": null }
    })
}
