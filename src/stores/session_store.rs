// ============================================================================
// SESSION STORE - Operaciones de autenticación sobre el estado de sesión
// ============================================================================
// Las operaciones de red pasan por el `ApiClient`; el estado solo cambia
// cuando la respuesta es exitosa. Los errores vuelven tal cual al llamador.
// ============================================================================

use futures::Stream;

use crate::error::{ApiError, SessionError};
use crate::models::auth::{
    AuthUser, ChangePasswordRequest, LoginRequest, MessageResponse, ProfileUpdate,
    RegisterRequest, RegisterResponse, StoredSession,
};
use crate::services::api_client::ApiClient;
use crate::state::reactivity::Subscription;
use crate::state::session_state::SessionState;

#[derive(Clone)]
pub struct SessionStore {
    state: SessionState,
    api: ApiClient,
}

impl SessionStore {
    pub fn new(state: SessionState, api: ApiClient) -> Self {
        Self { state, api }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Login: guarda y publica la sesión nueva
    pub async fn login(&self, credentials: &LoginRequest) -> Result<StoredSession, ApiError> {
        let response = self.api.login(credentials).await?;
        let session = StoredSession::from_login(response);
        log::info!("✅ [SESSION] Login exitoso: {}", session.user.username);
        self.state.persist(session.clone());
        Ok(session)
    }

    /// El registro no inicia sesión
    pub async fn register(&self, details: &RegisterRequest) -> Result<RegisterResponse, ApiError> {
        self.api.register(details).await
    }

    /// Cambia el perfil del usuario actual, conservando los tokens
    pub async fn update_profile(&self, changes: &ProfileUpdate) -> Result<AuthUser, SessionError> {
        if !self.state.is_logged_in() {
            return Err(SessionError::NoActiveSession);
        }
        let user = self.api.update_profile(changes).await?;
        self.replace_user(user.clone())?;
        Ok(user)
    }

    /// Relee el perfil desde el backend
    pub async fn fetch_profile(&self) -> Result<AuthUser, SessionError> {
        if !self.state.is_logged_in() {
            return Err(SessionError::NoActiveSession);
        }
        let user = self.api.get_profile().await?;
        self.replace_user(user.clone())?;
        Ok(user)
    }

    pub async fn change_password(&self, request: &ChangePasswordRequest) -> Result<MessageResponse, ApiError> {
        self.api.change_password(request).await
    }

    /// Pide un access token nuevo con el refresh token.
    /// Si el refresh token fue rechazado (401) la sesión se cierra.
    pub async fn refresh_access_token(&self) -> Result<String, SessionError> {
        let refresh_token = self
            .state
            .refresh_token()
            .ok_or(SessionError::NoActiveSession)?;

        match self.api.refresh_token(&refresh_token).await {
            Ok(response) => {
                let session = self
                    .state
                    .get_session()
                    .ok_or(SessionError::NoActiveSession)?;
                self.state
                    .persist(session.with_access_token(response.access_token.clone()));
                log::info!("🔄 [SESSION] Access token renovado");
                Ok(response.access_token)
            }
            Err(err) => {
                if err.is_unauthorized() {
                    log::warn!("🔒 [SESSION] Refresh token rechazado");
                    self.state.logout();
                }
                Err(err.into())
            }
        }
    }

    pub fn logout(&self) {
        self.state.logout();
    }

    pub fn access_token(&self) -> Option<String> {
        self.state.access_token()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.state.refresh_token()
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        self.state.current_user()
    }

    pub fn is_logged_in(&self) -> bool {
        self.state.is_logged_in()
    }

    pub fn watch(&self) -> Subscription<Option<StoredSession>> {
        self.state.watch()
    }

    pub fn watch_user(&self) -> impl Stream<Item = Option<AuthUser>> {
        self.state.watch_user()
    }

    // La sesión pudo cerrarse mientras la request estaba en vuelo
    fn replace_user(&self, user: AuthUser) -> Result<(), SessionError> {
        let session = self
            .state
            .get_session()
            .ok_or(SessionError::NoActiveSession)?;
        self.state.persist(session.with_user(user));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::http::HttpMethod;
    use crate::testing::{drain, login_body, sample_session, sample_user, MockTransport, TEST_API};
    use crate::utils::storage::MemoryStorage;
    use futures::executor::block_on;
    use serde_json::json;
    use std::rc::Rc;

    const KEY: &str = "acachat.auth.session";

    fn store() -> (SessionStore, Rc<MockTransport>, Rc<MemoryStorage>) {
        let storage = Rc::new(MemoryStorage::new());
        let mock = MockTransport::new();
        let state = SessionState::restore(storage.clone(), KEY);
        let store = SessionStore::new(state, ApiClient::new(TEST_API, mock.clone()));
        (store, mock, storage)
    }

    fn credentials() -> LoginRequest {
        LoginRequest {
            email: "a@b.com".into(),
            password: "x".into(),
        }
    }

    #[test]
    fn login_persists_and_publishes() {
        let (store, mock, storage) = store();
        let user = sample_user(1, "ana", None);
        mock.reply_json(HttpMethod::Post, "/auth/login", 200, login_body("abc", &user));

        let mut identity = store.watch();
        assert_eq!(drain(&mut identity), vec![None]);

        let session = block_on(store.login(&credentials())).unwrap();
        assert_eq!(store.access_token().as_deref(), Some("abc"));
        assert_eq!(store.refresh_token().as_deref(), Some("abc-refresh"));
        assert_eq!(drain(&mut identity), vec![Some(session)]);
        assert!(storage.contains(KEY));

        let sent = mock.last_sent().unwrap();
        assert_eq!(sent.json_body(), Some(&json!({ "email": "a@b.com", "password": "x" })));
    }

    #[test]
    fn failed_login_leaves_state_untouched() {
        let (store, mock, storage) = store();
        mock.reply_json(
            HttpMethod::Post,
            "/auth/login",
            401,
            json!({ "msg": "Credenciales inválidas" }),
        );
        let mut identity = store.watch();
        drain(&mut identity);

        let err = block_on(store.login(&credentials())).unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert!(!store.is_logged_in());
        assert!(drain(&mut identity).is_empty());
        assert!(!storage.contains(KEY));
    }

    #[test]
    fn register_never_signs_in() {
        let (store, mock, _) = store();
        let user = sample_user(2, "beto", None);
        mock.reply_json(
            HttpMethod::Post,
            "/auth/register",
            201,
            json!({ "msg": "Usuario creado", "user": user }),
        );

        let details = RegisterRequest {
            username: "beto".into(),
            rut: "11.111.111-1".into(),
            email: "beto@b.com".into(),
            region: "Metropolitana".into(),
            comuna: "Providencia".into(),
            password: "secreto".into(),
            institution_id: 1,
            grade_id: None,
            role: None,
        };
        let response = block_on(store.register(&details)).unwrap();
        assert_eq!(response.user.id, 2);
        assert!(!store.is_logged_in());
    }

    #[test]
    fn update_profile_without_session_fails_before_io() {
        let (store, mock, _) = store();
        let changes = ProfileUpdate {
            username: "nuevo".into(),
        };

        let err = block_on(store.update_profile(&changes)).unwrap_err();
        assert_eq!(err, SessionError::NoActiveSession);
        assert!(mock.sent().is_empty());
    }

    #[test]
    fn update_profile_replaces_user_and_keeps_tokens() {
        let (store, mock, _) = store();
        store
            .state()
            .persist(sample_session("abc", sample_user(1, "ana", None)));
        mock.reply_json(
            HttpMethod::Patch,
            "/auth/profile",
            200,
            json!({ "user": sample_user(1, "anita", None) }),
        );

        let user = block_on(store.update_profile(&ProfileUpdate {
            username: "anita".into(),
        }))
        .unwrap();
        assert_eq!(user.username, "anita");
        assert_eq!(store.current_user().unwrap().username, "anita");
        assert_eq!(store.access_token().as_deref(), Some("abc"));
        assert_eq!(store.refresh_token().as_deref(), Some("abc-refresh"));
    }

    #[test]
    fn refresh_replaces_only_the_access_token() {
        let (store, mock, _) = store();
        store
            .state()
            .persist(sample_session("abc", sample_user(1, "ana", None)));
        mock.reply_json(HttpMethod::Post, "/auth/refresh", 200, json!({ "access_token": "def" }));

        let token = block_on(store.refresh_access_token()).unwrap();
        assert_eq!(token, "def");
        assert_eq!(store.access_token().as_deref(), Some("def"));
        assert_eq!(store.refresh_token().as_deref(), Some("abc-refresh"));
        assert_eq!(store.current_user().unwrap().username, "ana");
    }

    #[test]
    fn rejected_refresh_token_signs_out() {
        let (store, mock, _) = store();
        store
            .state()
            .persist(sample_session("abc", sample_user(1, "ana", None)));
        mock.reply_json(HttpMethod::Post, "/auth/refresh", 401, json!({ "msg": "Token has expired" }));

        let err = block_on(store.refresh_access_token()).unwrap_err();
        assert!(matches!(err, SessionError::Api(ref e) if e.is_unauthorized()));
        assert!(!store.is_logged_in());
    }

    #[test]
    fn logout_is_idempotent() {
        let (store, _, _) = store();
        store
            .state()
            .persist(sample_session("abc", sample_user(1, "ana", None)));
        let mut identity = store.watch();
        drain(&mut identity);

        store.logout();
        store.logout();
        assert_eq!(drain(&mut identity), vec![None]);
    }
}
