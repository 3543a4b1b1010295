// ============================================================================
// AUTH INTERCEPTOR - Firma de requests y expiración de sesión
// ============================================================================
// - Agrega `Authorization: Bearer <token>` si hay token y el request no trae
//   ya su propio header.
// - Un 401 en un request firmado cierra la sesión y redirige al login (salvo
//   que ya se esté en el área de auth). El error siempre vuelve al llamador.
// ============================================================================

use std::future::Future;
use std::rc::Rc;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::services::http::{ApiRequest, ApiResponse, HttpFuture, HttpTransport};
use crate::services::navigator::Navigator;
use crate::state::session_state::SessionState;
use crate::utils::constants::AUTH_HEADER;

#[derive(Clone)]
pub struct AuthInterceptor {
    session: SessionState,
    navigator: Rc<dyn Navigator>,
    login_route: String,
    auth_area_prefix: String,
}

impl AuthInterceptor {
    pub fn new(session: SessionState, navigator: Rc<dyn Navigator>, config: &AppConfig) -> Self {
        Self {
            session,
            navigator,
            login_route: config.login_route.clone(),
            auth_area_prefix: config.auth_area_prefix.clone(),
        }
    }

    /// Firma `request`, lo pasa a `next` y maneja el 401 de un request firmado
    pub async fn intercept<F, Fut>(&self, request: ApiRequest, next: F) -> Result<ApiResponse, ApiError>
    where
        F: FnOnce(ApiRequest) -> Fut,
        Fut: Future<Output = Result<ApiResponse, ApiError>>,
    {
        let (request, signed) = self.sign(request);
        let result = next(request).await;

        if let Err(err) = &result {
            if signed && err.is_unauthorized() {
                self.handle_session_expired();
            }
        }

        result
    }

    /// Devuelve el request (firmado o no) y si se le agregó el token
    pub fn sign(&self, request: ApiRequest) -> (ApiRequest, bool) {
        if request.has_header(AUTH_HEADER) {
            return (request, false);
        }
        match self.session.access_token() {
            Some(token) => (
                request.with_header(AUTH_HEADER, format!("Bearer {}", token)),
                true,
            ),
            None => (request, false),
        }
    }

    fn handle_session_expired(&self) {
        log::warn!("🔒 [AUTH] 401 en request firmado: sesión expirada");
        self.session.logout();

        let current = self.navigator.current_path();
        if !current.starts_with(&self.auth_area_prefix) {
            log::info!("↪️ [AUTH] Redirigiendo a {}", self.login_route);
            self.navigator.navigate(&self.login_route);
        }
    }
}

/// Transporte que pasa cada request por el interceptor
pub struct SignedTransport {
    interceptor: AuthInterceptor,
    inner: Rc<dyn HttpTransport>,
}

impl SignedTransport {
    pub fn new(interceptor: AuthInterceptor, inner: Rc<dyn HttpTransport>) -> Self {
        Self { interceptor, inner }
    }
}

impl HttpTransport for SignedTransport {
    fn send(&self, request: ApiRequest) -> HttpFuture<'_> {
        Box::pin(
            self.interceptor
                .intercept(request, move |signed| self.inner.send(signed)),
        )
    }
}
