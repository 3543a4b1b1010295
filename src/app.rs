// ============================================================================
// APP - Contexto de la aplicación (reemplaza singletons globales)
// ============================================================================
// Construye una única instancia de cada pieza y las conecta:
// - Transporte firmado por el gateway de autenticación
// - Store de sesión, store de cursos y servicio de tema
// - Reacción síncrona a cambios de identidad (caché de cursos + paleta)
// ============================================================================

use std::cell::Cell;
use std::rc::Rc;

use crate::config::AppConfig;
use crate::services::api_client::ApiClient;
use crate::services::auth_interceptor::{AuthInterceptor, SignedTransport};
use crate::services::http::{GlooTransport, HttpTransport};
use crate::services::navigator::{BrowserNavigator, Navigator};
use crate::services::theme_service::{apply_css_variables, ThemeService};
use crate::state::session_state::SessionState;
use crate::stores::{CourseStore, SessionStore};
use crate::utils::spawner::{browser_spawner, Spawner};
use crate::utils::storage::{BrowserStorage, KeyValueStorage};

/// Handle compartido de la aplicación (clonar comparte las mismas piezas)
#[derive(Clone)]
pub struct AppContext {
    config: Rc<AppConfig>,
    api: ApiClient,
    session: SessionStore,
    courses: CourseStore,
    theme: ThemeService,
}

impl AppContext {
    /// Contexto del navegador: localStorage, fetch, History API y CSS
    pub fn browser(config: AppConfig) -> Self {
        let context = Self::with_parts(
            config,
            Rc::new(BrowserStorage),
            Rc::new(GlooTransport),
            Rc::new(BrowserNavigator),
            browser_spawner(),
        );

        apply_css_variables(&context.theme.palette());
        context.theme.on_change(apply_css_variables);

        context
    }

    pub fn with_parts(
        config: AppConfig,
        storage: Rc<dyn KeyValueStorage>,
        transport: Rc<dyn HttpTransport>,
        navigator: Rc<dyn Navigator>,
        spawner: Spawner,
    ) -> Self {
        let state = SessionState::restore(storage, &config.storage_key);

        let interceptor = AuthInterceptor::new(state.clone(), navigator, &config);
        let signed: Rc<dyn HttpTransport> = Rc::new(SignedTransport::new(interceptor, transport));
        let api = ApiClient::new(config.api_base_url(), signed);
        log::info!("🌐 [APP] API: {}", api.base_url());

        let session = SessionStore::new(state.clone(), api.clone());
        let courses = CourseStore::new(api.clone(), spawner);

        let theme = ThemeService::new(&config.default_primary_color);
        let restored_user = state.current_user();
        theme.apply_primary_color(restored_user.as_ref().and_then(|u| u.institution_color()));

        watch_identity(&state, &courses, &theme);

        Self {
            config: Rc::new(config),
            api,
            session,
            courses,
            theme,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn courses(&self) -> &CourseStore {
        &self.courses
    }

    pub fn theme(&self) -> &ThemeService {
        &self.theme
    }
}

/// Cada publicación de identidad recalcula la paleta; si cambió el usuario
/// (incluido el cierre de sesión) la caché de cursos se invalida.
fn watch_identity(state: &SessionState, courses: &CourseStore, theme: &ThemeService) {
    let last_user = Cell::new(state.current_user().map(|u| u.id));
    let courses = courses.clone();
    let theme = theme.clone();

    state.on_change(move |session| {
        let user = session.as_ref().map(|s| &s.user);
        theme.apply_primary_color(user.and_then(|u| u.institution_color()));

        let user_id = user.map(|u| u.id);
        if last_user.replace(user_id) != user_id {
            log::info!("👤 [APP] Cambio de usuario, limpiando caché de cursos");
            courses.clear_cache();
        }
    });
}
