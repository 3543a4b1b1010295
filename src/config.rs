// ============================================================================
// CONFIG - Configuración de la app (tiempo de compilación)
// ============================================================================

use serde::{Deserialize, Serialize};
use crate::utils::constants::{
    AUTH_AREA_PREFIX, DEFAULT_API_URL_DEVELOPMENT, DEFAULT_API_URL_PRODUCTION,
    DEFAULT_PRIMARY_COLOR, LOGIN_ROUTE, SESSION_STORAGE_KEY,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: String,
    pub api_url_development: String,
    pub api_url_production: String,
    pub storage_key: String,
    pub login_route: String,
    pub auth_area_prefix: String,
    pub default_primary_color: String,
    pub enable_logging: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            api_url_development: DEFAULT_API_URL_DEVELOPMENT.to_string(),
            api_url_production: DEFAULT_API_URL_PRODUCTION.to_string(),
            storage_key: SESSION_STORAGE_KEY.to_string(),
            login_route: LOGIN_ROUTE.to_string(),
            auth_area_prefix: AUTH_AREA_PREFIX.to_string(),
            default_primary_color: DEFAULT_PRIMARY_COLOR.to_string(),
            enable_logging: true,
        }
    }
}

impl AppConfig {
    /// Carga la configuración desde variables de entorno en tiempo de compilación
    /// (build.rs las toma del .env si existe)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            environment: option_env!("ACACHAT_ENVIRONMENT")
                .map(str::to_string)
                .unwrap_or(defaults.environment),
            api_url_development: option_env!("ACACHAT_API_URL_DEVELOPMENT")
                .map(str::to_string)
                .unwrap_or(defaults.api_url_development),
            api_url_production: option_env!("ACACHAT_API_URL_PRODUCTION")
                .map(str::to_string)
                .unwrap_or(defaults.api_url_production),
            storage_key: option_env!("ACACHAT_STORAGE_KEY")
                .map(str::to_string)
                .unwrap_or(defaults.storage_key),
            login_route: option_env!("ACACHAT_LOGIN_ROUTE")
                .map(str::to_string)
                .unwrap_or(defaults.login_route),
            auth_area_prefix: option_env!("ACACHAT_AUTH_AREA_PREFIX")
                .map(str::to_string)
                .unwrap_or(defaults.auth_area_prefix),
            default_primary_color: option_env!("ACACHAT_DEFAULT_PRIMARY_COLOR")
                .map(str::to_string)
                .unwrap_or(defaults.default_primary_color),
            enable_logging: option_env!("ACACHAT_ENABLE_LOGGING")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.enable_logging),
        }
    }

    /// URL base del API según el entorno actual (sin `/` final)
    pub fn api_base_url(&self) -> &str {
        let url = match self.environment.as_str() {
            "production" => &self.api_url_production,
            _ => &self.api_url_development,
        };
        url.trim_end_matches('/')
    }

    pub fn is_logging_enabled(&self) -> bool {
        self.enable_logging
    }
}

// Configuración global estática
lazy_static::lazy_static! {
    pub static ref CONFIG: AppConfig = AppConfig::from_env();
}
