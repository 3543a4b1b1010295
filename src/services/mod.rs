// ============================================================================
// SERVICES - Comunicación con el backend y con el navegador
// ============================================================================

pub mod http;
pub mod navigator;
pub mod auth_interceptor;
pub mod api_client;
pub mod theme_service;

pub use http::{
    ApiRequest, ApiResponse, FormField, GlooTransport, HttpMethod, HttpTransport, RequestBody,
    UploadFile,
};
pub use navigator::{BrowserNavigator, Navigator};
pub use auth_interceptor::{AuthInterceptor, SignedTransport};
pub use api_client::ApiClient;
pub use theme_service::{ThemePalette, ThemeService};
