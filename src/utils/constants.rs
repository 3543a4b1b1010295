/// URL del API en desarrollo (backend Flask local)
pub const DEFAULT_API_URL_DEVELOPMENT: &str = "http://localhost:5000/api";

/// URL del API en producción
pub const DEFAULT_API_URL_PRODUCTION: &str = "https://api.acachat.cl/api";

/// Clave única de localStorage donde vive la sesión serializada `{ tokens, user }`
pub const SESSION_STORAGE_KEY: &str = "acachat.auth.session";

/// Ruta de login a la que se redirige cuando expira la sesión
pub const LOGIN_ROUTE: &str = "/auth/login";

/// Prefijo de las rutas del área de autenticación
pub const AUTH_AREA_PREFIX: &str = "/auth";

/// Color primario por defecto del tema
pub const DEFAULT_PRIMARY_COLOR: &str = "#4a3aff";

pub const AUTH_HEADER: &str = "Authorization";
