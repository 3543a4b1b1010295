use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Student,
    Teacher,
    Admin,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct RegisterRequest {
    pub username: String,
    pub rut: String,
    pub email: String,
    pub region: String,
    pub comuna: String,
    pub password: String,
    pub institution_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct ChangePasswordRequest {
    pub email: String,
    pub old_password: String,
    pub new_password: String,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct ProfileUpdate {
    pub username: String,
}

/// Tokens opacos; nunca se inspeccionan en el cliente
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct AuthInstitution {
    pub id: i64,
    pub nombre: String,
    #[serde(default)]
    pub direccion: Option<String>,
    #[serde(default)]
    pub paginaweb: Option<String>,
    #[serde(default)]
    pub colorinstitucional: Option<String>,
    #[serde(default)]
    pub logotipo: Option<String>,
    #[serde(default)]
    pub fundacion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub courses_count: Option<u32>,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct AuthGrade {
    pub id: i64,
    pub name: String,
    pub order: i32,
}

/// Perfil del usuario autenticado
#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    #[serde(default)]
    pub rut: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub comuna: String,
    #[serde(default)]
    pub institution_id: Option<i64>,
    #[serde(default)]
    pub grade_id: Option<i64>,
    #[serde(default)]
    pub institution: Option<AuthInstitution>,
    #[serde(default)]
    pub grade: Option<AuthGrade>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl AuthUser {
    /// Color institucional usado como semilla del tema
    pub fn institution_color(&self) -> Option<&str> {
        self.institution
            .as_ref()
            .and_then(|i| i.colorinstitucional.as_deref())
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: AuthUser,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct RegisterResponse {
    pub msg: String,
    pub user: AuthUser,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct ProfileResponse {
    pub user: AuthUser,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct RefreshResponse {
    pub access_token: String,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct MessageResponse {
    #[serde(default)]
    pub msg: Option<String>,
}

/// Sesión persistida en localStorage: `{ tokens, user }`.
/// Inmutable: cada cambio construye un valor nuevo.
#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct StoredSession {
    pub tokens: AuthTokens,
    pub user: AuthUser,
}

impl StoredSession {
    pub fn from_login(response: LoginResponse) -> Self {
        Self {
            tokens: AuthTokens {
                access_token: response.access_token,
                refresh_token: response.refresh_token,
            },
            user: response.user,
        }
    }

    /// Misma sesión con otro perfil (tokens intactos)
    pub fn with_user(&self, user: AuthUser) -> Self {
        Self {
            tokens: self.tokens.clone(),
            user,
        }
    }

    /// Misma sesión con otro access token (perfil intacto)
    pub fn with_access_token(&self, access_token: String) -> Self {
        Self {
            tokens: AuthTokens {
                access_token,
                refresh_token: self.tokens.refresh_token.clone(),
            },
            user: self.user.clone(),
        }
    }
}
