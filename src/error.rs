//! Errores tipados del cliente.
//! `ApiError` cubre todo lo que viene de la red, `SessionError` agrega los
//! fallos propios del store de sesión y `StorageError` los de localStorage.

use thiserror::Error;

/// Error de una llamada HTTP al backend.
///
/// Es `Clone` porque un mismo fetch en vuelo se comparte entre varios
/// llamadores y todos reciben el mismo resultado.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    /// Respuesta no-2xx. `body` es el JSON devuelto por el backend si lo hubo.
    #[error("HTTP {status}: {message}")]
    Http {
        status: u16,
        message: String,
        body: Option<serde_json::Value>,
    },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Respuesta 2xx con un payload que el backend marca como fallido
    #[error("{0}")]
    Backend(String),
}

impl ApiError {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        ApiError::Http {
            status,
            message: message.into(),
            body: None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("No hay sesión activa")]
    NoActiveSession,

    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("No se pudo acceder a localStorage: {0}")]
    Unavailable(String),

    #[error("Error guardando en localStorage: {0}")]
    Write(String),

    #[error("Error serializando datos: {0}")]
    Serialization(serde_json::Error),

    #[error("Registro corrupto en localStorage: {0}")]
    Corrupted(serde_json::Error),
}
