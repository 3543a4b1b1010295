// ============================================================================
// SESSION STATE - Identidad autenticada (tokens + perfil) y su persistencia
// ============================================================================
// Única fuente de verdad de "quién está logueado". Lecturas síncronas, sin
// I/O; la escritura en localStorage ocurre antes de publicar en memoria.
// ============================================================================

use std::rc::Rc;

use futures::{Stream, StreamExt};

use crate::error::StorageError;
use crate::models::auth::{AuthUser, StoredSession};
use crate::state::reactivity::{ReactiveState, Subscription};
use crate::utils::storage::{load_from_storage, remove_from_storage, save_to_storage, KeyValueStorage};

/// Estado de sesión compartido (clonar comparte el mismo estado)
#[derive(Clone)]
pub struct SessionState {
    session: ReactiveState<Option<StoredSession>>,
    storage: Rc<dyn KeyValueStorage>,
    storage_key: Rc<str>,
}

impl SessionState {
    /// Restaura la sesión guardada. Un registro ausente o corrupto deja la
    /// sesión anónima; el corrupto además se borra.
    pub fn restore(storage: Rc<dyn KeyValueStorage>, storage_key: &str) -> Self {
        let restored = match load_from_storage::<StoredSession>(storage.as_ref(), storage_key) {
            Ok(Some(session)) => {
                log::info!("💾 [SESSION] Sesión restaurada para {}", session.user.email);
                Some(session)
            }
            Ok(None) => None,
            Err(StorageError::Corrupted(e)) => {
                log::warn!("⚠️ [SESSION] Sesión guardada corrupta, se elimina: {}", e);
                if let Err(e) = remove_from_storage(storage.as_ref(), storage_key) {
                    log::error!("❌ [SESSION] No se pudo eliminar la sesión corrupta: {}", e);
                }
                None
            }
            Err(e) => {
                log::warn!("⚠️ [SESSION] No se pudo leer la sesión guardada: {}", e);
                None
            }
        };

        Self {
            session: ReactiveState::new(restored),
            storage,
            storage_key: Rc::from(storage_key),
        }
    }

    pub fn get_session(&self) -> Option<StoredSession> {
        self.session.get()
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.with(|s| s.is_some())
    }

    pub fn access_token(&self) -> Option<String> {
        self.session
            .with(|s| s.as_ref().map(|s| s.tokens.access_token.clone()))
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.session
            .with(|s| s.as_ref().map(|s| s.tokens.refresh_token.clone()))
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        self.session.with(|s| s.as_ref().map(|s| s.user.clone()))
    }

    /// Stream de identidad: valor actual al suscribirse y luego cada cambio
    pub fn watch(&self) -> Subscription<Option<StoredSession>> {
        self.session.subscribe()
    }

    pub fn watch_user(&self) -> impl Stream<Item = Option<AuthUser>> {
        self.session
            .subscribe()
            .map(|session| session.map(|s| s.user))
    }

    /// Callback síncrono en cada cambio de identidad
    pub fn on_change<F>(&self, callback: F)
    where
        F: Fn(&Option<StoredSession>) + 'static,
    {
        self.session.on_change(callback);
    }

    /// Guarda y publica una sesión nueva (reemplaza la anterior completa)
    pub fn persist(&self, session: StoredSession) {
        if let Err(e) = save_to_storage(self.storage.as_ref(), &self.storage_key, &session) {
            // La sesión en memoria sigue siendo válida para esta ejecución
            log::error!("❌ [SESSION] Error guardando sesión en storage: {}", e);
        }
        self.session.set(Some(session));
    }

    /// Limpia storage y publica identidad anónima.
    /// Idempotente: si ya era anónima no vuelve a publicar. Devuelve `true`
    /// si hubo transición.
    pub fn logout(&self) -> bool {
        if let Err(e) = remove_from_storage(self.storage.as_ref(), &self.storage_key) {
            log::error!("❌ [SESSION] Error eliminando sesión de storage: {}", e);
        }
        let changed = self.session.set_if_changed(None);
        if changed {
            log::info!("👋 [SESSION] Sesión cerrada");
        }
        changed
    }
}
