// ============================================================================
// ACACHAT PWA - Núcleo del cliente (RUST + WASM)
// ============================================================================
// - State: estado reactivo con Rc<RefCell> (sesión, caché de recursos)
// - Services: HTTP, firma de requests, navegación, tema
// - Stores: operaciones de sesión y de cursos sobre el estado
// - App: contexto que construye y conecta todo (sin singletons)
// ============================================================================

pub mod app;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod stores;
pub mod utils;

#[cfg(test)]
mod testing;

use std::cell::RefCell;

use wasm_bindgen::prelude::*;

pub use app::AppContext;
pub use config::{AppConfig, CONFIG};
pub use error::{ApiError, SessionError, StorageError};

// Contexto de la app en el hilo del navegador
thread_local! {
    static APP: RefCell<Option<AppContext>> = RefCell::new(None);
}

/// Contexto de la app (se crea en `start`)
pub fn app_context() -> Option<AppContext> {
    APP.with(|app| app.borrow().clone())
}

#[wasm_bindgen(start)]
pub fn start() {
    // Inicializar panic hook para mejor debugging
    console_error_panic_hook::set_once();

    if CONFIG.is_logging_enabled() {
        wasm_logger::init(wasm_logger::Config::default());
    }
    log::info!("🚀 AcaChat ({})", CONFIG.environment);

    let context = AppContext::browser(CONFIG.clone());
    APP.with(|app| {
        *app.borrow_mut() = Some(context);
    });
}
