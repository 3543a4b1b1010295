use wasm_bindgen::JsValue;
use web_sys::{window, Event};

/// Navegación de la app (router externo)
pub trait Navigator {
    /// Ruta actual, p.ej. `/tabs/home`
    fn current_path(&self) -> String;
    fn navigate(&self, route: &str);
}

/// Navegación con la History API; el router escucha `popstate`
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserNavigator;

impl Navigator for BrowserNavigator {
    fn current_path(&self) -> String {
        window()
            .and_then(|w| w.location().pathname().ok())
            .unwrap_or_default()
    }

    fn navigate(&self, route: &str) {
        let Some(win) = window() else {
            return;
        };

        let pushed = win
            .history()
            .and_then(|history| history.push_state_with_url(&JsValue::NULL, "", Some(route)));
        if let Err(e) = pushed {
            log::error!("❌ [NAV] No se pudo navegar a {}: {:?}", route, e);
            return;
        }

        match Event::new("popstate") {
            Ok(event) => {
                let _ = win.dispatch_event(&event);
            }
            Err(e) => log::error!("❌ [NAV] Error creando evento popstate: {:?}", e),
        }
    }
}
