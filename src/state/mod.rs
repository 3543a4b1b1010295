// ============================================================================
// STATE MODULE - State Management con Rc<RefCell> + notificaciones
// ============================================================================

pub mod reactivity;
pub mod session_state;
pub mod resource_cache;

pub use reactivity::*;
pub use session_state::*;
pub use resource_cache::*;
