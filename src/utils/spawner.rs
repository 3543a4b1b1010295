use std::rc::Rc;

use futures::future::LocalBoxFuture;

/// Lanza una tarea en el event loop (single-thread).
/// En el navegador es `spawn_local`; en los tests un `LocalPool`.
pub type Spawner = Rc<dyn Fn(LocalBoxFuture<'static, ()>)>;

pub fn browser_spawner() -> Spawner {
    Rc::new(|task| wasm_bindgen_futures::spawn_local(task))
}
