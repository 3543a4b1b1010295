// ============================================================================
// RESOURCE CACHE - Colección reactiva con fetch único y generaciones
// ============================================================================
// - Como máximo un fetch en vuelo por generación; los llamadores concurrentes
//   comparten el mismo futuro.
// - `invalidate()` avanza la generación: un fetch viejo termina igual, pero su
//   resultado se descarta y nunca se publica.
// - El marcador de fetch en vuelo se libera siempre al resolver (éxito, error
//   o descarte), después del chequeo de generación.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use futures::future::{self, FutureExt, LocalBoxFuture, Shared};

use crate::error::ApiError;
use crate::state::reactivity::{ReactiveState, Subscription};
use crate::utils::spawner::Spawner;

pub type FetchResult<T> = Result<Vec<T>, ApiError>;
pub type FetchFuture<T> = LocalBoxFuture<'static, FetchResult<T>>;

type SharedFetch<T> = Shared<FetchFuture<T>>;

/// Fetch en curso, marcado con la generación para la que se lanzó
struct PendingFetch<T> {
    generation: u64,
    future: SharedFetch<T>,
}

struct CacheInner<T> {
    label: &'static str,
    items: ReactiveState<Vec<T>>,
    /// `None` = todavía no hay resultado para la generación actual
    loaded: RefCell<Option<Vec<T>>>,
    generation: Cell<u64>,
    in_flight: RefCell<Option<PendingFetch<T>>>,
    fetcher: Box<dyn Fn() -> FetchFuture<T>>,
    spawner: Spawner,
}

/// Caché reactiva de una colección por sesión
pub struct ResourceCache<T> {
    inner: Rc<CacheInner<T>>,
}

impl<T> Clone for ResourceCache<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + 'static> ResourceCache<T> {
    pub fn new<F>(label: &'static str, spawner: Spawner, fetcher: F) -> Self
    where
        F: Fn() -> FetchFuture<T> + 'static,
    {
        Self {
            inner: Rc::new(CacheInner {
                label,
                items: ReactiveState::new(Vec::new()),
                loaded: RefCell::new(None),
                generation: Cell::new(0),
                in_flight: RefCell::new(None),
                fetcher: Box::new(fetcher),
                spawner,
            }),
        }
    }

    /// Stream con los items actuales y cada actualización posterior.
    /// Si no hay datos cargados dispara una carga en segundo plano; sus
    /// errores solo se registran en el log.
    pub fn watch(&self) -> Subscription<Vec<T>> {
        let subscription = self.inner.items.subscribe();
        if self.inner.loaded.borrow().is_none() {
            // El fetch ya queda en manos de su tarea, no hace falta esperarlo
            drop(self.load(false));
        }
        subscription
    }

    /// Carga la colección.
    ///
    /// Sin `force` y con datos de la generación actual resuelve al instante.
    /// Si ya hay un fetch en vuelo para la generación actual devuelve ese
    /// mismo fetch (también con `force`).
    pub fn load(&self, force: bool) -> LocalBoxFuture<'static, FetchResult<T>> {
        let inner = &self.inner;

        if !force {
            if let Some(items) = inner.loaded.borrow().as_ref() {
                return future::ready(Ok(items.clone())).boxed_local();
            }
        }

        let generation = inner.generation.get();
        if let Some(pending) = inner.in_flight.borrow().as_ref() {
            if pending.generation == generation {
                log::debug!("🔗 [CACHE:{}] Reutilizando fetch en vuelo", inner.label);
                return pending.future.clone().boxed_local();
            }
        }

        self.start_fetch(generation).boxed_local()
    }

    /// Reemplaza los items sin tocar la generación (p.ej. tras editar un curso)
    pub fn set_items(&self, items: Vec<T>) {
        *self.inner.loaded.borrow_mut() = Some(items.clone());
        self.inner.items.set(items);
    }

    /// Avanza la generación, vacía la caché y publica una colección vacía.
    /// Un fetch en vuelo termina igual, pero su resultado se descarta.
    pub fn invalidate(&self) {
        let inner = &self.inner;
        inner.generation.set(inner.generation.get() + 1);
        *inner.loaded.borrow_mut() = None;
        *inner.in_flight.borrow_mut() = None;
        log::info!(
            "🗑️ [CACHE:{}] Caché invalidada (generación {})",
            inner.label,
            inner.generation.get()
        );
        inner.items.set(Vec::new());
    }

    pub fn items(&self) -> Vec<T> {
        self.inner.items.get()
    }

    pub fn generation(&self) -> u64 {
        self.inner.generation.get()
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.loaded.borrow().is_some()
    }

    pub fn is_loading(&self) -> bool {
        let generation = self.inner.generation.get();
        self.inner
            .in_flight
            .borrow()
            .as_ref()
            .is_some_and(|pending| pending.generation == generation)
    }

    fn start_fetch(&self, generation: u64) -> SharedFetch<T> {
        let inner = &self.inner;
        log::info!("📥 [CACHE:{}] Fetch (generación {})", inner.label, generation);

        let fetch = (inner.fetcher)();
        let weak = Rc::downgrade(inner);
        let shared = async move {
            let result = fetch.await;
            if let Some(inner) = weak.upgrade() {
                inner.settle(generation, &result);
            }
            result
        }
        .boxed_local()
        .shared();

        // El marcador se registra antes de lanzar la tarea que lo resuelve
        *inner.in_flight.borrow_mut() = Some(PendingFetch {
            generation,
            future: shared.clone(),
        });

        // La tarea garantiza que el fetch termine aunque nadie lo espere
        let driver = shared.clone();
        (inner.spawner)(
            async move {
                let _ = driver.await;
            }
            .boxed_local(),
        );

        shared
    }
}

impl<T: Clone + 'static> CacheInner<T> {
    fn settle(&self, generation: u64, result: &FetchResult<T>) {
        let is_current = self.generation.get() == generation;

        {
            let mut in_flight = self.in_flight.borrow_mut();
            if in_flight
                .as_ref()
                .is_some_and(|pending| pending.generation == generation)
            {
                *in_flight = None;
            }
        }

        if !is_current {
            log::info!(
                "🗑️ [CACHE:{}] Resultado obsoleto descartado (generación {} → {})",
                self.label,
                generation,
                self.generation.get()
            );
            return;
        }

        match result {
            Ok(items) => {
                log::info!("✅ [CACHE:{}] {} elementos cargados", self.label, items.len());
                *self.loaded.borrow_mut() = Some(items.clone());
                self.items.set(items.clone());
            }
            Err(e) => {
                log::warn!("⚠️ [CACHE:{}] Error cargando: {}", self.label, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{drain, local_pool};
    use futures::channel::oneshot;
    use futures::executor::LocalPool;

    type Reply = oneshot::Sender<FetchResult<u32>>;

    struct Harness {
        pool: LocalPool,
        cache: ResourceCache<u32>,
        calls: Rc<Cell<usize>>,
        pending: Rc<RefCell<Vec<Reply>>>,
    }

    impl Harness {
        fn new() -> Self {
            let (pool, spawner) = local_pool();
            let calls = Rc::new(Cell::new(0));
            let pending: Rc<RefCell<Vec<Reply>>> = Rc::new(RefCell::new(Vec::new()));

            let cache = ResourceCache::new("test", spawner, {
                let calls = calls.clone();
                let pending = pending.clone();
                move || {
                    calls.set(calls.get() + 1);
                    let (tx, rx) = oneshot::channel();
                    pending.borrow_mut().push(tx);
                    async move {
                        rx.await
                            .unwrap_or_else(|_| Err(ApiError::Network("cancelled".into())))
                    }
                    .boxed_local()
                }
            });

            Self { pool, cache, calls, pending }
        }

        /// Resuelve el fetch más antiguo todavía pendiente
        fn reply(&mut self, result: FetchResult<u32>) {
            let tx = self.pending.borrow_mut().remove(0);
            tx.send(result).unwrap();
            self.pool.run_until_stalled();
        }
    }

    #[test]
    fn concurrent_loads_share_one_fetch() {
        let mut h = Harness::new();
        let a = h.cache.load(false);
        let b = h.cache.load(false);
        let c = h.cache.load(false);
        assert_eq!(h.calls.get(), 1);
        assert!(h.cache.is_loading());

        h.reply(Ok(vec![1, 2]));
        let (a, b, c) = h.pool.run_until(future::join3(a, b, c));
        assert_eq!(a, Ok(vec![1, 2]));
        assert_eq!(b, Ok(vec![1, 2]));
        assert_eq!(c, Ok(vec![1, 2]));

        // Ya cargado: sin red
        let cached = h.pool.run_until(h.cache.load(false));
        assert_eq!(cached, Ok(vec![1, 2]));
        assert_eq!(h.calls.get(), 1);
        assert!(!h.cache.is_loading());
    }

    #[test]
    fn force_while_in_flight_joins_existing_fetch() {
        let mut h = Harness::new();
        let first = h.cache.load(false);
        let forced = h.cache.load(true);
        assert_eq!(h.calls.get(), 1);

        h.reply(Ok(vec![4]));
        assert_eq!(h.pool.run_until(first), Ok(vec![4]));
        assert_eq!(h.pool.run_until(forced), Ok(vec![4]));
    }

    #[test]
    fn force_after_load_refetches() {
        let mut h = Harness::new();
        let _ = h.cache.load(false);
        h.reply(Ok(vec![1]));

        let refreshed = h.cache.load(true);
        assert_eq!(h.calls.get(), 2);
        h.reply(Ok(vec![1, 2]));
        assert_eq!(h.pool.run_until(refreshed), Ok(vec![1, 2]));
        assert_eq!(h.cache.items(), vec![1, 2]);
    }

    #[test]
    fn invalidate_discards_stale_result() {
        let mut h = Harness::new();
        let mut sub = h.cache.watch();
        assert_eq!(h.calls.get(), 1);

        let stale = h.cache.load(false);
        h.cache.invalidate();
        h.reply(Ok(vec![9]));

        // El llamador recibe el valor, pero la caché no lo guarda
        assert_eq!(h.pool.run_until(stale), Ok(vec![9]));
        assert!(h.cache.items().is_empty());
        assert!(!h.cache.is_loaded());
        assert_eq!(drain(&mut sub), vec![Vec::<u32>::new(), Vec::<u32>::new()]);

        let _ = h.cache.load(false);
        assert_eq!(h.calls.get(), 2);
    }

    #[test]
    fn stale_settle_does_not_release_newer_fetch() {
        let mut h = Harness::new();
        let _old = h.cache.load(false);
        h.cache.invalidate();
        let newer = h.cache.load(false);
        assert_eq!(h.calls.get(), 2);

        h.reply(Ok(vec![1]));
        // El fetch nuevo sigue en vuelo y se reutiliza
        let joined = h.cache.load(false);
        assert_eq!(h.calls.get(), 2);

        h.reply(Ok(vec![2]));
        assert_eq!(h.pool.run_until(newer), Ok(vec![2]));
        assert_eq!(h.pool.run_until(joined), Ok(vec![2]));
        assert_eq!(h.cache.items(), vec![2]);
        assert_eq!(h.cache.generation(), 1);
    }

    #[test]
    fn watch_reads_through_once() {
        let mut h = Harness::new();
        let mut first = h.cache.watch();
        let mut second = h.cache.watch();
        assert_eq!(h.calls.get(), 1);

        h.reply(Ok(vec![5]));
        assert_eq!(drain(&mut first), vec![vec![], vec![5]]);
        assert_eq!(drain(&mut second), vec![vec![], vec![5]]);

        // Replay del último valor sin nuevo fetch
        let mut late = h.cache.watch();
        assert_eq!(late.try_next_now(), Some(vec![5]));
        assert_eq!(h.calls.get(), 1);
    }

    #[test]
    fn failure_keeps_items_and_releases_marker() {
        let mut h = Harness::new();
        h.cache.set_items(vec![1]);

        let failed = h.cache.load(true);
        h.reply(Err(ApiError::http(500, "INTERNAL SERVER ERROR")));
        assert_eq!(
            h.pool.run_until(failed),
            Err(ApiError::http(500, "INTERNAL SERVER ERROR"))
        );
        assert_eq!(h.cache.items(), vec![1]);
        assert!(!h.cache.is_loading());

        let _ = h.cache.load(true);
        assert_eq!(h.calls.get(), 2);
    }

    #[test]
    fn set_items_keeps_generation() {
        let h = Harness::new();
        let mut sub = h.cache.watch();
        h.cache.set_items(vec![3, 4]);
        assert_eq!(h.cache.generation(), 0);
        assert!(h.cache.is_loaded());
        assert_eq!(drain(&mut sub), vec![vec![], vec![3, 4]]);
    }

    #[test]
    fn dropped_callers_do_not_wedge_the_fetch() {
        let mut h = Harness::new();
        drop(h.cache.load(false));
        h.reply(Ok(vec![7]));
        assert_eq!(h.cache.items(), vec![7]);
        assert!(!h.cache.is_loading());
    }
}
