// ============================================================================
// REACTIVITY - Estado reactivo con suscripción "replay-latest"
// ============================================================================
// Cada suscriptor recibe primero el valor actual (sin esperar) y después
// todos los cambios, en orden y una sola vez, por su propia cola.
// ============================================================================

use std::cell::RefCell;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use futures::Stream;

/// Estado reactivo compartido (single-thread)
pub struct ReactiveState<T> {
    inner: Rc<ReactiveInner<T>>,
}

type Callback<T> = Rc<dyn Fn(&T)>;

struct ReactiveInner<T> {
    value: RefCell<T>,
    subscribers: RefCell<Vec<UnboundedSender<T>>>,
    callbacks: RefCell<Vec<Callback<T>>>,
}

impl<T: Clone + 'static> ReactiveState<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(ReactiveInner {
                value: RefCell::new(value),
                subscribers: RefCell::new(Vec::new()),
                callbacks: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Último valor publicado
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Lectura sin clonar
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Establecer nuevo valor y notificar a todos los suscriptores
    pub fn set(&self, new_value: T) {
        *self.inner.value.borrow_mut() = new_value.clone();
        self.notify(new_value);
    }

    /// Suscribirse: el stream entrega el valor actual y luego cada cambio
    pub fn subscribe(&self) -> Subscription<T> {
        let (tx, rx) = unbounded();
        // La cola es nueva y sin límite, el envío solo falla si rx ya no existe
        let _ = tx.unbounded_send(self.get());
        self.inner.subscribers.borrow_mut().push(tx);
        Subscription { receiver: rx }
    }

    /// Callback síncrono en cada cambio (no recibe el valor actual).
    /// Corre dentro de `set`, así que no debe modificar este mismo estado.
    pub fn on_change<F>(&self, callback: F)
    where
        F: Fn(&T) + 'static,
    {
        self.inner.callbacks.borrow_mut().push(Rc::new(callback));
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner
            .subscribers
            .borrow()
            .iter()
            .filter(|tx| !tx.is_closed())
            .count()
    }

    fn notify(&self, value: T) {
        // Los suscriptores que ya soltaron su stream se descartan aquí
        self.inner
            .subscribers
            .borrow_mut()
            .retain(|tx| tx.unbounded_send(value.clone()).is_ok());

        let callbacks: Vec<Callback<T>> = self.inner.callbacks.borrow().clone();
        for callback in callbacks {
            callback(&value);
        }
    }
}

impl<T: Clone + PartialEq + 'static> ReactiveState<T> {
    /// Como `set`, pero no publica si el valor no cambió.
    /// Devuelve `true` si hubo publicación.
    pub fn set_if_changed(&self, new_value: T) -> bool {
        if *self.inner.value.borrow() == new_value {
            return false;
        }
        self.set(new_value);
        true
    }
}

impl<T> Clone for ReactiveState<T> {
    // Clonar comparte el mismo estado y los mismos suscriptores
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

/// Stream de un suscriptor
pub struct Subscription<T> {
    receiver: UnboundedReceiver<T>,
}

impl<T> Subscription<T> {
    /// Siguiente valor ya disponible, sin esperar.
    /// Útil para leer el valor replicado justo después de suscribirse.
    pub fn try_next_now(&mut self) -> Option<T> {
        self.receiver.try_recv().ok()
    }
}

impl<T> Stream for Subscription<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        Pin::new(&mut self.receiver).poll_next(cx)
    }
}
