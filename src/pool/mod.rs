//! # Pool de Workers
//! src/pool/mod.rs
//!
//! Pool de tamaño fijo que consume tareas de una única cola FIFO compartida.
//!
//! ## Arquitectura
//!
//! ```text
//! acceptor ──enqueue──► [ cola FIFO ] ──► Worker-0
//!                                    ├──► Worker-1
//!                                    └──► Worker-N
//! ```
//!
//! - `enqueue` nunca bloquea ni falla: la cola no tiene límite, así que el
//!   pool no aplica backpressure.
//! - Cada tarea la ejecuta exactamente un worker, una sola vez.
//! - Si una tarea hace panic, solo se pierde esa tarea; el worker sigue vivo.
//! - `shutdown` despierta a todos los workers, deja que vacíen la cola y los
//!   espera con `join`.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

/// Unidad de trabajo diferido: sin argumentos ni valor de retorno
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Estado compartido protegido por el lock de la cola
struct PoolState {
    /// Tareas pendientes en orden de llegada
    tasks: VecDeque<Task>,

    /// Se activa en `shutdown`
    stop: bool,
}

/// Cola compartida entre el pool y sus workers
struct SharedQueue {
    state: Mutex<PoolState>,

    /// Notifica a los workers cuando hay tareas nuevas o se pide parar
    condvar: Condvar,
}

impl SharedQueue {
    fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Pool de workers con cola FIFO sin límite
pub struct ThreadPool {
    queue: Arc<SharedQueue>,
    workers: Vec<JoinHandle<()>>,
    size: usize,
}

impl ThreadPool {
    /// Crea el pool e inicia `size` workers. Un tamaño de 0 se ajusta a 1.
    ///
    /// # Ejemplo
    /// ```
    /// use file_server::pool::ThreadPool;
    /// use std::sync::atomic::{AtomicUsize, Ordering};
    /// use std::sync::Arc;
    ///
    /// let counter = Arc::new(AtomicUsize::new(0));
    /// let mut pool = ThreadPool::new(2);
    /// for _ in 0..10 {
    ///     let counter = Arc::clone(&counter);
    ///     pool.enqueue(move || { counter.fetch_add(1, Ordering::SeqCst); });
    /// }
    /// pool.shutdown();
    /// assert_eq!(counter.load(Ordering::SeqCst), 10);
    /// ```
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        let queue = Arc::new(SharedQueue {
            state: Mutex::new(PoolState {
                tasks: VecDeque::new(),
                stop: false,
            }),
            condvar: Condvar::new(),
        });

        let workers = (0..size)
            .map(|id| {
                let queue = Arc::clone(&queue);
                thread::Builder::new()
                    .name(format!("worker-{}", id))
                    .spawn(move || Self::worker_loop(id, queue))
            })
            .filter_map(|spawned| match spawned {
                Ok(handle) => Some(handle),
                Err(e) => {
                    eprintln!("   ❌ No se pudo crear un worker: {}", e);
                    None
                }
            })
            .collect();

        Self {
            queue,
            workers,
            size,
        }
    }

    /// Encola una tarea y retorna de inmediato
    pub fn enqueue<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        {
            let mut state = self.queue.lock();
            state.tasks.push_back(Box::new(task));
        }
        self.queue.condvar.notify_one();
    }

    /// Número de workers solicitados
    pub fn worker_count(&self) -> usize {
        self.size
    }

    /// Tareas que esperan un worker libre
    pub fn pending(&self) -> usize {
        self.queue.lock().tasks.len()
    }

    /// Detiene el pool: los workers vacían la cola y terminan
    ///
    /// Bloquea hasta que todos los workers hayan salido. Llamarlo más de una
    /// vez no tiene efecto.
    pub fn shutdown(&mut self) {
        {
            let mut state = self.queue.lock();
            state.stop = true;
        }
        self.queue.condvar.notify_all();

        for handle in self.workers.drain(..) {
            let name = handle.thread().name().unwrap_or("worker").to_string();
            if handle.join().is_err() {
                eprintln!("   ❌ {} terminó con panic", name);
            }
        }
    }

    /// Loop principal del worker
    fn worker_loop(id: usize, queue: Arc<SharedQueue>) {
        loop {
            let task = {
                let mut state = queue.lock();

                // Esperar hasta que haya tareas o se pida parar
                while state.tasks.is_empty() && !state.stop {
                    state = queue
                        .condvar
                        .wait(state)
                        .unwrap_or_else(PoisonError::into_inner);
                }

                match state.tasks.pop_front() {
                    Some(task) => task,
                    // stop activo y cola vacía
                    None => return,
                }
            };

            // La tarea corre sin el lock de la cola
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(task)) {
                eprintln!(
                    "   ❌ Worker {} tarea abortada: {}",
                    id,
                    panic_message(payload.as_ref())
                );
            }
        }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Extrae el mensaje de un panic, si es texto
fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "panic sin mensaje"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn test_zero_workers_is_clamped() {
        let pool = ThreadPool::new(0);
        assert_eq!(pool.worker_count(), 1);
    }

    #[test]
    fn test_every_task_runs_exactly_once() {
        const TASKS: usize = 2_000;
        let hits: Arc<Vec<AtomicUsize>> = Arc::new((0..TASKS).map(|_| AtomicUsize::new(0)).collect());
        let total = Arc::new(AtomicUsize::new(0));

        let mut pool = ThreadPool::new(8);
        for i in 0..TASKS {
            let hits = Arc::clone(&hits);
            let total = Arc::clone(&total);
            pool.enqueue(move || {
                hits[i].fetch_add(1, Ordering::SeqCst);
                total.fetch_add(1, Ordering::SeqCst);
            });
        }
        pool.shutdown();

        assert_eq!(total.load(Ordering::SeqCst), TASKS);
        assert!(hits.iter().all(|h| h.load(Ordering::SeqCst) == 1));
    }

    #[test]
    fn test_single_worker_is_fifo() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut pool = ThreadPool::new(1);

        for i in 0..50 {
            let order = Arc::clone(&order);
            pool.enqueue(move || order.lock().unwrap().push(i));
        }
        pool.shutdown();

        let order = order.lock().unwrap();
        assert_eq!(*order, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_panicking_task_does_not_kill_worker() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut pool = ThreadPool::new(1);

        pool.enqueue(|| panic!("boom"));
        for _ in 0..5 {
            let counter = Arc::clone(&counter);
            pool.enqueue(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        pool.shutdown();

        assert_eq!(counter.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_shutdown_drains_pending_tasks() {
        let counter = Arc::new(AtomicUsize::new(0));
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let mut pool = ThreadPool::new(1);

        // Bloquear al único worker hasta que se liberen las demás tareas
        pool.enqueue(move || {
            let _ = release_rx.recv_timeout(Duration::from_secs(5));
        });
        for _ in 0..10 {
            let counter = Arc::clone(&counter);
            pool.enqueue(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }

        assert!(pool.pending() >= 10);
        release_tx.send(()).unwrap();
        pool.shutdown();

        assert_eq!(counter.load(Ordering::SeqCst), 10);
        assert_eq!(pool.pending(), 0);
    }

    #[test]
    fn test_shutdown_twice_is_noop() {
        let mut pool = ThreadPool::new(2);
        pool.shutdown();
        pool.shutdown();
    }

    #[test]
    fn test_enqueue_from_many_threads() {
        let counter = Arc::new(AtomicUsize::new(0));
        let pool = Arc::new(Mutex::new(ThreadPool::new(4)));

        let producers: Vec<_> = (0..4)
            .map(|_| {
                let pool = Arc::clone(&pool);
                let counter = Arc::clone(&counter);
                thread::spawn(move || {
                    for _ in 0..100 {
                        let counter = Arc::clone(&counter);
                        pool.lock().unwrap().enqueue(move || {
                            counter.fetch_add(1, Ordering::SeqCst);
                        });
                    }
                })
            })
            .collect();

        for producer in producers {
            producer.join().unwrap();
        }
        pool.lock().unwrap().shutdown();

        assert_eq!(counter.load(Ordering::SeqCst), 400);
    }
}
