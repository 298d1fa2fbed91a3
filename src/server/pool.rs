//! # Pool de Workers
//! src/server/pool.rs
//!
//! Pool de tamaño fijo que atiende conexiones aceptadas. El accept loop
//! encola y N threads desencolan.
//!
//! - Cola acotada (`Mutex<VecDeque>` + `Condvar`): si está llena,
//!   `submit` devuelve el trabajo para que el llamador lo rechace.
//! - Un panic dentro del handler termina solo ese trabajo, no el worker.
//! - `shutdown` (y `Drop`) despierta a todos los workers, deja que
//!   vacíen la cola y hace join de cada thread.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

type Job<T> = Arc<dyn Fn(T) + Send + Sync>;

struct State<T> {
    queue: VecDeque<T>,
    shutting_down: bool,
}

struct Shared<T> {
    state: Mutex<State<T>>,
    condvar: Condvar,
    capacity: usize,
}

impl<T> Shared<T> {
    // Un worker que hizo panic con el lock tomado no invalida la cola
    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Pool de workers con cola acotada
pub struct WorkerPool<T: Send + 'static> {
    shared: Arc<Shared<T>>,
    workers: Vec<JoinHandle<()>>,
}

impl<T: Send + 'static> WorkerPool<T> {
    /// Crea el pool y arranca `size` workers
    ///
    /// # Errores
    ///
    /// Retorna error si el sistema no puede crear un thread.
    pub fn new<F>(size: usize, capacity: usize, handler: F) -> std::io::Result<Self>
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                queue: VecDeque::with_capacity(capacity),
                shutting_down: false,
            }),
            condvar: Condvar::new(),
            capacity,
        });
        let handler: Job<T> = Arc::new(handler);

        let mut pool = Self {
            shared,
            workers: Vec::with_capacity(size),
        };

        for id in 0..size {
            let shared = Arc::clone(&pool.shared);
            let handler = Arc::clone(&handler);
            let worker = thread::Builder::new()
                .name(format!("http-worker-{}", id))
                .spawn(move || Self::worker_loop(id, shared, handler))?;
            pool.workers.push(worker);
        }

        Ok(pool)
    }

    /// Encola un trabajo
    ///
    /// Retorna `Err(job)` si la cola está llena o el pool se está
    /// cerrando.
    pub fn submit(&self, job: T) -> Result<(), T> {
        let mut state = self.shared.lock();

        if state.shutting_down || state.queue.len() >= self.shared.capacity {
            return Err(job);
        }

        state.queue.push_back(job);
        self.shared.condvar.notify_one();
        Ok(())
    }

    /// Cantidad de workers
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Detiene el pool: los workers terminan la cola pendiente y salen
    pub fn shutdown(&mut self) {
        {
            let mut state = self.shared.lock();
            state.shutting_down = true;
        }
        self.shared.condvar.notify_all();

        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                tracing::error!("worker thread exited with a panic");
            }
        }
    }

    fn worker_loop(id: usize, shared: Arc<Shared<T>>, handler: Job<T>) {
        tracing::debug!(worker = id, "worker started");

        loop {
            let job = {
                let mut state = shared.lock();
                loop {
                    if let Some(job) = state.queue.pop_front() {
                        break Some(job);
                    }
                    if state.shutting_down {
                        break None;
                    }
                    state = shared
                        .condvar
                        .wait(state)
                        .unwrap_or_else(PoisonError::into_inner);
                }
            };

            let Some(job) = job else {
                break;
            };

            if panic::catch_unwind(AssertUnwindSafe(|| handler(job))).is_err() {
                tracing::error!(worker = id, "connection handler panicked");
            }
        }

        tracing::debug!(worker = id, "worker stopped");
    }
}

impl<T: Send + 'static> Drop for WorkerPool<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
