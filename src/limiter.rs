//! Portão de admissão com capacidade fixa para trabalho assíncrono.
//!
//! [`ConcurrencyLimiter`] envolve um `tokio::sync::Semaphore`: cada chamada a
//! [`ConcurrencyLimiter::run`] adquire uma vaga antes de iniciar a tarefa e a
//! devolve quando a tarefa termina, com sucesso ou falha.

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Semaphore;

/// Default number of transformations allowed in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Erros de construção do limitador.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LimiterError {
    /// A capacidade precisa ser um inteiro positivo.
    #[error("concurrency cap must be a positive integer, got {0}")]
    NonPositive(usize),

    /// A capacidade excede o teto de permissões do semáforo do tokio.
    #[error("concurrency cap {requested} exceeds the maximum of {max}")]
    TooLarge { requested: usize, max: usize },
}

/// Counting gate that keeps at most `capacity` tasks running at any instant.
///
/// Cloning is cheap and clones share the same slots.
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    slots: Arc<Semaphore>,
    capacity: usize,
}

impl ConcurrencyLimiter {
    /// Builds a limiter with `capacity` slots. Zero is rejected here, before any
    /// task can be submitted.
    pub fn new(capacity: usize) -> Result<Self, LimiterError> {
        if capacity == 0 {
            return Err(LimiterError::NonPositive(capacity));
        }
        if capacity > Semaphore::MAX_PERMITS {
            return Err(LimiterError::TooLarge {
                requested: capacity,
                max: Semaphore::MAX_PERMITS,
            });
        }
        Ok(Self {
            slots: Arc::new(Semaphore::new(capacity)),
            capacity,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of tasks currently holding a slot.
    pub fn in_flight(&self) -> usize {
        self.capacity - self.slots.available_permits()
    }

    /// Waits for a free slot, then builds and awaits `task`, returning its
    /// output untouched.
    ///
    /// The task is not constructed until a slot is held, so any work done
    /// eagerly by the closure also counts against the cap. The slot is an RAII
    /// permit: it is released when the task settles, whatever its result, and
    /// also if the returned future is dropped mid-flight.
    pub async fn run<F, Fut>(&self, task: F) -> Fut::Output
    where
        F: FnOnce() -> Fut,
        Fut: Future,
    {
        let _permit = self
            .slots
            .acquire()
            .await
            .expect("limiter semaphore is never closed");
        task().await
    }
}

impl Default for ConcurrencyLimiter {
    fn default() -> Self {
        Self {
            slots: Arc::new(Semaphore::new(DEFAULT_CONCURRENCY)),
            capacity: DEFAULT_CONCURRENCY,
        }
    }
}
