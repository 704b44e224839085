//! Pooled PAC evaluation.
//!
//! `boa_engine::Context` is not `Send` (its heap is `Rc`-managed), so a
//! single [`Evaluator`] cannot hop between threads the way a pooled
//! connection normally would. Instead each pool slot is a dedicated OS
//! thread that owns its `Evaluator` for the pool's entire lifetime; callers
//! reach it over a channel and await the reply, so the async call site
//! never has to know the evaluator itself is thread-pinned.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;

use crate::error::PacError;
use crate::eval::{Evaluator, ScriptBundle};

struct Job {
    url: String,
    host: String,
    reply: tokio::sync::oneshot::Sender<Result<String, PacError>>,
}

struct Worker {
    tx: mpsc::Sender<Job>,
}

/// A fixed-size pool of `FindProxyForURL` evaluators for one PAC script.
pub struct EvaluatorPool {
    workers: Vec<Worker>,
    next: AtomicUsize,
}

impl EvaluatorPool {
    /// Spin up `size` worker threads, each loading an independent
    /// [`Evaluator`] from `bundle`. Fails if the script itself is invalid
    /// (propagating whatever the first evaluator's construction reports)
    /// rather than deferring that failure to the first request.
    pub fn new(bundle: ScriptBundle, size: usize) -> Result<Self, PacError> {
        assert!(size > 0, "EvaluatorPool size must be non-zero");
        let mut workers = Vec::with_capacity(size);
        for index in 0..size {
            workers.push(spawn_worker(bundle.clone(), index)?);
        }
        Ok(Self {
            workers,
            next: AtomicUsize::new(0),
        })
    }

    /// Evaluate `FindProxyForURL(url, host)` on the next worker in
    /// round-robin order.
    pub async fn evaluate(&self, url: &str, host: &str) -> Result<String, PacError> {
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.workers.len();
        let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();
        let job = Job {
            url: url.to_owned(),
            host: host.to_owned(),
            reply: reply_tx,
        };
        self.workers[index]
            .tx
            .send(job)
            .map_err(|_| PacError::Script("PAC evaluator worker terminated".to_owned()))?;
        reply_rx
            .await
            .map_err(|_| PacError::Script("PAC evaluator worker terminated".to_owned()))?
    }

    /// Number of worker threads backing this pool.
    pub fn size(&self) -> usize {
        self.workers.len()
    }
}

fn spawn_worker(bundle: ScriptBundle, index: usize) -> Result<Worker, PacError> {
    let (tx, rx) = mpsc::channel::<Job>();
    let (ready_tx, ready_rx) = mpsc::channel::<Result<(), PacError>>();

    std::thread::Builder::new()
        .name(format!("rama-pac-worker-{index}"))
        .spawn(move || {
            let mut evaluator = match Evaluator::new(&bundle) {
                Ok(evaluator) => {
                    let _ = ready_tx.send(Ok(()));
                    evaluator
                }
                Err(err) => {
                    let _ = ready_tx.send(Err(err));
                    return;
                }
            };
            for job in rx {
                let result = evaluator.evaluate(&job.url, &job.host);
                let _ = job.reply.send(result);
            }
        })
        .map_err(|err| PacError::Worker(format!("failed to spawn worker thread: {err}")))?;

    ready_rx
        .recv()
        .map_err(|_| PacError::Worker("worker thread exited before reporting readiness".to_owned()))??;
    Ok(Worker { tx })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn evaluates_across_pooled_workers() {
        let bundle = ScriptBundle::new(
            "function FindProxyForURL(url, host) { return 'PROXY proxy.example.com:8080'; }"
                .to_owned(),
        );
        let pool = EvaluatorPool::new(bundle, 3).unwrap();
        assert_eq!(pool.size(), 3);
        for _ in 0..6 {
            assert_eq!(
                pool.evaluate("http://x/", "x").await.unwrap(),
                "PROXY proxy.example.com:8080"
            );
        }
    }

    #[tokio::test]
    async fn rejects_invalid_script_up_front() {
        let bundle = ScriptBundle::new("function notAnEntryPoint() {}".to_owned());
        assert!(matches!(
            EvaluatorPool::new(bundle, 2),
            Err(PacError::MissingEntryPoint)
        ));
    }
}
