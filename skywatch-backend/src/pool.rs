///! Bounded execution gate for collaborator calls.
///!
///! Every outbound request (name resolution, ephemeris, catalog read) holds
///! one permit while it runs. Callers beyond the pool size wait in FIFO order
///! for a permit; a call that overruns its deadline is dropped, which cancels
///! the in-flight request, and surfaces as [`LookupError::Timeout`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

use crate::error::{LookupError, LookupResult};

#[derive(Debug, Clone)]
pub struct TaskPool {
    permits: Arc<Semaphore>,
    size: usize,
    timeout: Duration,
}

impl TaskPool {
    pub fn new(size: usize, timeout: Duration) -> Self {
        let size = size.max(1);
        Self {
            permits: Arc::new(Semaphore::new(size)),
            size,
            timeout,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Permits not currently held by a running call
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Run `task` once a permit is free, bounded by the pool deadline.
    ///
    /// The deadline covers execution only, not time spent queued.
    pub async fn run<T, F>(&self, service: &'static str, task: F) -> LookupResult<T>
    where
        F: Future<Output = LookupResult<T>>,
    {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| LookupError::collaborator(service, "task pool closed"))?;

        tracing::trace!(
            "{} call started ({}/{} slots free)",
            service,
            self.available(),
            self.size
        );

        match tokio::time::timeout(self.timeout, task).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    "{} call exceeded {:?}, cancelling",
                    service,
                    self.timeout
                );
                Err(LookupError::Timeout {
                    service,
                    seconds: self.timeout.as_secs(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_run_passes_result_through() {
        let pool = TaskPool::new(2, Duration::from_secs(1));

        let ok: LookupResult<u32> = pool.run("test", async { Ok(7) }).await;
        assert_eq!(ok.unwrap(), 7);

        let err: LookupResult<u32> = pool
            .run("test", async { Err(LookupError::ObjectNotFound("x".into())) })
            .await;
        assert!(matches!(err, Err(LookupError::ObjectNotFound(_))));
        assert_eq!(pool.available(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_becomes_timeout() {
        let pool = TaskPool::new(1, Duration::from_secs(5));

        let result: LookupResult<()> = pool
            .run("horizons", async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            })
            .await;

        match result {
            Err(LookupError::Timeout { service, seconds }) => {
                assert_eq!(service, "horizons");
                assert_eq!(seconds, 5);
            }
            other => panic!("expected timeout, got {:?}", other),
        }
        // Permit released after the timeout
        assert_eq!(pool.available(), 1);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let pool = TaskPool::new(2, Duration::from_secs(5));
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let calls = (0..6).map(|_| {
            let pool = pool.clone();
            let running = running.clone();
            let peak = peak.clone();
            async move {
                pool.run("test", async {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    running.fetch_sub(1, Ordering::SeqCst);
                    Ok(())
                })
                .await
            }
        });

        let results = futures::future::join_all(calls).await;
        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(peak.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_zero_size_is_clamped() {
        let pool = TaskPool::new(0, Duration::from_secs(1));
        assert_eq!(pool.size(), 1);
    }
}
