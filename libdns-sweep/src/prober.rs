use crate::{
    progress::ProgressReporter,
    resolver::{ResolveError, Resolver, SystemResolver},
    store::ResultStore,
    types::{Availability, ProbeConfig, ProbeResult},
};
use futures::future::join_all;
use std::{sync::Arc, time::Instant};
use tokio::sync::{mpsc, Mutex};

pub struct Prober {
    resolver: Arc<dyn Resolver>,
    config: ProbeConfig,
}

impl Prober {
    pub fn new() -> Self {
        Self::with_config(ProbeConfig::default())
    }

    pub fn with_config(config: ProbeConfig) -> Self {
        Self::with_resolver(config, Arc::new(SystemResolver))
    }

    pub fn with_resolver(config: ProbeConfig, resolver: Arc<dyn Resolver>) -> Self {
        Self { resolver, config }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Any failed lookup, whatever the cause, counts as available.
    pub async fn probe_one(&self, domain: &str) -> ProbeResult {
        let start = Instant::now();

        let lookup = self.resolver.resolve(domain);
        let outcome = match self.config.probe_timeout {
            Some(timeout) => match tokio::time::timeout(timeout, lookup).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    tracing::warn!(domain, ?timeout, "lookup timed out");
                    return ProbeResult {
                        domain: domain.to_string(),
                        availability: Availability::Available,
                        duration: start.elapsed(),
                    };
                }
            },
            None => lookup.await,
        };

        let availability = match outcome {
            Ok(addrs) => {
                tracing::debug!(domain, addrs = addrs.len(), "resolved");
                Availability::Taken
            }
            Err(ResolveError::NotFound(_)) => {
                tracing::debug!(domain, "no such name");
                Availability::Available
            }
            Err(e) => {
                tracing::debug!(domain, error = %e, "lookup failed");
                Availability::Available
            }
        };

        ProbeResult {
            domain: domain.to_string(),
            availability,
            duration: start.elapsed(),
        }
    }

    /// Drains `candidates` through `worker_count` tasks sharing one queue.
    /// Returns once every worker has exited; each candidate is probed once
    /// and each probe bumps `progress` once.
    pub async fn run_pool<I>(
        &self,
        candidates: I,
        store: Arc<ResultStore>,
        progress: Arc<ProgressReporter>,
    ) where
        I: IntoIterator<Item = String>,
    {
        let (tx, rx) = mpsc::unbounded_channel::<String>();
        let rx = Arc::new(Mutex::new(rx));
        let worker_count = self.config.effective_workers();

        let workers: Vec<_> = (0..worker_count)
            .map(|worker| {
                let rx = Arc::clone(&rx);
                let store = Arc::clone(&store);
                let progress = Arc::clone(&progress);
                let prober = self.clone();

                tokio::spawn(async move {
                    let mut probed = 0usize;
                    loop {
                        let next = rx.lock().await.recv().await;
                        let Some(domain) = next else { break };

                        let result = prober.probe_one(&domain).await;
                        store.record(result.domain, result.availability.is_available());
                        progress.on_probe_complete();
                        probed += 1;
                    }
                    tracing::trace!(worker, probed, "worker done");
                })
            })
            .collect();

        let mut enqueued = 0usize;
        for domain in candidates {
            // Receiver lives in the workers, which only exit after the sender drops.
            if tx.send(domain).is_err() {
                break;
            }
            enqueued += 1;
        }
        drop(tx);
        tracing::info!(enqueued, workers = worker_count, "queued candidates");

        for (worker, joined) in join_all(workers).await.into_iter().enumerate() {
            if let Err(e) = joined {
                tracing::error!(worker, error = %e, "probe worker failed");
            }
        }
    }
}

impl Default for Prober {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Prober {
    fn clone(&self) -> Self {
        Self {
            resolver: Arc::clone(&self.resolver),
            config: self.config.clone(),
        }
    }
}
