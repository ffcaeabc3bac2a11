use crate::{
    http::{create_http_client, DEFAULT_FETCH_TIMEOUT},
    progress::ProgressReporter,
    prober::Prober,
    resolver::{Resolver, SystemResolver},
    store::ResultStore,
    tlds::{expand_tlds, fetch_tlds, TldError, IANA_TLD_LIST_URL},
    types::ProbeConfig,
};
use reqwest::Client;
use std::{
    collections::HashMap,
    io::Write,
    sync::Arc,
    time::{Duration, Instant},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Tlds(#[from] TldError),
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Where progress frames go during a run.
pub enum ProgressSink {
    Hidden,
    Writer(Box<dyn Write + Send>),
}

impl ProgressSink {
    fn reporter(self, total: usize) -> ProgressReporter {
        match self {
            ProgressSink::Hidden => ProgressReporter::hidden(total),
            ProgressSink::Writer(out) => ProgressReporter::new(total, out),
        }
    }
}

#[derive(Debug)]
pub struct CheckOutcome {
    pub results: Arc<ResultStore>,
    pub completed: usize,
    pub total: usize,
    pub elapsed: Duration,
}

impl CheckOutcome {
    pub fn verdicts(&self) -> HashMap<String, bool> {
        self.results.snapshot()
    }
}

/// One check: TLD fetch, probe pool, collected verdicts. All run state
/// lives in the returned outcome, so checks can repeat in one process.
pub struct Checker {
    client: Client,
    prober: Prober,
    tld_list_url: String,
}

impl Checker {
    pub fn new() -> Result<Self, CheckError> {
        Self::with_config(ProbeConfig::default())
    }

    pub fn with_config(config: ProbeConfig) -> Result<Self, CheckError> {
        Self::with_resolver(config, Arc::new(SystemResolver))
    }

    pub fn with_resolver(config: ProbeConfig, resolver: Arc<dyn Resolver>) -> Result<Self, CheckError> {
        Ok(Self {
            client: create_http_client(DEFAULT_FETCH_TIMEOUT)?,
            prober: Prober::with_resolver(config, resolver),
            tld_list_url: IANA_TLD_LIST_URL.to_string(),
        })
    }

    pub fn with_tld_list_url(mut self, url: impl Into<String>) -> Self {
        self.tld_list_url = url.into();
        self
    }

    pub fn tld_list_url(&self) -> &str {
        &self.tld_list_url
    }

    pub async fn fetch_tlds(&self) -> Result<Vec<String>, CheckError> {
        Ok(fetch_tlds(&self.client, &self.tld_list_url).await?.tlds)
    }

    /// Fetches the TLD list and probes `base.tld` for every entry. A failed
    /// fetch returns before anything is probed.
    pub async fn check(&self, base: &str, sink: ProgressSink) -> Result<CheckOutcome, CheckError> {
        let tlds = self.fetch_tlds().await?;
        Ok(self.check_tlds(base, &tlds, sink).await)
    }

    pub async fn check_tlds(&self, base: &str, tlds: &[String], sink: ProgressSink) -> CheckOutcome {
        let start = Instant::now();
        let candidates: Vec<String> = expand_tlds(base, tlds).collect();
        let total = candidates.len();

        let store = Arc::new(ResultStore::with_capacity(total));
        let progress = Arc::new(sink.reporter(total));

        tracing::info!(base, candidates = total, "starting check");
        self.prober
            .run_pool(candidates, Arc::clone(&store), Arc::clone(&progress))
            .await;

        let completed = progress.completed();
        if completed != total || store.len() != total {
            tracing::warn!(completed, recorded = store.len(), total, "check finished short");
        }

        CheckOutcome {
            results: store,
            completed,
            total,
            elapsed: start.elapsed(),
        }
    }
}
