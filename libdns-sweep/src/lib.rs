mod checker;
mod http;
mod progress;
mod prober;
pub mod report;
mod resolver;
mod store;
pub mod tlds;
mod types;

pub use checker::{CheckError, CheckOutcome, Checker, ProgressSink};
pub use progress::{render_frame, Frame, ProgressReporter};
pub use prober::Prober;
pub use resolver::{ResolveError, Resolver, SystemResolver};
pub use store::ResultStore;
pub use tlds::{
    expand_tlds, fetch_tlds, normalize_tld, normalize_tlds, parse_tld_list, TldError, TldList,
    IANA_TLD_LIST_URL,
};
pub use types::{Availability, ProbeConfig, ProbeResult, DEFAULT_WORKER_COUNT};

use std::{collections::HashMap, sync::Arc};

pub async fn probe(domain: &str) -> ProbeResult {
    Prober::new().probe_one(domain).await
}

/// Probes `name.tld` for each TLD with the system resolver and default pool.
pub async fn probe_tlds(name: &str, tlds: &[String]) -> HashMap<String, bool> {
    let prober = Prober::new();
    let candidates: Vec<String> = expand_tlds(name, tlds).collect();
    let store = Arc::new(ResultStore::with_capacity(candidates.len()));
    let progress = Arc::new(ProgressReporter::hidden(candidates.len()));

    prober.run_pool(candidates, Arc::clone(&store), progress).await;
    store.snapshot()
}
