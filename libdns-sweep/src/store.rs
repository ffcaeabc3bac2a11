use dashmap::DashMap;
use std::collections::HashMap;

/// Verdicts keyed by full candidate domain. `true` means the lookup failed
/// and the name is treated as available.
#[derive(Debug, Default)]
pub struct ResultStore {
    verdicts: DashMap<String, bool>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            verdicts: DashMap::with_capacity(capacity),
        }
    }

    /// Returns the previous verdict if the domain was already recorded.
    pub fn record(&self, domain: impl Into<String>, available: bool) -> Option<bool> {
        self.verdicts.insert(domain.into(), available)
    }

    /// Unknown domains read as registered.
    pub fn is_available(&self, domain: &str) -> bool {
        self.verdicts.get(domain).map(|v| *v).unwrap_or(false)
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.verdicts.contains_key(domain)
    }

    pub fn len(&self) -> usize {
        self.verdicts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verdicts.is_empty()
    }

    pub fn snapshot(&self) -> HashMap<String, bool> {
        self.verdicts
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }
}
