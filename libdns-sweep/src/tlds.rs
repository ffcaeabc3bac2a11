use reqwest::Client;
use std::collections::HashSet;
use thiserror::Error;

pub const IANA_TLD_LIST_URL: &str = "https://data.iana.org/TLD/tlds-alpha-by-domain.txt";

#[derive(Debug, Error)]
pub enum TldError {
    #[error("Failed to fetch TLD list: {0}")]
    FetchError(#[from] reqwest::Error),
}

/// TLDs in fetch order, plus the raw line count of the body they came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TldList {
    pub tlds: Vec<String>,
    pub source_lines: usize,
}

impl TldList {
    pub fn len(&self) -> usize {
        self.tlds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tlds.is_empty()
    }
}

pub async fn fetch_tlds(client: &Client, url: &str) -> Result<TldList, TldError> {
    let body = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    let list = parse_tld_list(&body);
    tracing::info!(
        url,
        tlds = list.len(),
        source_lines = list.source_lines,
        "fetched TLD list"
    );
    Ok(list)
}

/// Trimmed and lowercased, or `None` for blank and `#` comment entries.
/// Blanks must never get through, they would turn into `name.` candidates.
pub fn normalize_tld(raw: &str) -> Option<String> {
    let tld = raw.trim().to_lowercase();
    if tld.is_empty() || tld.starts_with('#') {
        None
    } else {
        Some(tld)
    }
}

/// Normalizes every entry and keeps the first occurrence of each TLD.
pub fn normalize_tlds<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    raw.into_iter()
        .filter_map(|tld| normalize_tld(tld.as_ref()))
        .filter(|tld| seen.insert(tld.clone()))
        .collect()
}

/// One TLD per line in source order. Duplicates are left as they come.
pub fn parse_tld_list(body: &str) -> TldList {
    let mut source_lines = 0;

    let tlds = body
        .lines()
        .inspect(|_| source_lines += 1)
        .filter_map(normalize_tld)
        .collect();

    TldList { tlds, source_lines }
}

pub fn expand_tlds<'a>(name: &'a str, tlds: &'a [String]) -> impl Iterator<Item = String> + 'a {
    tlds.iter().map(move |tld| format!("{}.{}", name, tld))
}
