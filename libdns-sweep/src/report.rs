use serde::Serialize;
use std::{collections::HashMap, io::Write};

pub const AVAILABLE_MARKER: &str = "✅";
pub const TAKEN_MARKER: &str = "❌";

/// Shortest names first, ties broken lexicographically.
pub fn sorted_verdicts(results: &HashMap<String, bool>) -> Vec<(String, bool)> {
    let mut entries: Vec<(String, bool)> = results
        .iter()
        .map(|(domain, available)| (domain.clone(), *available))
        .collect();

    entries.sort_by(|(a, _), (b, _)| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    entries
}

pub fn render_line(domain: &str, available: bool) -> String {
    let marker = if available { AVAILABLE_MARKER } else { TAKEN_MARKER };
    format!("{}  {}", marker, domain)
}

pub fn render_lines(results: &HashMap<String, bool>) -> Vec<String> {
    sorted_verdicts(results)
        .into_iter()
        .map(|(domain, available)| render_line(&domain, available))
        .collect()
}

pub fn write_report<W: Write>(out: &mut W, results: &HashMap<String, bool>) -> std::io::Result<()> {
    for line in render_lines(results) {
        writeln!(out, "{}", line)?;
    }
    out.flush()
}

#[derive(Debug, Serialize)]
struct NdjsonRecord<'a> {
    query: &'a str,
    tld: &'a str,
    domain: &'a str,
    available: bool,
}

/// One JSON object per line, in report order.
pub fn write_ndjson<W: Write>(
    out: &mut W,
    query: &str,
    results: &HashMap<String, bool>,
) -> std::io::Result<()> {
    for (domain, available) in sorted_verdicts(results) {
        let tld = domain
            .strip_prefix(query)
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or_else(|| domain.rsplit('.').next().unwrap_or(""));

        let record = NdjsonRecord {
            query,
            tld,
            domain: &domain,
            available,
        };
        serde_json::to_writer(&mut *out, &record)?;
        writeln!(out)?;
    }
    out.flush()
}
