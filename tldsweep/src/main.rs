use clap::Parser;
use libdns_sweep::{
    normalize_tld, normalize_tlds, report, Checker, ProbeConfig, ProgressSink,
    DEFAULT_WORKER_COUNT, IANA_TLD_LIST_URL,
};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashSet,
    future::Future,
    io::{self, Write},
    path::{Path, PathBuf},
    time::{Duration, Instant},
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default, Deserialize, Serialize)]
struct Config {
    #[serde(default)]
    tlds: TldConfig,
    #[serde(default)]
    probe: ProbeSection,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct TldConfig {
    #[serde(default)]
    always: Vec<String>,
    #[serde(default)]
    never: Vec<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct ProbeSection {
    workers: Option<usize>,
    timeout_secs: Option<u64>,
}

fn load_config(path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("could not read config {}: {}", path.display(), e))?;
    let config = toml::from_str(&content)
        .map_err(|e| format!("invalid config {}: {}", path.display(), e))?;
    Ok(config)
}

/// Result is normalized and free of repeats, so each TLD yields one candidate.
fn apply_config_to_tlds(tlds: Vec<String>, config: &Config) -> Vec<String> {
    let mut tlds = normalize_tlds(tlds);
    let never_set: HashSet<String> = config.tlds.never.iter()
        .filter_map(|s| normalize_tld(s))
        .collect();

    tlds.retain(|tld| !never_set.contains(tld));

    for always_tld in config.tlds.always.iter().rev().filter_map(|s| normalize_tld(s)) {
        if !tlds.contains(&always_tld) {
            tlds.insert(0, always_tld);
        }
    }

    tlds
}

fn get_default_config_toml() -> String {
    format!(
        r#"# tldsweep configuration (pass with --config)

[tlds]
# TLDs to always check, even if missing from the fetched list
# always = ["com", "net", "org", "io", "dev"]
always = []

# TLDs to skip
# never = ["xxx", "adult"]
never = []

[probe]
# Concurrent lookups
workers = {}

# Give up on a single lookup after this many seconds (unset = wait forever)
# timeout_secs = 10
"#,
        DEFAULT_WORKER_COUNT
    )
}

#[derive(Parser, Debug)]
#[command(name = "tldsweep", version)]
#[command(
    about = "Check a name against every TLD by DNS resolution",
    long_about = "Checks availability of a name across all IANA TLDs.\n\n\
                  Example: passing `google` checks `google.io`, `google.org`, `google.li`, etc.\n\n\
                  A name that does not resolve is reported as available. Registered domains \
                  without DNS records are reported as available too."
)]
struct Args {
    /// Name to check (without TLD)
    domain: Option<String>,

    /// Number of concurrent lookups
    #[arg(long, short = 'w')]
    workers: Option<usize>,

    /// Per-lookup timeout in seconds; lookups that time out count as available
    #[arg(long)]
    timeout: Option<u64>,

    /// Comma-separated list of TLDs to check instead of fetching the IANA list
    #[arg(long, value_delimiter = ',')]
    tlds: Option<Vec<String>>,

    /// Output results as NDJSON (one JSON object per line)
    #[arg(long, short = 'j')]
    ndjson: bool,

    /// Do not draw the progress bar
    #[arg(long)]
    no_progress: bool,

    /// URL of the newline-delimited TLD list
    #[arg(long, default_value = IANA_TLD_LIST_URL)]
    tld_list_url: String,

    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the default config to stdout and exit
    #[arg(long)]
    print_default_config: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn probe_config(args: &Args, config: &Config) -> ProbeConfig {
    let workers = args.workers
        .or(config.probe.workers)
        .unwrap_or(DEFAULT_WORKER_COUNT);
    let mut probe = ProbeConfig::default().with_workers(workers);
    if let Some(secs) = args.timeout.or(config.probe.timeout_secs) {
        probe = probe.with_timeout(Duration::from_secs(secs));
    }
    probe
}

/// Drives `future` on a fresh runtime. Lookups abandoned by the probe timeout
/// may still sit in getaddrinfo on the blocking pool; shutdown does not wait
/// for them.
fn run_detached<F: Future>(future: F) -> io::Result<F::Output> {
    let rt = tokio::runtime::Runtime::new()?;
    let output = rt.block_on(future);
    rt.shutdown_background();
    Ok(output)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();
    let args = Args::parse();

    if args.print_default_config {
        println!("{}", get_default_config_toml());
        return Ok(());
    }

    let Some(domain) = args.domain.clone() else {
        eprintln!("Error: a domain name is required (see --help)");
        std::process::exit(2);
    };

    init_tracing();

    let config = match &args.config {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };
    tracing::debug!(?config, "loaded config");

    let checker = Checker::with_config(probe_config(&args, &config))?
        .with_tld_list_url(args.tld_list_url.clone());

    let outcome = run_detached(async {
        let tlds = match args.tlds.clone() {
            Some(custom_tlds) => custom_tlds,
            None => checker.fetch_tlds().await?,
        };
        let tlds = apply_config_to_tlds(tlds, &config);

        let sink = if args.ndjson || args.no_progress {
            ProgressSink::Hidden
        } else {
            ProgressSink::Writer(Box::new(io::stdout()))
        };

        Ok::<_, libdns_sweep::CheckError>(checker.check_tlds(&domain, &tlds, sink).await)
    })?;

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let verdicts = outcome.verdicts();
    let mut stdout = io::stdout().lock();
    if args.ndjson {
        report::write_ndjson(&mut stdout, &domain, &verdicts)?;
        return Ok(());
    }

    report::write_report(&mut stdout, &verdicts)?;
    writeln!(stdout, "\nExecution time:  {}", start.elapsed().as_secs_f64())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use libdns_sweep::{ResolveError, Resolver};
    use std::{net::IpAddr, sync::Arc};

    /// Parks every lookup on the blocking pool, the way getaddrinfo does.
    struct StuckResolver;

    #[async_trait]
    impl Resolver for StuckResolver {
        async fn resolve(&self, host: &str) -> Result<Vec<IpAddr>, ResolveError> {
            let _ = tokio::task::spawn_blocking(|| std::thread::sleep(Duration::from_secs(4))).await;
            Err(ResolveError::NotFound(host.to_string()))
        }
    }

    fn tlds(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_apply_config_never_and_always() {
        let config = Config {
            tlds: TldConfig {
                always: tlds(&["RS", "com"]),
                never: tlds(&["XXX"]),
            },
            ..Default::default()
        };

        let result = apply_config_to_tlds(tlds(&["com", "xxx", "org"]), &config);
        assert_eq!(result, tlds(&["rs", "com", "org"]));
    }

    #[test]
    fn test_apply_config_normalizes_every_source() {
        let config = Config {
            tlds: TldConfig {
                always: tlds(&[" Dev ", "", "dev"]),
                never: tlds(&[" ORG"]),
            },
            ..Default::default()
        };

        let result = apply_config_to_tlds(tlds(&["io", "", " IO", "org", "#x", "dev"]), &config);
        assert_eq!(result, tlds(&["io", "dev"]));
    }

    #[test]
    fn test_timed_out_lookup_does_not_hold_shutdown() {
        let checker = Checker::with_resolver(
            ProbeConfig::default().with_timeout(Duration::from_millis(100)),
            Arc::new(StuckResolver),
        )
        .unwrap();

        let start = Instant::now();
        let outcome = run_detached(async {
            checker.check_tlds("stuck", &tlds(&["io"]), ProgressSink::Hidden).await
        })
        .unwrap();

        assert_eq!(outcome.completed, 1);
        assert!(outcome.results.is_available("stuck.io"));
        assert!(
            start.elapsed() < Duration::from_secs(2),
            "shutdown waited {:?}",
            start.elapsed()
        );
    }

    #[test]
    fn test_default_config_parses() {
        let config: Config = toml::from_str(&get_default_config_toml()).unwrap();
        assert_eq!(config.probe.workers, Some(DEFAULT_WORKER_COUNT));
        assert!(config.probe.timeout_secs.is_none());
        assert!(config.tlds.always.is_empty());
    }

    #[test]
    fn test_flags_override_config() {
        let args = Args::parse_from(["tldsweep", "foo", "--workers", "3"]);
        let config: Config = toml::from_str("[probe]\nworkers = 8\ntimeout_secs = 4\n").unwrap();

        let probe = probe_config(&args, &config);
        assert_eq!(probe.worker_count, 3);
        assert_eq!(probe.probe_timeout, Some(Duration::from_secs(4)));
    }

    #[test]
    fn test_tlds_flag_splits_on_commas() {
        let args = Args::parse_from(["tldsweep", "foo", "--tlds", "io,dev,org"]);
        assert_eq!(args.tlds, Some(tlds(&["io", "dev", "org"])));
        assert_eq!(args.tld_list_url, IANA_TLD_LIST_URL);
    }
}
