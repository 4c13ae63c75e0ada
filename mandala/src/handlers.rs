use anyhow::Context;
use clap::ArgMatches;
use colored::Colorize;
use mandala_core::report::{ReportFormat, generate_graph_report, generate_route_report};
use mandala_core::{CrawlOptions, PathOptions, execute_crawl, find_path};
use mandala_scanner::{CrawlResult, Graph};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use url::Url;

// Helper functions for crawl and route handlers

/// Parse a seed address, trying to add https:// if needed
pub fn parse_seed(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    if let Ok(url) = Url::parse(line)
        && url.has_host()
    {
        return Some(line.to_string());
    }

    let with_scheme = format!("https://{}", line);
    if Url::parse(&with_scheme).is_ok() {
        return Some(with_scheme);
    }

    None
}

/// Build crawl options from the arguments shared by `crawl` and `route`
pub fn crawl_options_from_args(args: &ArgMatches, show_progress_bars: bool) -> CrawlOptions {
    CrawlOptions {
        seed: args.get_one::<String>("url").and_then(|u| parse_seed(u)),
        timeout_secs: args
            .get_one::<u64>("timeout")
            .copied()
            .unwrap_or(mandala_scanner::source::DEFAULT_TIMEOUT_SECS),
        max_documents: args.get_one::<usize>("max-documents").copied(),
        show_progress_bars,
    }
}

/// Work out the target node id from either `--to` or `--provider`/`--extension`
pub fn resolve_target(
    graph: &Graph,
    to: Option<&str>,
    provider: Option<&str>,
    extension: Option<&str>,
) -> Result<String, String> {
    if let Some(id) = to {
        return Ok(id.to_string());
    }

    match (provider, extension) {
        (Some(provider), Some(extension)) => graph
            .find_extension(provider, extension)
            .map(|node| node.id.clone())
            .ok_or_else(|| {
                format!(
                    "Provider '{}' does not advertise extension '{}'",
                    provider, extension
                )
            }),
        _ => Err("Either --to or --provider with --extension must be provided".to_string()),
    }
}

/// Write `report` to `output` (with `~` expanded), or to stdout when no path is given
pub fn write_report(report: &str, output: Option<&PathBuf>) -> anyhow::Result<Option<PathBuf>> {
    let Some(output) = output else {
        print!("{}", report);
        return Ok(None);
    };

    let expanded = shellexpand::tilde(&output.to_string_lossy()).into_owned();
    let path = Path::new(&expanded).to_path_buf();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(&path, report).with_context(|| format!("Failed to write report to {}", path.display()))?;
    Ok(Some(path))
}

fn report_format(args: &ArgMatches) -> ReportFormat {
    args.get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Text)
}

// Status lines go to stderr; stdout carries only the report.

fn print_divider() {
    eprintln!("{}", "═".repeat(60).bright_blue().bold());
}

fn print_crawl_summary(result: &CrawlResult) {
    print_divider();
    eprintln!(
        "{} {} documents, {} providers, {} extensions",
        "✓ Crawl complete:".green().bold(),
        result.fetched.len(),
        result.graph.providers().count(),
        result.graph.extensions().count()
    );
    if !result.failures.is_empty() {
        eprintln!(
            "{} {} addresses could not be used",
            "⚠".yellow().bold(),
            result.failures.len()
        );
    }
    if result.truncated {
        eprintln!("{} address budget reached, crawl is partial", "⚠".yellow().bold());
    }
    print_divider();
}

/// Runs the crawl described by `args`. Exits the process when the crawl
/// cannot be set up; returns `None` when no seed address was given.
async fn run_crawl(args: &ArgMatches, quiet: bool) -> Option<CrawlResult> {
    let options = crawl_options_from_args(args, !quiet);

    if let Some(raw) = args.get_one::<String>("url")
        && options.seed.is_none()
    {
        eprintln!("✗ '{}' is not a valid address", raw);
        std::process::exit(1);
    }

    if !quiet && let Some(ref seed) = options.seed {
        eprintln!("\n🕸  Crawling from {}", seed);
        eprintln!("Timeout: {}s per document", options.timeout_secs);
        if let Some(max) = options.max_documents {
            eprintln!("Budget: {} addresses", max);
        }
        eprintln!();
    }

    let progress_callback = Arc::new(|address: String| {
        tracing::debug!("fetching {}", address);
    });

    match execute_crawl(options, Some(progress_callback)).await {
        Ok(Some(result)) => {
            if !quiet {
                print_crawl_summary(&result);
            }
            Some(result)
        }
        Ok(None) => {
            println!("No seed address given (--url); nothing to crawl.");
            None
        }
        Err(e) => {
            eprintln!("✗ Crawl failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn emit(report: &str, args: &ArgMatches) {
    match write_report(report, args.get_one::<PathBuf>("output")) {
        Ok(Some(path)) => eprintln!("{} {}", "Report saved to".green(), path.display()),
        Ok(None) => {}
        Err(e) => {
            eprintln!("✗ {:#}", e);
            std::process::exit(1);
        }
    }
}

pub async fn handle_crawl(args: &ArgMatches, quiet: bool) {
    let Some(result) = run_crawl(args, quiet).await else {
        return;
    };

    match generate_graph_report(&result, report_format(args)) {
        Ok(report) => emit(&report, args),
        Err(e) => {
            eprintln!("✗ Failed to render report: {}", e);
            std::process::exit(1);
        }
    }
}

pub async fn handle_route(args: &ArgMatches, quiet: bool) {
    let Some(result) = run_crawl(args, quiet).await else {
        return;
    };
    let graph = &result.graph;

    let from = args.get_one::<String>("from").map(String::as_str).unwrap_or_default();
    let target = match resolve_target(
        graph,
        args.get_one::<String>("to").map(String::as_str),
        args.get_one::<String>("provider").map(String::as_str),
        args.get_one::<String>("extension").map(String::as_str),
    ) {
        Ok(target) => target,
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    };

    if from == target {
        println!("Start and target are the same node; there is nothing to dial.");
        return;
    }

    let options = PathOptions {
        max_provider_hops: args
            .get_one::<usize>("max-provider-hops")
            .copied()
            .unwrap_or(mandala_core::DEFAULT_MAX_PROVIDER_HOPS),
    };
    let path = find_path(graph, from, &target, &options);

    match generate_route_report(graph, from, &target, path.as_ref(), report_format(args)) {
        Ok(report) => emit(&report, args),
        Err(e) => {
            eprintln!("✗ Failed to render report: {}", e);
            std::process::exit(1);
        }
    }
}
