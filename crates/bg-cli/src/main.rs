//! botgate CLI
//!
//! CLI tool for checking paths against robots.txt files.

mod policy;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::policy::{load_directory, verdict, DirectoryReport};

#[derive(Parser)]
#[command(name = "botgate")]
#[command(about = "robots.txt parser and access checker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether paths may be fetched by an agent
    Check {
        /// robots.txt file
        #[arg(short, long)]
        input: PathBuf,

        /// Crawler user-agent string
        #[arg(short, long, default_value = "*")]
        agent: String,

        /// HTTP status the file was fetched with
        #[arg(short, long)]
        status: Option<u16>,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,

        /// Paths to check
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Dump groups, host, sitemaps and diagnostics
    Info {
        /// robots.txt file
        #[arg(short, long)]
        input: PathBuf,

        /// HTTP status the file was fetched with
        #[arg(short, long)]
        status: Option<u16>,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print the crawl delay that applies to an agent
    Delay {
        /// robots.txt file
        #[arg(short, long)]
        input: PathBuf,

        /// Crawler user-agent string
        #[arg(short, long, default_value = "*")]
        agent: String,

        /// HTTP status the file was fetched with
        #[arg(short, long)]
        status: Option<u16>,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check {
            input,
            agent,
            status,
            json,
            paths,
        } => cmd_check(&input, &agent, status, json, &paths),
        Commands::Info {
            input,
            status,
            json,
        } => cmd_info(&input, status, json),
        Commands::Delay {
            input,
            agent,
            status,
        } => cmd_delay(&input, &agent, status),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn cmd_check(
    input: &Path,
    agent: &str,
    status: Option<u16>,
    json: bool,
    paths: &[String],
) -> Result<(), String> {
    let (directory, errors, _) = load_directory(input, status)?;
    if !errors.is_empty() {
        log::info!("{}: {} line(s) skipped", input.display(), errors.len());
    }

    let verdicts: Vec<_> = paths.iter().map(|path| verdict(&directory, path, agent)).collect();

    if json {
        let out = serde_json::to_string_pretty(&verdicts)
            .map_err(|e| format!("Failed to serialize results: {}", e))?;
        println!("{out}");
        return Ok(());
    }

    for v in &verdicts {
        let decision = if v.allowed { "ALLOW" } else { "DENY " };
        match &v.rule {
            Some(rule) => println!("{}  {}  [group {}, {}]", decision, v.path, v.group, rule),
            None => println!("{}  {}  [group {}, no rule]", decision, v.path, v.group),
        }
    }

    Ok(())
}

fn cmd_info(input: &Path, status: Option<u16>, json: bool) -> Result<(), String> {
    let (directory, errors, stats) = load_directory(input, status)?;
    let report = DirectoryReport::new(&directory, &errors, stats);

    if json {
        let out = serde_json::to_string_pretty(&report)
            .map_err(|e| format!("Failed to serialize report: {}", e))?;
        println!("{out}");
        return Ok(());
    }

    println!("robots.txt: {}", input.display());
    println!("  Size:        {} bytes, {} lines", report.stats.bytes, report.stats.lines);
    println!("  Parse time:  {:.3}ms", report.stats.parse_ms);
    println!("  Host:        {}", if report.host.is_empty() { "-" } else { report.host.as_str() });
    println!("  Groups:      {}", report.groups.len());
    println!("  Sitemaps:    {}", report.sitemaps.len());
    println!();

    for group in &report.groups {
        println!("User-agent: {}", group.agent);
        if let Some(delay) = group.crawl_delay_secs {
            println!("  crawl-delay  {delay}s");
        }
        for rule in &group.rules {
            let kind = if rule.pattern { "pattern" } else { "prefix" };
            println!("  {:<9}  {}  ({})", rule.action, rule.path, kind);
        }
        for clean in &group.clean_params {
            let scope = if clean.scope.is_empty() { "*" } else { clean.scope.as_str() };
            println!("  clean-param  {}  {}", clean.params.join("&"), scope);
        }
    }

    for sitemap in &report.sitemaps {
        println!("Sitemap: {sitemap}");
    }

    if !report.diagnostics.is_empty() {
        println!();
        println!("Diagnostics:");
        for diag in &report.diagnostics {
            println!("  {diag}");
        }
    }

    Ok(())
}

fn cmd_delay(input: &Path, agent: &str, status: Option<u16>) -> Result<(), String> {
    let (directory, _, _) = load_directory(input, status)?;
    let delay = directory.crawl_delay(agent);
    println!("{}", delay.as_secs_f64());
    Ok(())
}
