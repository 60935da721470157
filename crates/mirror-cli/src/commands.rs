//! Command implementations

use std::path::PathBuf;
use std::time::Duration;

use colored::Colorize;
use mirror_core::{Mirror, Policy, SessionConfig, WalkOptions, WalkReport};

use crate::cli::Cli;
use crate::error::Result;

/// Build one session from the global CLI options.
pub fn build_session(cli: &Cli) -> Result<Mirror> {
    let cache_dir = if cli.no_cache {
        None
    } else {
        cli.cache_dir.clone()
    };
    let config = SessionConfig {
        cache_dir,
        ttl: Duration::from_secs(cli.ttl),
        raw_download: !cli.api_download,
        ..SessionConfig::default()
    };
    Ok(Mirror::connect(config, cli.token.clone())?)
}

pub fn run_status(
    session: &Mirror,
    reference: &str,
    local: PathBuf,
    branch: Option<String>,
) -> Result<()> {
    let policy = Policy::ReadOnly;
    let report = session.walk(
        &policy.hooks(),
        &policy.effects(),
        &WalkOptions {
            reference: Some(reference.to_string()),
            branch,
            local_root: Some(local),
        },
    )?;
    print_report(reference, &report, true);
    Ok(())
}

pub fn run_pull(
    session: &Mirror,
    reference: &str,
    local: PathBuf,
    branch: Option<String>,
    overwrite: bool,
) -> Result<()> {
    let policy = if overwrite {
        Policy::WriteOverwrite
    } else {
        Policy::Write
    };
    let report = session.walk(
        &policy.hooks(),
        &policy.effects(),
        &WalkOptions {
            reference: Some(reference.to_string()),
            branch,
            local_root: Some(local),
        },
    )?;
    print_report(reference, &report, !overwrite);
    Ok(())
}

pub fn run_repos(session: &Mirror, user: &str, page: Option<u32>) -> Result<()> {
    let repos = session.user_repositories(Some(user), page)?;
    for repo in &repos {
        let mut line = format!(
            "{}  {}",
            repo.name.green().bold(),
            repo.default_branch.cyan()
        );
        if repo.fork {
            line.push_str(&format!("  {}", "(fork)".dimmed()));
        }
        if let Some(language) = &repo.language {
            line.push_str(&format!("  {language}"));
        }
        println!("{line}");
        if let Some(description) = &repo.description {
            println!("    {}", description.dimmed());
        }
    }
    println!("{} repositories", repos.len());
    Ok(())
}

pub fn run_info(session: &Mirror, reference: &str) -> Result<()> {
    let info = session.repository_info(Some(reference))?;
    println!("{}", info.full_name.green().bold());
    if let Some(description) = &info.description {
        println!("  {description}");
    }
    println!("  default branch: {}", info.default_branch.cyan());
    if let Some(language) = &info.language {
        println!("  language: {language}");
    }
    println!("  forks: {}  watchers: {}", info.forks_count, info.watchers);
    Ok(())
}

pub fn run_branches(session: &Mirror, reference: &str) -> Result<()> {
    let branches = session.branches(Some(reference))?;
    for branch in &branches {
        println!(
            "{}  {}",
            branch.short_name().green(),
            branch.object.sha.dimmed()
        );
    }
    Ok(())
}

fn print_report(reference: &str, report: &WalkReport, conflicts_pending: bool) {
    println!(
        "{}: {} matched, {} missing or new, {} {}",
        reference.bold(),
        report.stats.matched.to_string().green(),
        report.stats.missing_or_new.to_string().yellow(),
        report.stats.conflicts.to_string().red(),
        if conflicts_pending {
            "conflicts"
        } else {
            "conflicts resolved"
        }
    );
    for entry_error in &report.entry_errors {
        eprintln!(
            "{}: {}: {}",
            "warning".yellow().bold(),
            entry_error.path,
            entry_error.message
        );
    }
    if let Some(secs) = report.rate_limit_reset_secs {
        println!("{}", format!("rate limit resets in {secs}s").dimmed());
    }
}
