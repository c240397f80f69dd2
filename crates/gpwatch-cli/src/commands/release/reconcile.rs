//! Reconcile command implementation.

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use colored::Colorize;
use tracing::debug;

use gpwatch_core::traits::{ChangeRequests, DocumentSource, NewRequest, submit_updates};
use gpwatch_core::{ReleaseCycle, compute_updates};
use gpwatch_file::{DocumentFile, RequestDir, SnapshotFile, TrackerDocument};
use gpwatch_github::{ApiUrl, GithubClient, GithubRequests, RepoRef};

use crate::output;

use super::MatchRule;

#[derive(Args, Debug)]
pub struct ReconcileArgs {
    /// Path to the version snapshot JSON file
    #[arg(long)]
    pub snapshot: PathBuf,

    /// Local tracker document (defaults to fetching it from --repo)
    #[arg(long)]
    pub doc: Option<PathBuf>,

    /// Cycle matching rule
    #[arg(long = "match", value_enum, default_value = "version-prefix")]
    pub match_rule: MatchRule,

    /// Write pending requests into a local directory instead of GitHub
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Repository (owner/name) to open pull requests against
    #[arg(long)]
    pub repo: Option<String>,

    /// API token (falls back to the GITHUB_TOKEN environment variable)
    #[arg(long)]
    pub token: Option<String>,

    /// Tracker document path within the repository
    #[arg(long, default_value = "products/pan-gp.md")]
    pub doc_path: String,

    /// Base branch pull requests are opened against
    #[arg(long, default_value = "master")]
    pub base: String,

    /// API base URL
    #[arg(long, default_value = "https://api.github.com")]
    pub api_url: String,

    /// Compute and report without creating requests
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn run(args: ReconcileArgs) -> Result<()> {
    let records = SnapshotFile::new(&args.snapshot)
        .load()
        .await
        .context("Failed to load snapshot")?;

    let github = match &args.repo {
        Some(repo) => {
            let token = args
                .token
                .clone()
                .or_else(|| std::env::var("GITHUB_TOKEN").ok())
                .context("--repo requires --token or GITHUB_TOKEN")?;
            let api = ApiUrl::new(&args.api_url).context("Invalid API URL")?;
            let repo = RepoRef::new(repo).context("Invalid repository")?;
            Some(GithubRequests::new(
                GithubClient::new(api, token),
                repo,
                args.doc_path.clone(),
                args.base.clone(),
            ))
        }
        None => None,
    };

    let doc = match (&args.doc, &github) {
        (Some(path), _) => DocumentFile::new(path)
            .load()
            .await
            .context("Failed to load tracker document")?,
        (None, Some(gh)) => {
            let content = gh
                .fetch_document()
                .await
                .context("Failed to fetch tracker document")?;
            TrackerDocument::parse(content, &args.doc_path)?
        }
        (None, None) => bail!("--doc is required unless --repo is given"),
    };

    let backend: Box<dyn ChangeRequests> = match github {
        Some(gh) => Box::new(gh),
        None => match &args.output {
            Some(dir) => Box::new(RequestDir::new(dir)),
            None => bail!("either --repo or --output is required"),
        },
    };

    let open_requests: BTreeSet<ReleaseCycle> = backend
        .list_open()
        .await
        .context("Failed to list open requests")?
        .iter()
        .filter_map(|request| request.cycle())
        .collect();

    debug!(open = open_requests.len(), "collected open requests");

    let report = compute_updates(
        &records,
        &doc.entries(),
        &open_requests,
        args.match_rule.into(),
    );

    output::render_report(&report);

    if report.is_empty() {
        return Ok(());
    }

    if args.dry_run {
        eprintln!("{}", "Dry run; not creating requests.".dimmed());
        return Ok(());
    }

    // One request per cycle, each patching only its own block.
    let requests: Vec<NewRequest> = report
        .proposals
        .iter()
        .map(|update| {
            let (content, _) = doc.apply(std::slice::from_ref(update));
            NewRequest::for_update(update, content)
        })
        .collect();

    let results = submit_updates(backend.as_ref(), requests).await;
    output::render_submissions(&results);

    Ok(())
}
