use anyhow::Context;
use colored::Colorize;
use cmerge_commit::ChangeSet;
use cmerge_rows::{MergeRow, SelectionState};
use cmerge_session::{MergeConfig, MergeSession};
use cmerge_store::InMemoryChangeSetStore;
use tracing::debug;

use crate::cli::*;
use crate::cluster::ClusterFile;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => MergeConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => MergeConfig::default(),
    };
    match cli.command {
        Command::Rows(args) => cmd_rows(&args, &config, &cli.format),
        Command::Commit(args) => cmd_commit(&args, &config, &cli.format),
        Command::Submit(args) => cmd_submit(&args, &config, &cli.format),
    }
}

fn open_session(args: &ClusterArgs, config: &MergeConfig) -> anyhow::Result<MergeSession> {
    let cluster = ClusterFile::load(&args.cluster)?;
    debug!(
        path = %args.cluster.display(),
        members = cluster.members.len(),
        schemas = cluster.schemas.len(),
        "cluster loaded"
    );
    Ok(MergeSession::open(cluster.members, cluster.schemas, config))
}

fn resolve(args: &ResolveArgs, config: &MergeConfig) -> anyhow::Result<MergeSession> {
    let session = open_session(&args.cluster, config)?;
    for (property, key) in &args.selections {
        session
            .select(*property, *key)
            .with_context(|| format!("selecting {key} for property {property}"))?;
    }
    if let Some(base) = args.base() {
        session.set_base(base)?;
    }
    Ok(session)
}

fn cmd_rows(args: &ClusterArgs, config: &MergeConfig, format: &OutputFormat) -> anyhow::Result<()> {
    let session = open_session(args, config)?;
    let rows = session.rows();
    let selection = session.selection();
    match format {
        OutputFormat::Json => {
            let out = serde_json::json!({ "rows": rows, "selection": selection });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => print_rows(&rows, &selection),
    }
    Ok(())
}

fn cmd_commit(args: &ResolveArgs, config: &MergeConfig, format: &OutputFormat) -> anyhow::Result<()> {
    let session = resolve(args, config)?;
    let change_set = session.preview()?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&change_set)?),
        OutputFormat::Text => print_change_set(&change_set),
    }
    Ok(())
}

fn cmd_submit(args: &ResolveArgs, config: &MergeConfig, format: &OutputFormat) -> anyhow::Result<()> {
    let session = resolve(args, config)?;
    let store = InMemoryChangeSetStore::new();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let receipt = runtime.block_on(session.submit(&store))?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&receipt)?),
        OutputFormat::Text => {
            println!("{} Merged record persisted as member {}", "✓".green().bold(), receipt.member.to_string().yellow());
            println!("  Instance values: {}", receipt.instance_values);
            println!("  Entity values: {}", receipt.entity_values);
        }
    }
    Ok(())
}

fn print_rows(rows: &[MergeRow], selection: &SelectionState) {
    if rows.is_empty() {
        println!("No mergeable properties.");
        return;
    }
    for row in rows {
        let status = if row.conflict { "conflict".red() } else { "agree".green() };
        println!("{} ({}) [{}]", row.property.name.bold(), row.property.id, status);
        let chosen = selection.get(row.property.id);
        for option in &row.options {
            let marker = if Some(option.key) == chosen { "*".yellow().bold() } else { " ".normal() };
            println!("  {} {:>9}  {}", marker, option.key.to_string().cyan(), option.label);
        }
    }
}

fn print_change_set(change_set: &ChangeSet) {
    println!("Merged record based on {}", change_set.member.name.bold());
    println!("  Content hash: {}", change_set.member.content_hash.short_hex().dimmed());
    if change_set.is_empty() {
        println!("  No property values.");
        return;
    }
    for v in &change_set.instance_values {
        println!("  {} property {} = {:?}", "instance".cyan(), v.property, v.value);
    }
    for v in &change_set.entity_values {
        println!("  {}   property {} = {:?}", "entity".blue(), v.property, v.value);
    }
}
