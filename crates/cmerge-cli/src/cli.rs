use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use cmerge_rows::OptionKey;
use cmerge_types::{MemberId, PropertyId};

#[derive(Parser)]
#[command(
    name = "cmerge",
    about = "Resolve property conflicts when merging a cluster of duplicate records",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML file with merge settings
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show each mergeable property with its options and default choice
    Rows(ClusterArgs),
    /// Build the merged change-set without persisting it
    Commit(ResolveArgs),
    /// Build the change-set and submit it to an in-memory store
    Submit(ResolveArgs),
}

#[derive(Args)]
pub struct ClusterArgs {
    /// JSON file with `members` and `schemas`
    pub cluster: PathBuf,
}

#[derive(Args)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub cluster: ClusterArgs,

    /// Choose an option: PROPERTY=MEMBER or PROPERTY=combined
    #[arg(long = "select", value_parser = parse_selection)]
    pub selections: Vec<(PropertyId, OptionKey)>,

    /// Member the merged record is copied from (defaults to the first)
    #[arg(long)]
    pub base: Option<i64>,
}

impl ResolveArgs {
    pub fn base(&self) -> Option<MemberId> {
        self.base.map(MemberId::new)
    }
}

pub fn parse_selection(s: &str) -> Result<(PropertyId, OptionKey), String> {
    let (property, key) = s
        .split_once('=')
        .ok_or_else(|| format!("expected PROPERTY=KEY, got `{s}`"))?;
    let property = property
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("invalid property id `{property}`: {e}"))?;
    let key = key.parse::<OptionKey>().map_err(|e| e.to_string())?;
    Ok((PropertyId::new(property), key))
}
