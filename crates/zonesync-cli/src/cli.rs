//! Command-line definitions

use clap::{Args, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "zonesync", version, about = "Declarative DNS zone synchronization")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Reconcile a records file against the hosted zone
    Sync(SyncArgs),
    /// Bootstrap a records file from the hosted zone's current contents
    Import(ImportArgs),
    /// Bootstrap a records file from live DNS resolution
    Snapshot(SnapshotArgs),
}

/// Provider connection options, shared by the commands that talk to Azure
#[derive(Debug, Args)]
pub struct ProviderOpts {
    /// ARM bearer token
    #[arg(long, env = "AZURE_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: String,

    /// Azure subscription the zone lives in
    #[arg(long, env = "AZURE_SUBSCRIPTION_ID")]
    pub subscription_id: String,

    /// Resource group containing the DNS zone
    #[arg(long)]
    pub resource_group: String,

    /// DNS zone name (e.g. example.com)
    #[arg(long)]
    pub zone: String,
}

#[derive(Debug, Args)]
pub struct SyncArgs {
    #[command(flatten)]
    pub provider: ProviderOpts,

    /// Declarative records file
    #[arg(long, value_name = "FILE")]
    pub records_file: PathBuf,

    /// Apply the computed plan (default: print it and stop)
    #[arg(long)]
    pub apply: bool,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    #[command(flatten)]
    pub provider: ProviderOpts,

    /// Records file to write
    #[arg(long, value_name = "FILE")]
    pub records_file: PathBuf,
}

#[derive(Debug, Args)]
pub struct SnapshotArgs {
    /// DNS zone name (e.g. example.com)
    #[arg(long)]
    pub zone: String,

    /// Record path to probe in addition to the zone apex (repeatable)
    #[arg(long = "path", value_name = "PATH")]
    pub paths: Vec<String>,

    /// Name server to query instead of the system resolver
    #[arg(long)]
    pub nameserver: Option<IpAddr>,

    /// TTL recorded for snapshotted entries
    #[arg(long, default_value_t = 3600)]
    pub ttl: u32,

    /// Records file to write
    #[arg(long, value_name = "FILE")]
    pub records_file: PathBuf,
}
