// # zonesync - Declarative DNS Zone Synchronization
//
// Thin integration layer over zonesync-core:
// 1. Parse arguments and read credentials from the environment
// 2. Build the provider/resolver backends
// 3. Drive the core pipeline (load -> list -> reconcile -> apply)
//
// All sync logic lives in zonesync-core; this binary only wires it up and
// renders its output.

mod cli;
mod display;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use zonesync_core::records_file;
use zonesync_core::store::RecordStore;
use zonesync_core::{reconcile, MutationEngine, MutationEvent, ZoneApi};
use zonesync_provider_azure::AzureZoneApi;
use zonesync_resolver::LiveResolver;

use crate::cli::{Cli, Command, ImportArgs, ProviderOpts, SnapshotArgs, SyncArgs};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Sync(args) => run_sync(args).await,
        Command::Import(args) => run_import(args).await,
        Command::Snapshot(args) => run_snapshot(args).await,
    };

    if let Err(err) = result {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

fn zone_api(provider: &ProviderOpts) -> Result<Arc<AzureZoneApi>> {
    let api = AzureZoneApi::new(&provider.access_token, &provider.subscription_id)
        .context("cannot build Azure client")?;
    Ok(Arc::new(api))
}

async fn list_remote(api: &AzureZoneApi, provider: &ProviderOpts) -> Result<RecordStore> {
    let record_sets = api
        .list_all(&provider.resource_group, &provider.zone)
        .await
        .with_context(|| format!("cannot list zone {}", provider.zone))?;
    let store = RecordStore::from_remote_record_sets(&record_sets)
        .context("cannot normalize the zone listing")?;
    Ok(store)
}

async fn run_sync(args: SyncArgs) -> Result<()> {
    let local = records_file::load_records_file(&args.records_file)
        .with_context(|| format!("cannot load {}", args.records_file.display()))?;

    let api = zone_api(&args.provider)?;
    let remote = list_remote(&api, &args.provider).await?;

    let plan = reconcile(&local, &remote);
    if plan.is_empty() {
        println!("records are in sync");
        return Ok(());
    }

    println!("{}", display::render_plan(&plan));

    if !args.apply {
        println!(
            "dry run: {} unit(s) of work computed; pass --apply to execute",
            plan.total_units()
        );
        return Ok(());
    }

    let (engine, mut events) = MutationEngine::new(
        api.clone(),
        args.provider.resource_group.clone(),
        args.provider.zone.clone(),
    );

    // Progress goes to stdout as the serialized queue drains.
    let progress = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                MutationEvent::Started { total_units } => {
                    println!("applying {total_units} unit(s) of work");
                }
                MutationEvent::Submitted {
                    path,
                    record_type,
                    completed_units,
                    total_units,
                } => {
                    println!("applied {path} {record_type} ({completed_units}/{total_units})");
                }
                MutationEvent::Completed { total_units } => {
                    println!("done ({total_units}/{total_units})");
                }
            }
        }
    });

    let outcome = engine.apply(&local, &plan).await;
    drop(engine); // closes the event channel so the printer terminates
    let _ = progress.await;

    outcome.context("sync failed; already-applied changes are not rolled back")?;
    Ok(())
}

async fn run_import(args: ImportArgs) -> Result<()> {
    let api = zone_api(&args.provider)?;
    let remote = list_remote(&api, &args.provider).await?;

    let header = format!("records imported from zone {}", args.provider.zone);
    records_file::write_records_file(&args.records_file, &remote, &[&header])
        .with_context(|| format!("cannot write {}", args.records_file.display()))?;

    println!(
        "imported {} record set(s) into {}",
        remote.len(),
        args.records_file.display()
    );
    Ok(())
}

async fn run_snapshot(args: SnapshotArgs) -> Result<()> {
    let resolver = match args.nameserver {
        Some(address) => LiveResolver::with_nameserver(address),
        None => LiveResolver::from_system().context("cannot build system resolver")?,
    };

    let store = zonesync_core::snapshot_from_dns(&resolver, &args.zone, &args.paths, args.ttl)
        .await
        .with_context(|| format!("snapshot of zone {} failed", args.zone))?;

    let header = format!("records snapshotted from live DNS for zone {}", args.zone);
    records_file::write_records_file(&args.records_file, &store, &[&header])
        .with_context(|| format!("cannot write {}", args.records_file.display()))?;

    println!(
        "snapshotted {} record set(s) into {}",
        store.len(),
        args.records_file.display()
    );
    Ok(())
}
