use std::sync::Arc;

use clap::{ArgMatches, CommandFactory, FromArgMatches};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::app;
use crate::args::{Command, MonitorArgs};
use crate::error::{AppError, AppResult, ValidationError};
use crate::http::Prober;
use crate::monitor::Monitor;
use crate::notify::{Notifier, Subscription};
use crate::store::{MemoryStore, ResultStore, SqliteStore};

pub(crate) fn run() -> AppResult<()> {
    let (mut args, matches) = parse_args()?;

    crate::logger::init_logging(args.verbose);
    apply_config(&mut args, &matches)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(args))
}

fn parse_args() -> AppResult<(MonitorArgs, ArgMatches)> {
    let matches = MonitorArgs::command().get_matches();
    let args = MonitorArgs::from_arg_matches(&matches)?;
    Ok((args, matches))
}

fn apply_config(args: &mut MonitorArgs, matches: &ArgMatches) -> AppResult<()> {
    if let Some(config) = crate::config::load_config(args.config.as_deref())? {
        crate::config::apply_config(args, matches, &config)?;
    }
    Ok(())
}

async fn run_async(args: MonitorArgs) -> AppResult<()> {
    let store = open_store(&args).await?;
    let prober = Prober::with_timeout(args.request_timeout)?;
    let (notifier, fan_out) = Notifier::spawn(args.event_capacity);
    let event_printer = args
        .events
        .then(|| spawn_event_printer(notifier.subscribe()));
    let monitor = Monitor::new(prober, store, notifier, args.load_defaults());

    let result = dispatch(&monitor, &args).await;

    // Fan-out drains and exits once the last notifier is gone; the printer
    // follows when its subscription closes.
    drop(monitor);
    fan_out.await?;
    if let Some(printer) = event_printer {
        printer.await?;
    }
    result
}

async fn open_store(args: &MonitorArgs) -> AppResult<Arc<dyn ResultStore>> {
    let limits = args.store_limits();
    match args.db.as_deref() {
        Some(path) => {
            debug!("Using SQLite history at {}", path.display());
            Ok(Arc::new(SqliteStore::open(path, limits).await?))
        }
        None => Ok(Arc::new(MemoryStore::new(limits))),
    }
}

fn spawn_event_printer(mut subscription: Subscription) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = subscription.events.recv().await {
            eprintln!("{}", String::from_utf8_lossy(&event));
        }
    })
}

async fn dispatch(monitor: &Monitor, args: &MonitorArgs) -> AppResult<()> {
    match &args.command {
        Command::Test(test) => {
            info!("Running quick probe against {}", test.url);
            let outcome = monitor.run_quick_probe(&test.url).await?;
            app::print_outcome(&outcome, args.output)
        }
        Command::Load(load) => {
            let summary = monitor
                .run_load(&load.url, load.requests, load.concurrency)
                .await?;
            app::print_summary(&summary, args.output)
        }
        Command::Results(list) => {
            let outcomes = monitor.list_outcomes(list.limit).await?;
            app::print_outcomes(&outcomes, args.output)
        }
        Command::LoadResults(list) => {
            let summaries = monitor.list_summaries(list.limit).await?;
            app::print_summaries(&summaries, args.output)
        }
        Command::LoadResult(lookup) => match monitor.get_summary(&lookup.id).await? {
            Some(summary) => app::print_summary(&summary, args.output),
            None => {
                tracing::error!("No load test with id '{}'.", lookup.id);
                Err(AppError::validation(ValidationError::SummaryNotFound {
                    id: lookup.id.clone(),
                }))
            }
        },
    }
}
