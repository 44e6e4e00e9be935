use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use repadmin::clap_parser::Args;
use repadmin::dispatcher::CheckDispatcher;
use repadmin::report_writer::report_writer::ReportWriter;
use repadmin::server_provider::server_provider::ServerProvider;
use repadmin::settings_provider::settings_provider::{
    CONFIRM_DELAY_SECS, DEADLINE_SECS, MAX_CONCURRENCY,
};
use std::process;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        eprintln!("{}", format!("{:#}", e).red());
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let mut server_provider = ServerProvider::new(&args.inventory).await?;

    let settings = server_provider.settings_provider();
    if let Some(secs) = args.confirm_delay {
        settings.set_key(CONFIRM_DELAY_SECS, secs.to_string());
    }
    if let Some(secs) = args.deadline {
        settings.set_key(DEADLINE_SECS, secs.to_string());
    }
    if let Some(max) = args.max_concurrency {
        settings.set_key(MAX_CONCURRENCY, max.to_string());
    }

    let topology = server_provider.build_topology().await?;
    let dispatcher = CheckDispatcher::new(topology);
    let Some(report) = dispatcher.run(&args.requested_checks(), args.lag_only).await else {
        return Ok(());
    };
    info!(checks = report.checks.len(), "Run finished");

    let writer = ReportWriter {
        format: args.format,
        expand: args.expand,
        suppress_stdout: args.no_stdout,
        output_file: args.output,
        append: args.append,
    };
    writer.write(&report).await
}
