use std::sync::Arc;

use anyhow::{Context, Result};
use backlink_checker::args::{CheckArgs, Command, ServeArgs};
use backlink_checker::checker::{check_domain, render_summary};
use backlink_checker::config::Settings;
use backlink_checker::filter::EntryFilter;
use backlink_checker::server::{self, AppState};
use backlink_checker::utils::setup_logging;
use backlink_checker::{Args, BacklinkSource, FileSource, SeRankingClient};
use clap::Parser;

async fn run_check(settings: &Settings, check: &CheckArgs) -> Result<()> {
    let source: Box<dyn BacklinkSource> = match &check.input {
        Some(path) => Box::new(FileSource::new(path)),
        None => Box::new(SeRankingClient::new(settings)?),
    };

    let limit = check.limit.unwrap_or(settings.cli_limit);
    let summary = check_domain(source.as_ref(), &check.domain, limit)
        .await
        .context("Failed to fetch backlink data")?;

    if check.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let mut filter = EntryFilter {
        link_type: check.link_type,
        sort: check.sort,
        limit: Some(check.top),
        ..Default::default()
    };
    if let Some(pattern) = &check.search {
        filter = filter.with_search(pattern)?;
    }

    print!("{}", render_summary(&summary, &filter));
    Ok(())
}

async fn run_serve(settings: &Settings, serve: &ServeArgs) -> Result<()> {
    let source: Option<Arc<dyn BacklinkSource>> = match settings.token() {
        Some(_) => Some(Arc::new(SeRankingClient::new(settings)?)),
        None => None,
    };

    let host = serve.host.as_deref().unwrap_or(&settings.server_host);
    let port = serve.port.unwrap_or(settings.server_port);
    server::serve(AppState::new(source, settings.web_limit), host, port).await
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose);
    args.validate()?;

    let settings =
        Settings::new(args.config.as_deref()).context("Failed to load configuration")?;

    match &args.command {
        Command::Check(check) => run_check(&settings, check).await,
        Command::Serve(serve) => run_serve(&settings, serve).await,
    }
}
