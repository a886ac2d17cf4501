use anyhow::{Context, Result, bail};
use folio_core::{
    application::{dto::Audience, queries::media::MediaQueryService, unit_of_work::UnitOfWork},
    config::AppConfig,
    infrastructure::store,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const ORPHAN_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Apply pending migrations.
    Migrate,
    /// Exit non-zero when the store cannot be reached.
    Check,
    /// List media files owned by neither an article nor a project.
    Orphans,
}

impl Command {
    fn parse(arg: Option<&str>) -> Result<Self> {
        match arg {
            None | Some("migrate") => Ok(Self::Migrate),
            Some("check") => Ok(Self::Check),
            Some("orphans") => Ok(Self::Orphans),
            Some(other) => bail!("unknown command `{other}` (expected migrate, check or orphans)"),
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = bootstrap().await {
        tracing::error!(error = %err, "fatal error");
        eprintln!("fatal error: {err:#}");
        std::process::exit(1);
    }
}

async fn bootstrap() -> Result<()> {
    init_tracing();

    let arg = std::env::args().nth(1);
    let command = Command::parse(arg.as_deref())?;
    let config = AppConfig::from_env().context("loading configuration")?;

    let store = store::connect(&config, command == Command::Migrate)
        .await
        .context("connecting to the content store")?;

    match command {
        Command::Migrate => {
            tracing::info!(provider = %config.store_provider(), "store ready");
        }
        Command::Check => {
            if !UnitOfWork::new(Arc::clone(&store)).can_connect().await {
                bail!("store did not answer the liveness probe");
            }
            tracing::info!("store reachable");
        }
        Command::Orphans => report_orphans(MediaQueryService::new(store)).await?,
    }
    Ok(())
}

async fn report_orphans(media: MediaQueryService) -> Result<()> {
    let mut page = 1;
    let mut found = 0_u64;
    loop {
        let batch = media
            .orphaned_media(Audience::Staff, page, ORPHAN_PAGE_SIZE)
            .await?;
        for file in &batch.items {
            println!(
                "{}\t{}\t{}\t{}",
                file.id, file.uploaded_at, file.original_name, file.url
            );
        }
        found += batch.items.len() as u64;
        if u64::from(page) >= batch.total_pages {
            break;
        }
        page += 1;
    }
    tracing::info!(found, "orphaned media scan finished");
    Ok(())
}

fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG")
        .ok()
        .unwrap_or_else(|| "info,sqlx=warn".to_string());

    let subscriber = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(env_filter))
        .with(tracing_subscriber::fmt::layer());

    if subscriber.try_init().is_err() {
        tracing::warn!("tracing subscriber already initialised");
    }
}
