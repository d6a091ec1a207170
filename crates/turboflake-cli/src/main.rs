#![doc = include_str!("../README.md")]

mod config;
mod telemetry;

use std::{
    io::{self, BufWriter, Write},
    pin::pin,
};

use anyhow::bail;
use clap::Parser;
use config::{CliArgs, CliConfig, Mode};
use futures::StreamExt;
use telemetry::init_telemetry;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use turboflake::{
    CancellableSleep, InterruptibleSleep, Sonyflake, SonyflakeBuilder, SonyflakeId, TokioSleep,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = CliConfig::try_from(args)?;

    init_telemetry()?;

    let token = CancellationToken::new();
    let watcher = tokio::spawn(cancel_on_ctrl_c(token.clone()));

    let res = match config.mode {
        Mode::Blocking => run_blocking(config, token).await,
        Mode::Async => run_async(config, token).await,
    };

    watcher.abort();
    res
}

fn builder(config: &CliConfig) -> SonyflakeBuilder {
    let builder = Sonyflake::builder().machine_ids(config.machine_ids.iter().copied());
    match config.epoch {
        Some(secs) => builder.epoch_secs(secs),
        None => builder,
    }
}

async fn run_blocking(config: CliConfig, token: CancellationToken) -> anyhow::Result<()> {
    let sleep = InterruptibleSleep::new();
    let interrupter = sleep.interrupter();
    let sf = builder(&config).blocking_sleep(sleep).build()?;
    log_startup_info(&sf, &config);

    // A blocked thread cannot observe the token, so wake it explicitly.
    let interrupt = {
        let token = token.clone();
        tokio::spawn(async move {
            token.cancelled().await;
            interrupter.interrupt();
        })
    };

    let res = tokio::task::spawn_blocking(move || generate_blocking(&sf, &config, &token)).await?;
    interrupt.abort();
    res
}

fn generate_blocking(
    sf: &Sonyflake,
    config: &CliConfig,
    token: &CancellationToken,
) -> anyhow::Result<()> {
    let mut out = BufWriter::new(io::stdout().lock());

    if config.batch {
        for id in sf.next_n(config.count)? {
            write_id(&mut out, id, config.decompose)?;
        }
    } else {
        for id in sf.iter().take(config.count) {
            if token.is_cancelled() {
                bail!("aborted by Ctrl+C");
            }
            write_id(&mut out, id?, config.decompose)?;
        }
    }

    out.flush()?;
    Ok(())
}

async fn run_async(config: CliConfig, token: CancellationToken) -> anyhow::Result<()> {
    let sf = builder(&config)
        .sleep_provider(CancellableSleep::new(TokioSleep, token.clone()))
        .build()?;
    log_startup_info(&sf, &config);

    let mut out = BufWriter::new(io::stdout());

    if config.batch {
        for id in sf.next_n_async(config.count).await? {
            write_id(&mut out, id, config.decompose)?;
        }
    } else {
        let mut ids = pin!(sf.stream()?.take(config.count));
        while let Some(id) = ids.next().await {
            if token.is_cancelled() {
                bail!("aborted by Ctrl+C");
            }
            write_id(&mut out, id?, config.decompose)?;
        }
    }

    out.flush()?;
    Ok(())
}

fn write_id(out: &mut impl Write, id: SonyflakeId, decompose: bool) -> io::Result<()> {
    if decompose {
        writeln!(
            out,
            "{id} {} {} {}",
            id.timestamp(),
            id.machine_id(),
            id.sequence()
        )
    } else {
        writeln!(out, "{id}")
    }
}

fn log_startup_info(sf: &Sonyflake, config: &CliConfig) {
    if cfg!(debug_assertions) {
        tracing::info!("Generating {} IDs with full config: {:#?}", config.count, config);
    } else {
        tracing::info!(
            "Generating {} IDs ({:?}) with {}",
            config.count,
            config.mode,
            sf
        );
    }
}

async fn cancel_on_ctrl_c(token: CancellationToken) {
    match signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal, aborting...");
            token.cancel();
        }
        Err(e) => tracing::warn!("Failed to install Ctrl+C handler: {e}"),
    }
}
