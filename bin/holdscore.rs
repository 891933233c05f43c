use std::io::BufRead;
use std::sync::Arc;

use anyhow::Context;
use jemallocator::Jemalloc;
use log::{error, info, LevelFilter};
use simple_logger::SimpleLogger;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use holdscore::{render, Leaderboard, RefreshScheduler, RpcChainReader, ScoreService, Settings};

type Service = ScoreService<RpcChainReader, Leaderboard>;

#[tokio::main()]
async fn main() -> anyhow::Result<()> {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .init()
        .context("Failed to initialise logger")?;

    // Load configuration
    let settings = Settings::new().context(
        "Failed to load configuration. Provide config.yaml or HOLDSCORE__* environment variables",
    )?;

    let reader = RpcChainReader::new(&settings.chain).context("Failed to create chain reader")?;
    let store = Leaderboard::connect(&settings.store)
        .await
        .context("Failed to initialize leaderboard store")?;

    let service = Arc::new(
        ScoreService::new(reader, store, &settings.chain)
            .with_leaderboard_size(settings.refresh.top_n),
    );

    run(settings, service).await
}

async fn run(settings: Settings, service: Arc<Service>) -> anyhow::Result<()> {
    let cancellation_token = CancellationToken::new();

    let scheduler = RefreshScheduler::new(service.clone(), settings.refresh.clone());
    let cron_token = cancellation_token.child_token();
    let cron_handle = tokio::spawn(async move {
        if let Err(e) = scheduler.run(cron_token).await {
            error!("Cron scheduler failed: {:#}", e);
        }
    });

    info!("Leaderboard refresh started");

    let display_handle = tokio::spawn(display(service.clone(), cancellation_token.child_token()));
    let input_handle = tokio::spawn(read_addresses(service.clone(), cancellation_token.child_token()));

    #[cfg(unix)]
    let mut sigterm_stream = {
        use tokio::signal::unix::{signal, SignalKind};
        signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?
    };

    info!("Type an address and press Enter. Press Ctrl+C to stop.");

    #[cfg(unix)]
    {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal (Ctrl+C), exiting gracefully...");
            },
            _ = sigterm_stream.recv() => {
                info!("Received SIGTERM, exiting gracefully...");
            },
        };
    }

    #[cfg(not(unix))]
    {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal (Ctrl+C), exiting gracefully...");
            },
        };
    }

    cancellation_token.cancel();

    info!("Waiting for cron scheduler to stop...");
    let _ = cron_handle.await;
    let _ = display_handle.await;
    let _ = input_handle.await;

    info!("Stopped");
    Ok(())
}

/// Stdin is read on a dedicated thread so shutdown never waits on it.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);

    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.blocking_send(line).is_err() {
                        break;
                    }
                },
                Err(e) => {
                    error!("Failed to read input: {}", e);
                    break;
                },
            }
        }
    });

    rx
}

/// Each line is one submission. Submissions run concurrently.
async fn read_addresses(service: Arc<Service>, cancellation_token: CancellationToken) {
    let mut lines = spawn_stdin_reader();

    loop {
        let input = tokio::select! {
            _ = cancellation_token.cancelled() => break,
            line = lines.recv() => line,
        };

        let Some(input) = input else {
            info!("Input closed; leaderboard refresh keeps running");
            break;
        };

        let service = service.clone();
        tokio::spawn(async move {
            service.submit(&input).await;
        });
    }
}

/// Print every state and leaderboard change.
async fn display(service: Arc<Service>, cancellation_token: CancellationToken) {
    let mut state_rx = service.subscribe_state();
    let mut leaderboard_rx = service.subscribe_leaderboard();

    loop {
        tokio::select! {
            _ = cancellation_token.cancelled() => break,
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = state_rx.borrow_and_update().clone();
                println!("{}\n", render::state(&state));
            },
            changed = leaderboard_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let entries = leaderboard_rx.borrow_and_update().clone();
                println!("{}\n", render::leaderboard(&entries));
            },
        }
    }
}
