// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use anyhow::Context;
use clap::Parser;
use harvestr::application::publisher::Publisher;
use harvestr::cli::{Cli, Command};
use harvestr::config::settings::Settings;
use harvestr::domain::repositories::article_repository::ArticleRepository;
use harvestr::engines::reqwest_engine::ReqwestFetcher;
use harvestr::engines::scrape_engine::ScrapeEngine;
use harvestr::infrastructure::cache::redis_client::RedisClient;
use harvestr::infrastructure::metrics::init_metrics;
use harvestr::infrastructure::repositories::article_repo_impl::ArticleRepositoryImpl;
use harvestr::queue::task_queue::{RedisTaskQueue, TaskQueue};
use harvestr::utils::telemetry;
use harvestr::workers::scrape_worker::ScrapeWorker;
use harvestr::workers::worker::Worker;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// 主函数
///
/// 初始化日志和配置后执行子命令
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_telemetry();
    let cli = Cli::parse();

    let settings = Settings::new().context("failed to load configuration")?;
    info!("Configuration loaded");

    match cli.command {
        Command::Worker => run_worker(settings).await,
        Command::Publish { file } => {
            let publisher = Publisher::new(Arc::new(connect_queue(&settings)?));
            let report = publisher.publish_from_file(&file).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Command::Stats => {
            let worker = build_worker(&settings).await?;
            let stats = worker.stats().await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
            Ok(())
        }
        Command::Recent { limit } => {
            let repository = ArticleRepositoryImpl::connect(&settings.database)
                .await
                .context("failed to connect to database")?;
            let articles = repository.recent(limit).await?;
            println!("{}", serde_json::to_string_pretty(&articles)?);
            Ok(())
        }
        Command::ClearQueue => {
            let queue = connect_queue(&settings)?;
            queue.clear().await?;
            println!("Cleared queue {}", queue.queue_name());
            Ok(())
        }
    }
}

fn connect_queue(settings: &Settings) -> anyhow::Result<RedisTaskQueue> {
    let client = RedisClient::new(&settings.redis.url).context("invalid Redis URL")?;
    Ok(RedisTaskQueue::new(client, settings.redis.queue_name.clone()))
}

async fn build_worker(
    settings: &Settings,
) -> anyhow::Result<ScrapeWorker<RedisTaskQueue, ArticleRepositoryImpl>> {
    let queue = connect_queue(settings)?;
    queue.ping().await.context("Redis is not reachable")?;

    let repository = ArticleRepositoryImpl::connect(&settings.database)
        .await
        .context("failed to connect to database")?;

    let fetcher = ReqwestFetcher::new(&settings.scraping.user_agent)
        .context("failed to build HTTP client")?;
    let engine = ScrapeEngine::new(Arc::new(fetcher), &settings.scraping)?;

    Ok(ScrapeWorker::new(
        Arc::new(queue),
        Arc::new(repository),
        Arc::new(engine),
        settings.redis.pop_timeout(),
    ))
}

async fn run_worker(settings: Settings) -> anyhow::Result<()> {
    init_metrics(&settings.metrics);

    let worker = build_worker(&settings).await?;
    let shutdown = CancellationToken::new();

    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_token.cancel();
    });

    info!(queue = %settings.redis.queue_name, "Starting {}", worker.name());
    let summary = worker.run(shutdown).await?;
    info!(
        attempted = summary.attempted,
        processed = summary.processed,
        "Worker finished"
    );
    Ok(())
}

/// Ctrl-C 或 SIGTERM 到达时返回
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("Shutdown signal received, finishing current task");
}
