// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod mock_queue;

use harvestr::config::settings::{DatabaseSettings, ScrapingSettings, DEFAULT_USER_AGENT};
use harvestr::engines::reqwest_engine::ReqwestFetcher;
use harvestr::engines::scrape_engine::ScrapeEngine;
use harvestr::infrastructure::repositories::article_repo_impl::ArticleRepositoryImpl;
use harvestr::workers::scrape_worker::ScrapeWorker;
use mock_queue::MockTaskQueue;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const ARTICLE_PATH: &str = "/articles/rust";
pub const SLOW_PATH: &str = "/articles/slow";

/// 单连接的内存SQLite仓库，已执行迁移
pub async fn memory_repository() -> Arc<ArticleRepositoryImpl> {
    let settings = DatabaseSettings {
        url: "sqlite::memory:".to_string(),
        max_connections: Some(1),
        min_connections: None,
        connect_timeout: Some(5),
        idle_timeout: None,
        connect_attempts: 1,
        connect_retry_delay_ms: 10,
    };
    Arc::new(
        ArticleRepositoryImpl::connect(&settings)
            .await
            .expect("Failed to create in-memory repository"),
    )
}

pub fn article_html() -> String {
    let paragraph = "Ownership lets Rust make memory safety guarantees without a garbage collector. "
        .repeat(3);
    format!(
        "<html><head><title>Understanding Ownership</title></head>\
         <body><nav>Home</nav><article><h1>Ownership</h1><p>{paragraph}</p></article>\
         <script>track();</script></body></html>"
    )
}

/// 一个正常页面和一个总是超时的页面
pub async fn start_site() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ARTICLE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_string(article_html()),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(SLOW_PATH))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    server
}

pub fn fast_scraping_settings() -> ScrapingSettings {
    ScrapingSettings {
        timeout_secs: 1,
        max_retries: 2,
        delay_between_requests: 0.1,
        user_agent: DEFAULT_USER_AGENT.to_string(),
    }
}

pub struct Pipeline {
    pub queue: Arc<MockTaskQueue>,
    pub repository: Arc<ArticleRepositoryImpl>,
    pub worker: ScrapeWorker<MockTaskQueue, ArticleRepositoryImpl>,
    pub shutdown: CancellationToken,
}

/// 组装真实HTTP获取器、内存队列和内存SQLite的完整流程
pub async fn pipeline() -> Pipeline {
    let shutdown = CancellationToken::new();
    let queue = Arc::new(MockTaskQueue::new(shutdown.clone()));
    let repository = memory_repository().await;

    let settings = fast_scraping_settings();
    let fetcher = ReqwestFetcher::new(&settings.user_agent).expect("Failed to build client");
    let engine = ScrapeEngine::new(Arc::new(fetcher), &settings).expect("Failed to build engine");

    let worker = ScrapeWorker::new(
        queue.clone(),
        repository.clone(),
        Arc::new(engine),
        Duration::from_millis(100),
    );

    Pipeline {
        queue,
        repository,
        worker,
        shutdown,
    }
}
