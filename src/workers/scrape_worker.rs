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

use async_trait::async_trait;
use futures::FutureExt;
use parking_lot::Mutex;
use serde::Serialize;
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::domain::models::article::Article;
use crate::domain::models::task::Task;
use crate::domain::repositories::article_repository::{ArticleRepository, ArticleStats};
use crate::engines::scrape_engine::ScrapeEngine;
use crate::infrastructure::metrics::{record_task, TaskOutcome};
use crate::queue::task_queue::TaskQueue;
use crate::utils::errors::WorkerError;
use crate::workers::worker::{Worker, WorkerSummary};

/// 队列出错后的等待时间
const QUEUE_ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// 工作器生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Running,
    Stopping,
    Stopped,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self {
            WorkerState::Idle => "idle",
            WorkerState::Running => "running",
            WorkerState::Stopping => "stopping",
            WorkerState::Stopped => "stopped",
        };
        f.write_str(state)
    }
}

/// 队列长度与存储统计
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkerStats {
    pub queue_length: u64,
    pub database: ArticleStats,
}

/// 抓取工作者
///
/// 从队列逐个取出任务，抓取后将结果写入文章仓库。
/// 每个出队的任务最终对应一条已完成或失败的文章记录。
pub struct ScrapeWorker<Q, R>
where
    Q: TaskQueue,
    R: ArticleRepository,
{
    queue: Arc<Q>,
    repository: Arc<R>,
    engine: Arc<ScrapeEngine>,
    pop_timeout: Duration,
    state: Mutex<WorkerState>,
    attempted: AtomicU64,
    processed: AtomicU64,
    worker_id: Uuid,
}

impl<Q, R> ScrapeWorker<Q, R>
where
    Q: TaskQueue,
    R: ArticleRepository,
{
    /// 创建新的抓取工作器实例
    ///
    /// # 参数
    ///
    /// * `queue` - 任务队列
    /// * `repository` - 文章仓库
    /// * `engine` - 抓取引擎
    /// * `pop_timeout` - 每次阻塞出队的最长等待时间
    pub fn new(
        queue: Arc<Q>,
        repository: Arc<R>,
        engine: Arc<ScrapeEngine>,
        pop_timeout: Duration,
    ) -> Self {
        Self {
            queue,
            repository,
            engine,
            pop_timeout,
            state: Mutex::new(WorkerState::Idle),
            attempted: AtomicU64::new(0),
            processed: AtomicU64::new(0),
            worker_id: Uuid::new_v4(),
        }
    }

    pub fn state(&self) -> WorkerState {
        *self.state.lock()
    }

    pub fn summary(&self) -> WorkerSummary {
        WorkerSummary {
            worker_id: self.worker_id,
            attempted: self.attempted.load(Ordering::Relaxed),
            processed: self.processed.load(Ordering::Relaxed),
        }
    }

    /// 汇总队列长度和存储统计
    pub async fn stats(&self) -> Result<WorkerStats, WorkerError> {
        Ok(WorkerStats {
            queue_length: self.queue.length().await?,
            database: self.repository.stats().await?,
        })
    }

    fn set_state(&self, state: WorkerState) {
        *self.state.lock() = state;
    }

    /// 处理一个出队的任务，处理中的panic也会落为失败文章
    async fn handle_task(&self, task: Task) {
        self.attempted.fetch_add(1, Ordering::Relaxed);
        let started = Instant::now();

        let outcome = match AssertUnwindSafe(self.process_task(task.clone()))
            .catch_unwind()
            .await
        {
            Ok(outcome) => outcome,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(task_id = %task.id, url = %task.url, panic = %message, "Task processing panicked");
                self.save_failed(task, format!("unexpected error: {message}"))
                    .await;
                TaskOutcome::Failed
            }
        };

        if outcome == TaskOutcome::Completed {
            self.processed.fetch_add(1, Ordering::Relaxed);
        }
        record_task(outcome, started.elapsed());
    }

    #[instrument(skip(self, task), fields(worker_id = %self.worker_id, task_id = %task.id, url = %task.url))]
    async fn process_task(&self, task: Task) -> TaskOutcome {
        info!("Processing task");

        match self.engine.scrape(&task.url).await {
            Ok(scraped) => {
                let article = Article::completed(task.clone(), scraped);
                match self.repository.save(&article).await {
                    Ok(()) => {
                        info!(title = article.title.as_deref().unwrap_or_default(), "Article completed");
                        TaskOutcome::Completed
                    }
                    Err(e) => {
                        error!("Failed to save scraped article: {}", e);
                        self.save_failed(task, format!("failed to save scraped content: {e}"))
                            .await;
                        TaskOutcome::Failed
                    }
                }
            }
            Err(e) => {
                warn!("Scrape failed: {}", e);
                self.save_failed(task, e.to_string()).await;
                TaskOutcome::Failed
            }
        }
    }

    async fn save_failed(&self, task: Task, error_message: String) {
        let article = Article::failed(task, error_message);
        if let Err(e) = self.repository.save(&article).await {
            error!(url = %article.url, "Failed to save failed article: {}", e);
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[async_trait]
impl<Q, R> Worker for ScrapeWorker<Q, R>
where
    Q: TaskQueue + 'static,
    R: ArticleRepository + 'static,
{
    async fn run(&self, shutdown: CancellationToken) -> Result<WorkerSummary, WorkerError> {
        {
            let mut state = self.state.lock();
            if *state != WorkerState::Idle {
                return Err(WorkerError::InvalidState(state.to_string()));
            }
            *state = WorkerState::Running;
        }

        info!(worker_id = %self.worker_id, "Scrape worker started");

        while !shutdown.is_cancelled() {
            match self.queue.pop(self.pop_timeout).await {
                Ok(Some(task)) => {
                    let task_done = self.handle_task(task);
                    tokio::pin!(task_done);
                    tokio::select! {
                        _ = &mut task_done => {}
                        _ = shutdown.cancelled() => {
                            // in-flight task always runs to completion
                            self.set_state(WorkerState::Stopping);
                            info!(worker_id = %self.worker_id, "Shutdown requested, finishing current task");
                            task_done.await;
                        }
                    }
                }
                Ok(None) => continue,
                Err(e) => {
                    error!(worker_id = %self.worker_id, "Failed to pop task: {}", e);
                    tokio::select! {
                        _ = shutdown.cancelled() => {}
                        _ = sleep(QUEUE_ERROR_BACKOFF) => {}
                    }
                }
            }
        }

        self.set_state(WorkerState::Stopping);
        info!(worker_id = %self.worker_id, "Scrape worker stopping");

        let summary = self.summary();
        self.set_state(WorkerState::Stopped);
        info!(
            worker_id = %self.worker_id,
            attempted = summary.attempted,
            processed = summary.processed,
            "Scrape worker stopped"
        );

        Ok(summary)
    }

    fn name(&self) -> &str {
        "scrape_worker"
    }
}

#[cfg(test)]
#[path = "scrape_worker_test.rs"]
mod tests;
