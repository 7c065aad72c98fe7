// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::ScrapingSettings;
use crate::domain::models::article::ScrapedContent;
use crate::domain::services::extraction_service::{ContentExtractor, ExtractionError};
use crate::engines::traits::{ContentFetcher, FetchError};
use crate::utils::retry_policy::RetryPolicy;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// 单次尝试的失败原因
#[derive(Error, Debug)]
pub enum AttemptError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Extraction failed: {0}")]
    Extract(#[from] ExtractionError),
}

/// 抓取错误类型
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// 所有尝试均失败
    #[error("Failed to scrape {url} after {attempts} attempts: {last_error}")]
    Exhausted {
        url: String,
        attempts: u32,
        #[source]
        last_error: AttemptError,
    },
}

/// 抓取引擎
///
/// 组合获取器与提取器，按重试策略执行有限次尝试
pub struct ScrapeEngine {
    fetcher: Arc<dyn ContentFetcher>,
    extractor: ContentExtractor,
    policy: RetryPolicy,
    timeout: Duration,
}

impl ScrapeEngine {
    /// 根据抓取配置创建引擎
    ///
    /// 重试间隔为 `delay_between_requests × 尝试次数`
    pub fn new(
        fetcher: Arc<dyn ContentFetcher>,
        settings: &ScrapingSettings,
    ) -> Result<Self, ExtractionError> {
        let policy = RetryPolicy::linear(settings.max_retries, settings.base_delay());
        Self::with_policy(fetcher, policy, settings.timeout())
    }

    pub fn with_policy(
        fetcher: Arc<dyn ContentFetcher>,
        policy: RetryPolicy,
        timeout: Duration,
    ) -> Result<Self, ExtractionError> {
        Ok(Self {
            fetcher,
            extractor: ContentExtractor::new()?,
            policy,
            timeout,
        })
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// 抓取URL并提取标题和正文
    ///
    /// # 参数
    ///
    /// * `url` - 目标URL
    ///
    /// # 返回值
    ///
    /// * `Ok(ScrapedContent)` - 首次成功的尝试结果
    /// * `Err(ScrapeError::Exhausted)` - 所有尝试均失败，附带最后一次失败原因
    pub async fn scrape(&self, url: &str) -> Result<ScrapedContent, ScrapeError> {
        let attempts = self.policy.attempts();
        let mut attempt = 1;

        loop {
            debug!(url, attempt, attempts, fetcher = self.fetcher.name(), "Scrape attempt");

            let error = match self.attempt(url).await {
                Ok(scraped) => {
                    info!(url, attempt, title = %scraped.title, "Scraped page");
                    return Ok(scraped);
                }
                Err(error) => error,
            };

            warn!(url, attempt, attempts, error = %error, "Scrape attempt failed");

            match self.policy.delay_after_attempt(attempt) {
                Some(delay) => {
                    debug!(url, delay_ms = delay.as_millis() as u64, "Backing off before retry");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                None => {
                    return Err(ScrapeError::Exhausted {
                        url: url.to_string(),
                        attempts: attempt,
                        last_error: error,
                    });
                }
            }
        }
    }

    async fn attempt(&self, url: &str) -> Result<ScrapedContent, AttemptError> {
        let body = self.fetcher.fetch(url, self.timeout).await?;
        let extracted = self.extractor.extract(&body)?;

        Ok(ScrapedContent {
            title: extracted.title,
            content: extracted.content,
            scraped_at: Utc::now(),
        })
    }
}

#[cfg(test)]
#[path = "scrape_engine_test.rs"]
mod tests;
