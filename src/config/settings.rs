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

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// 应用程序配置设置
///
/// 包含队列、文档存储、抓取和指标等所有配置项。
/// 启动时读取一次，随后作为显式参数传递给各组件的构造函数。
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Redis队列配置
    pub redis: RedisSettings,
    /// 数据库配置
    pub database: DatabaseSettings,
    /// 抓取配置
    pub scraping: ScrapingSettings,
    /// 指标配置
    pub metrics: MetricsSettings,
}

/// 数据库配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库连接URL
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 最小连接数
    pub min_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
    /// 空闲连接超时时间（秒）
    pub idle_timeout: Option<u64>,
    /// 启动时的连接尝试次数
    pub connect_attempts: u32,
    /// 首次连接重试前的等待时间（毫秒），之后每次翻倍
    pub connect_retry_delay_ms: u64,
}

/// Redis配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct RedisSettings {
    /// Redis连接URL
    pub url: String,
    /// 任务列表的键名
    pub queue_name: String,
    /// 阻塞出队的最长等待时间（秒）
    pub pop_timeout_secs: u64,
}

/// 抓取配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ScrapingSettings {
    /// 单次请求超时时间（秒）
    pub timeout_secs: u64,
    /// 每个URL的最大尝试次数
    pub max_retries: u32,
    /// 重试之间的基础间隔（秒），第N次失败后等待 N 倍
    pub delay_between_requests: f64,
    /// 请求使用的User-Agent
    pub user_agent: String,
}

/// 指标配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// 是否启动Prometheus导出器
    pub enabled: bool,
    /// 导出器监听地址
    pub listen_addr: String,
}

/// 默认的客户端标识
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次叠加默认值、`config/default`、`config/{HARVESTR_ENVIRONMENT}`
    /// 以及 `HARVESTR__` 前缀的环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("HARVESTR_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Self::with_defaults(Config::builder())?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("HARVESTR").separator("__"));

        Self::from_builder(builder)
    }

    /// 由配置构建器生成并校验设置
    pub fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        // BRPOP treats a zero timeout as "block forever"
        if self.redis.pop_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "redis.pop_timeout_secs must be at least 1".to_string(),
            ));
        }
        let delay = self.scraping.delay_between_requests;
        if Duration::try_from_secs_f64(delay.max(0.0)).is_err() {
            return Err(ConfigError::Message(format!(
                "scraping.delay_between_requests is not a usable duration: {delay}"
            )));
        }
        Ok(())
    }

    fn with_defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        builder
            // Queue
            .set_default("redis.url", "redis://127.0.0.1:6379")?
            .set_default("redis.queue_name", "articles_queue")?
            .set_default("redis.pop_timeout_secs", 5)?
            // Document store
            .set_default("database.url", "sqlite://harvestr.db?mode=rwc")?
            .set_default("database.connect_timeout", 5)?
            .set_default("database.connect_attempts", 5)?
            .set_default("database.connect_retry_delay_ms", 1000)?
            // Scraping
            .set_default("scraping.timeout_secs", 30)?
            .set_default("scraping.max_retries", 3)?
            .set_default("scraping.delay_between_requests", 1.0)?
            .set_default("scraping.user_agent", DEFAULT_USER_AGENT)?
            // Metrics
            .set_default("metrics.enabled", false)?
            .set_default("metrics.listen_addr", "0.0.0.0:9000")
    }
}

impl RedisSettings {
    pub fn pop_timeout(&self) -> Duration {
        Duration::from_secs(self.pop_timeout_secs.max(1))
    }
}

impl ScrapingSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// 重试基础间隔，负值按零处理
    pub fn base_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.delay_between_requests.max(0.0)).unwrap_or(Duration::MAX)
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
