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

use crate::config::settings::DatabaseSettings;
use crate::utils::retry_policy::RetryPolicy;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use std::time::Duration;
use tracing::{info, warn};

/// 两次连接尝试之间的最长等待
const MAX_CONNECT_BACKOFF: Duration = Duration::from_secs(30);

/// 创建数据库连接池
///
/// # 参数
///
/// * `settings` - 数据库配置
///
/// # 返回值
///
/// * `Ok(DatabaseConnection)` - 数据库连接
/// * `Err(DbErr)` - 连接过程中出现的错误
pub async fn create_pool(settings: &DatabaseSettings) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(settings.url.to_owned());

    if let Some(max) = settings.max_connections {
        opt.max_connections(max);
    }

    if let Some(min) = settings.min_connections {
        opt.min_connections(min);
    }

    if let Some(timeout) = settings.connect_timeout {
        opt.connect_timeout(Duration::from_secs(timeout));
        opt.acquire_timeout(Duration::from_secs(timeout));
    }

    if let Some(idle) = settings.idle_timeout {
        opt.idle_timeout(Duration::from_secs(idle));
    }

    opt.sqlx_logging(false);

    Database::connect(opt).await
}

/// 带重试地建立数据库连接
///
/// 每次尝试都会创建连接池并执行ping，失败后按指数退避等待，
/// 初始间隔为 `connect_retry_delay_ms`，每次翻倍，单次等待不超过30秒
pub async fn connect_with_retry(
    settings: &DatabaseSettings,
) -> Result<DatabaseConnection, DbErr> {
    let policy = RetryPolicy::doubling(
        settings.connect_attempts,
        Duration::from_millis(settings.connect_retry_delay_ms),
    )
    .with_max_backoff(MAX_CONNECT_BACKOFF);
    let mut attempt = 1;

    loop {
        let result = match create_pool(settings).await {
            Ok(db) => db.ping().await.map(|_| db),
            Err(e) => Err(e),
        };

        let error = match result {
            Ok(db) => {
                info!(
                    backend = ?db.get_database_backend(),
                    attempt,
                    "Connected to database"
                );
                return Ok(db);
            }
            Err(e) => e,
        };

        match policy.delay_after_attempt(attempt) {
            Some(delay) => {
                warn!(
                    attempt,
                    attempts = policy.attempts(),
                    retry_in_ms = delay.as_millis() as u64,
                    error = %error,
                    "Database connection failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            None => {
                warn!(attempt, error = %error, "Giving up on database connection");
                return Err(error);
            }
        }
    }
}
