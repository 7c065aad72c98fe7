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
use crate::domain::models::article::{Article, ArticleStatus};
use crate::domain::repositories::article_repository::{ArticleRepository, ArticleStats};
use crate::infrastructure::database::connection::connect_with_retry;
use crate::infrastructure::database::entities::article as article_entity;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use migration::{Migrator, MigratorTrait};
use sea_orm::{
    sea_query::OnConflict, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::sync::Arc;
use tracing::{debug, info};

/// 文章仓库实现
///
/// 基于SeaORM实现，`url` 为主键，保存即按URL整体覆盖
#[derive(Clone)]
pub struct ArticleRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl ArticleRepositoryImpl {
    /// 使用已有连接创建仓库，不执行迁移
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// 连接数据库并执行迁移
    ///
    /// # 参数
    ///
    /// * `settings` - 数据库配置，包括重试次数和初始退避间隔
    ///
    /// # 返回值
    ///
    /// * `Ok(ArticleRepositoryImpl)` - 已就绪的仓库
    /// * `Err(RepositoryError)` - 重试耗尽或迁移失败
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, RepositoryError> {
        let db = connect_with_retry(settings).await?;
        Migrator::up(&db, None).await?;
        info!("Database schema is up to date");

        Ok(Self::new(Arc::new(db)))
    }

    async fn count_status(&self, status: ArticleStatus) -> Result<u64, RepositoryError> {
        let count = article_entity::Entity::find()
            .filter(article_entity::Column::Status.eq(status.as_str()))
            .count(self.db.as_ref())
            .await?;
        Ok(count)
    }
}

/// 时间戳以微秒精度的UTC RFC 3339字符串存储，字典序即时间序
pub(crate) fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(url: &str, value: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(value)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| RepositoryError::InvalidRecord {
            url: url.to_string(),
            reason: format!("bad timestamp {value:?}: {e}"),
        })
}

impl From<&Article> for article_entity::ActiveModel {
    fn from(article: &Article) -> Self {
        Self {
            url: Set(article.url.clone()),
            id: Set(article.id.clone()),
            source: Set(article.source.clone()),
            category: Set(article.category.clone()),
            priority: Set(article.priority.clone()),
            title: Set(article.title.clone()),
            content: Set(article.content.clone()),
            status: Set(article.status.as_str().to_string()),
            error_message: Set(article.error_message.clone()),
            created_at: Set(format_timestamp(&article.created_at)),
            scraped_at: Set(article.scraped_at.as_ref().map(format_timestamp)),
        }
    }
}

impl TryFrom<article_entity::Model> for Article {
    type Error = RepositoryError;

    fn try_from(model: article_entity::Model) -> Result<Self, Self::Error> {
        let status = model
            .status
            .parse::<ArticleStatus>()
            .map_err(|e| RepositoryError::invalid_status(&model.url, e))?;
        let created_at = parse_timestamp(&model.url, &model.created_at)?;
        let scraped_at = model
            .scraped_at
            .as_deref()
            .map(|value| parse_timestamp(&model.url, value))
            .transpose()?;

        let article = Self {
            id: model.id,
            url: model.url,
            source: model.source,
            category: model.category,
            priority: model.priority,
            title: model.title,
            content: model.content,
            status,
            error_message: model.error_message,
            created_at,
            scraped_at,
        };
        article.validate()?;
        Ok(article)
    }
}

#[async_trait]
impl ArticleRepository for ArticleRepositoryImpl {
    async fn save(&self, article: &Article) -> Result<(), RepositoryError> {
        article.validate()?;

        let model: article_entity::ActiveModel = article.into();
        let on_conflict = OnConflict::column(article_entity::Column::Url)
            .update_columns([
                article_entity::Column::Id,
                article_entity::Column::Source,
                article_entity::Column::Category,
                article_entity::Column::Priority,
                article_entity::Column::Title,
                article_entity::Column::Content,
                article_entity::Column::Status,
                article_entity::Column::ErrorMessage,
                article_entity::Column::CreatedAt,
                article_entity::Column::ScrapedAt,
            ])
            .to_owned();

        article_entity::Entity::insert(model)
            .on_conflict(on_conflict)
            .exec_without_returning(self.db.as_ref())
            .await?;

        debug!(url = %article.url, status = %article.status, "Saved article");
        Ok(())
    }

    async fn find_by_url(&self, url: &str) -> Result<Option<Article>, RepositoryError> {
        article_entity::Entity::find_by_id(url.to_string())
            .one(self.db.as_ref())
            .await?
            .map(Article::try_from)
            .transpose()
    }

    async fn stats(&self) -> Result<ArticleStats, RepositoryError> {
        let total = article_entity::Entity::find()
            .count(self.db.as_ref())
            .await?;

        Ok(ArticleStats {
            total,
            completed: self.count_status(ArticleStatus::Completed).await?,
            failed: self.count_status(ArticleStatus::Failed).await?,
            pending: self.count_status(ArticleStatus::Pending).await?,
        })
    }

    async fn recent(&self, limit: u64) -> Result<Vec<Article>, RepositoryError> {
        article_entity::Entity::find()
            .order_by_desc(article_entity::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(Article::try_from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::article::ScrapedContent;
    use crate::domain::models::task::Task;
    use chrono::Duration;

    async fn repository() -> ArticleRepositoryImpl {
        let settings = DatabaseSettings {
            url: "sqlite::memory:".to_string(),
            max_connections: Some(1),
            min_connections: None,
            connect_timeout: Some(5),
            idle_timeout: None,
            connect_attempts: 1,
            connect_retry_delay_ms: 10,
        };
        ArticleRepositoryImpl::connect(&settings).await.unwrap()
    }

    fn task(url: &str) -> Task {
        Task::new("a1", url, "tech", "news")
    }

    fn scraped(title: &str) -> ScrapedContent {
        ScrapedContent {
            title: title.to_string(),
            content: "body".to_string(),
            scraped_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_save_and_find_round_trip() {
        let repo = repository().await;
        let article = Article::completed(task("https://example.com/1"), scraped("One"));

        repo.save(&article).await.unwrap();
        let found = repo.find_by_url(&article.url).await.unwrap().unwrap();

        assert_eq!(found.title.as_deref(), Some("One"));
        assert_eq!(found.status, ArticleStatus::Completed);
        assert_eq!(
            format_timestamp(&found.created_at),
            format_timestamp(&article.created_at)
        );
        assert!(found.scraped_at.is_some());
    }

    #[tokio::test]
    async fn test_save_replaces_row_for_same_url() {
        let repo = repository().await;
        let url = "https://example.com/dup";

        repo.save(&Article::failed(task(url), "timed out"))
            .await
            .unwrap();
        repo.save(&Article::completed(task(url), scraped("Second")))
            .await
            .unwrap();

        let stats = repo.stats().await.unwrap();
        assert_eq!(stats.total, 1);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.failed, 0);

        let found = repo.find_by_url(url).await.unwrap().unwrap();
        assert_eq!(found.title.as_deref(), Some("Second"));
        assert_eq!(found.error_message, None);
    }

    #[tokio::test]
    async fn test_invalid_article_is_rejected() {
        let repo = repository().await;
        let mut article = Article::failed(task("https://example.com/bad"), "boom");
        article.error_message = None;

        let err = repo.save(&article).await.unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidArticle(_)));
        assert_eq!(repo.stats().await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn test_recent_orders_by_created_at_descending() {
        let repo = repository().await;
        let now = Utc::now();

        for (i, offset) in [3, 1, 2].into_iter().enumerate() {
            let mut article = Article::pending(task(&format!("https://example.com/{i}")));
            article.created_at = now - Duration::seconds(offset);
            repo.save(&article).await.unwrap();
        }

        let recent = repo.recent(2).await.unwrap();
        let urls: Vec<_> = recent.iter().map(|a| a.url.as_str()).collect();
        assert_eq!(urls, vec!["https://example.com/1", "https://example.com/2"]);

        let stats = repo.stats().await.unwrap();
        assert_eq!(stats.pending, 3);
    }

    #[tokio::test]
    async fn test_corrupt_row_is_reported() {
        let repo = repository().await;
        let model = article_entity::ActiveModel {
            url: Set("https://example.com/x".to_string()),
            id: Set("x".to_string()),
            source: Set("s".to_string()),
            category: Set("c".to_string()),
            priority: Set("medium".to_string()),
            title: Set(None),
            content: Set(None),
            status: Set("archived".to_string()),
            error_message: Set(None),
            created_at: Set(format_timestamp(&Utc::now())),
            scraped_at: Set(None),
        };
        article_entity::Entity::insert(model)
            .exec_without_returning(repo.db.as_ref())
            .await
            .unwrap();

        let err = repo.find_by_url("https://example.com/x").await.unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidRecord { .. }));
    }

    #[tokio::test]
    async fn test_find_missing_url() {
        let repo = repository().await;
        assert!(repo.find_by_url("https://nowhere.test").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_connect_gives_up_after_attempts() {
        let settings = DatabaseSettings {
            url: "postgres://nobody@127.0.0.1:1/none".to_string(),
            max_connections: Some(1),
            min_connections: None,
            connect_timeout: Some(1),
            idle_timeout: None,
            connect_attempts: 2,
            connect_retry_delay_ms: 1,
        };

        assert!(ArticleRepositoryImpl::connect(&settings).await.is_err());
    }
}
