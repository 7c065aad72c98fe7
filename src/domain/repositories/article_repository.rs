// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::article::Article;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

/// 按状态聚合的文章数量
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ArticleStats {
    pub total: u64,
    pub completed: u64,
    pub failed: u64,
    pub pending: u64,
}

/// 文章仓库特质
///
/// 定义文章数据访问接口，`url` 是唯一键
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// 按URL插入或整体替换文章
    async fn save(&self, article: &Article) -> Result<(), RepositoryError>;
    /// 根据URL查找文章
    async fn find_by_url(&self, url: &str) -> Result<Option<Article>, RepositoryError>;
    /// 统计各状态的文章数量
    async fn stats(&self) -> Result<ArticleStats, RepositoryError>;
    /// 获取最近创建的文章，按创建时间倒序
    async fn recent(&self, limit: u64) -> Result<Vec<Article>, RepositoryError>;
}

#[async_trait]
impl<T: ArticleRepository + ?Sized> ArticleRepository for Arc<T> {
    async fn save(&self, article: &Article) -> Result<(), RepositoryError> {
        (**self).save(article).await
    }

    async fn find_by_url(&self, url: &str) -> Result<Option<Article>, RepositoryError> {
        (**self).find_by_url(url).await
    }

    async fn stats(&self) -> Result<ArticleStats, RepositoryError> {
        (**self).stats().await
    }

    async fn recent(&self, limit: u64) -> Result<Vec<Article>, RepositoryError> {
        (**self).recent(limit).await
    }
}
