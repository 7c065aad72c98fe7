// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::task::Task;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 文章状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    /// 尚未抓取
    Pending,
    /// 抓取并保存成功
    Completed,
    /// 抓取失败
    Failed,
}

impl ArticleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleStatus::Pending => "pending",
            ArticleStatus::Completed => "completed",
            ArticleStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for ArticleStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 无效状态字符串
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid article status: {0}")]
pub struct InvalidStatus(pub String);

impl FromStr for ArticleStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ArticleStatus::Pending),
            "completed" => Ok(ArticleStatus::Completed),
            "failed" => Ok(ArticleStatus::Failed),
            other => Err(InvalidStatus(other.to_string())),
        }
    }
}

/// 抓取内容
///
/// 抓取引擎成功后产出的临时结果，随即用于构建 [`Article`]，不单独持久化。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapedContent {
    /// 标题，未找到时为占位值
    pub title: String,
    /// 正文，最多2000个字符
    pub content: String,
    /// 抓取完成时间
    pub scraped_at: DateTime<Utc>,
}

/// 文章记录
///
/// 任务元数据与抓取结果的组合，以URL为键持久化。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    pub id: String,
    pub url: String,
    pub source: String,
    pub category: String,
    pub priority: String,
    pub title: Option<String>,
    pub content: Option<String>,
    pub status: ArticleStatus,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub scraped_at: Option<DateTime<Utc>>,
}

/// 违反文章不变量
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArticleInvariantError {
    #[error("completed article {url} is missing title or content")]
    CompletedWithoutContent { url: String },
    #[error("completed article {url} carries an error message")]
    CompletedWithError { url: String },
    #[error("failed article {url} has no error message")]
    FailedWithoutError { url: String },
}

impl Article {
    fn from_task(task: Task, status: ArticleStatus) -> Self {
        Self {
            id: task.id,
            url: task.url,
            source: task.source,
            category: task.category,
            priority: task.priority,
            title: None,
            content: None,
            status,
            error_message: None,
            created_at: Utc::now(),
            scraped_at: None,
        }
    }

    /// 创建待处理文章
    pub fn pending(task: Task) -> Self {
        Self::from_task(task, ArticleStatus::Pending)
    }

    /// 由任务和抓取内容创建已完成文章
    pub fn completed(task: Task, scraped: ScrapedContent) -> Self {
        Self {
            title: Some(scraped.title),
            content: Some(scraped.content),
            scraped_at: Some(scraped.scraped_at),
            ..Self::from_task(task, ArticleStatus::Completed)
        }
    }

    /// 由任务和错误描述创建失败文章
    pub fn failed(task: Task, error_message: impl Into<String>) -> Self {
        Self {
            error_message: Some(error_message.into()),
            ..Self::from_task(task, ArticleStatus::Failed)
        }
    }

    /// 检查状态相关的不变量
    pub fn validate(&self) -> Result<(), ArticleInvariantError> {
        match self.status {
            ArticleStatus::Completed => {
                if self.title.is_none() || self.content.is_none() {
                    return Err(ArticleInvariantError::CompletedWithoutContent {
                        url: self.url.clone(),
                    });
                }
                if self.error_message.is_some() {
                    return Err(ArticleInvariantError::CompletedWithError {
                        url: self.url.clone(),
                    });
                }
                Ok(())
            }
            ArticleStatus::Failed if self.error_message.is_none() => {
                Err(ArticleInvariantError::FailedWithoutError {
                    url: self.url.clone(),
                })
            }
            _ => Ok(()),
        }
    }
}
