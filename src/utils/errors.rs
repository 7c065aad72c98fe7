// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::article::{ArticleInvariantError, InvalidStatus};
use crate::queue::task_queue::QueueError;
use thiserror::Error;

/// 仓库层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Invalid stored record for {url}: {reason}")]
    InvalidRecord { url: String, reason: String },

    #[error("Refusing to save invalid article: {0}")]
    InvalidArticle(#[from] ArticleInvariantError),
}

impl RepositoryError {
    pub(crate) fn invalid_status(url: &str, err: InvalidStatus) -> Self {
        RepositoryError::InvalidRecord {
            url: url.to_string(),
            reason: err.to_string(),
        }
    }
}

/// Worker错误类型
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Worker is {0}, expected idle")]
    InvalidState(String),

    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
