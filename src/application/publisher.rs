// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::dto::task_record::TaskRecordDto;
use crate::queue::task_queue::{QueueError, TaskQueue};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

/// 发布错误类型
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Expected a JSON array in {path}, got {found}")]
    Format { path: PathBuf, found: &'static str },

    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),
}

/// 一次发布的计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PublishReport {
    /// 文件中的记录数
    pub total: usize,
    /// 通过校验的记录数
    pub valid: usize,
    /// 成功入队的任务数
    pub published: usize,
}

/// 队列状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueStatus {
    pub queue_length: u64,
    /// `active` 或 `empty`
    pub status: &'static str,
}

/// 任务发布器
///
/// 从JSON文件读取任务并推入队列
pub struct Publisher<Q: TaskQueue> {
    queue: Arc<Q>,
}

impl<Q: TaskQueue> Publisher<Q> {
    pub fn new(queue: Arc<Q>) -> Self {
        Self { queue }
    }

    /// 读取任务文件并将有效任务入队
    ///
    /// 缺少 `url`、`source` 或 `category` 的记录会被跳过并记录警告；
    /// 单个任务入队失败只记录错误，不中断其余任务。
    ///
    /// # 参数
    ///
    /// * `path` - JSON数组文件路径
    ///
    /// # 返回值
    ///
    /// * `Ok(PublishReport)` - 总数、有效数和入队数
    /// * `Err(PublishError)` - 文件缺失、JSON无效或顶层不是数组
    pub async fn publish_from_file(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<PublishReport, PublishError> {
        let path = path.as_ref();
        let records = load_records(path).await?;
        info!(path = %path.display(), count = records.len(), "Loaded task records");

        let mut report = PublishReport {
            total: records.len(),
            ..Default::default()
        };

        for (index, value) in records.into_iter().enumerate() {
            let position = index + 1;
            let task = match serde_json::from_value::<TaskRecordDto>(value)
                .map_err(|e| e.to_string())
                .and_then(|record| record.into_task(position).map_err(|e| e.to_string()))
            {
                Ok(task) => task,
                Err(reason) => {
                    warn!(position, reason = %reason, "Skipping invalid task record");
                    continue;
                }
            };
            report.valid += 1;

            match self.queue.push(&task).await {
                Ok(()) => report.published += 1,
                Err(e) => error!(task_id = %task.id, "Failed to push task: {}", e),
            }
        }

        info!(
            published = report.published,
            valid = report.valid,
            total = report.total,
            "Published tasks"
        );
        Ok(report)
    }

    /// 查询队列长度
    pub async fn queue_status(&self) -> Result<QueueStatus, PublishError> {
        let queue_length = self.queue.length().await?;
        Ok(QueueStatus {
            queue_length,
            status: if queue_length > 0 { "active" } else { "empty" },
        })
    }
}

async fn load_records(path: &Path) -> Result<Vec<Value>, PublishError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| PublishError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let value: Value = serde_json::from_str(&raw).map_err(|source| PublishError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    match value {
        Value::Array(records) => Ok(records),
        other => Err(PublishError::Format {
            path: path.to_path_buf(),
            found: json_kind(&other),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
