// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::task::Task;
use crate::infrastructure::cache::redis_client::RedisClient;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};
use validator::Validate;

/// 队列错误类型
#[derive(Error, Debug)]
pub enum QueueError {
    /// 与队列服务通信失败
    #[error("Queue transport error: {0}")]
    Transport(#[from] redis::RedisError),

    /// 任务序列化失败
    #[error("Failed to serialize task {id}: {source}")]
    Serialize {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    /// 出队的负载无法解析或未通过校验，该条目已被消费
    #[error("Invalid task payload: {0}")]
    InvalidPayload(String),
}

/// 任务队列特质
///
/// 先进先出：最早入队的任务最先出队
#[async_trait]
pub trait TaskQueue: Send + Sync {
    /// 入队任务
    async fn push(&self, task: &Task) -> Result<(), QueueError>;

    /// 阻塞出队，超时返回 `Ok(None)`
    async fn pop(&self, timeout: Duration) -> Result<Option<Task>, QueueError>;

    /// 当前待处理任务数量（尽力而为）
    async fn length(&self) -> Result<u64, QueueError>;

    /// 清空队列
    async fn clear(&self) -> Result<(), QueueError>;
}

/// 基于Redis列表的任务队列实现
///
/// 入队使用 `LPUSH` 写入列表头部，出队使用 `BRPOP` 从尾部取出
#[derive(Clone)]
pub struct RedisTaskQueue {
    client: RedisClient,
    queue_name: String,
}

impl RedisTaskQueue {
    /// 创建新的Redis任务队列实例
    ///
    /// # 参数
    ///
    /// * `client` - Redis客户端
    /// * `queue_name` - 列表键名
    pub fn new(client: RedisClient, queue_name: impl Into<String>) -> Self {
        Self {
            client,
            queue_name: queue_name.into(),
        }
    }

    /// 检查Redis连接
    pub async fn ping(&self) -> Result<(), QueueError> {
        self.client.ping().await?;
        Ok(())
    }

    pub fn queue_name(&self) -> &str {
        &self.queue_name
    }
}

/// 将任务编码为队列中的JSON负载
pub fn encode_task(task: &Task) -> Result<String, QueueError> {
    serde_json::to_string(task).map_err(|source| QueueError::Serialize {
        id: task.id.clone(),
        source,
    })
}

/// 解析并校验队列中的JSON负载
pub fn decode_task(payload: &str) -> Result<Task, QueueError> {
    let task: Task =
        serde_json::from_str(payload).map_err(|e| QueueError::InvalidPayload(e.to_string()))?;
    task.validate()
        .map_err(|e| QueueError::InvalidPayload(format!("task {}: {}", task.id, e)))?;
    Ok(task)
}

#[async_trait]
impl TaskQueue for RedisTaskQueue {
    async fn push(&self, task: &Task) -> Result<(), QueueError> {
        let payload = encode_task(task)?;
        let length = self.client.lpush(&self.queue_name, &payload).await?;
        info!(task_id = %task.id, queue_length = length, "Pushed task to queue");
        Ok(())
    }

    async fn pop(&self, timeout: Duration) -> Result<Option<Task>, QueueError> {
        match self.client.brpop(&self.queue_name, timeout).await? {
            Some(payload) => {
                let task = decode_task(&payload)?;
                info!(task_id = %task.id, "Popped task from queue");
                Ok(Some(task))
            }
            None => {
                debug!(queue = %self.queue_name, "No task available before timeout");
                Ok(None)
            }
        }
    }

    async fn length(&self) -> Result<u64, QueueError> {
        Ok(self.client.llen(&self.queue_name).await?)
    }

    async fn clear(&self) -> Result<(), QueueError> {
        self.client.del(&self.queue_name).await?;
        info!(queue = %self.queue_name, "Cleared task queue");
        Ok(())
    }
}

#[async_trait]
impl<T: TaskQueue + ?Sized> TaskQueue for Arc<T> {
    async fn push(&self, task: &Task) -> Result<(), QueueError> {
        (**self).push(task).await
    }

    async fn pop(&self, timeout: Duration) -> Result<Option<Task>, QueueError> {
        (**self).pop(timeout).await
    }

    async fn length(&self) -> Result<u64, QueueError> {
        (**self).length().await
    }

    async fn clear(&self) -> Result<(), QueueError> {
        (**self).clear().await
    }
}
