// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use harvestr::domain::models::task::Task;
use harvestr::queue::task_queue::{QueueError, TaskQueue};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// 内存FIFO队列
///
/// 队列取空时取消关闭令牌，使工作器处理完已有任务后退出
pub struct MockTaskQueue {
    tasks: Mutex<VecDeque<Task>>,
    shutdown: CancellationToken,
}

impl MockTaskQueue {
    pub fn new(shutdown: CancellationToken) -> Self {
        Self {
            tasks: Mutex::new(VecDeque::new()),
            shutdown,
        }
    }
}

#[async_trait]
impl TaskQueue for MockTaskQueue {
    async fn push(&self, task: &Task) -> Result<(), QueueError> {
        self.tasks.lock().unwrap().push_front(task.clone());
        Ok(())
    }

    async fn pop(&self, _timeout: Duration) -> Result<Option<Task>, QueueError> {
        let task = self.tasks.lock().unwrap().pop_back();
        if task.is_none() {
            self.shutdown.cancel();
        }
        Ok(task)
    }

    async fn length(&self) -> Result<u64, QueueError> {
        Ok(self.tasks.lock().unwrap().len() as u64)
    }

    async fn clear(&self) -> Result<(), QueueError> {
        self.tasks.lock().unwrap().clear();
        Ok(())
    }
}
