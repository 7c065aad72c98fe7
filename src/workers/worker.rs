// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::errors::WorkerError;
use async_trait::async_trait;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// 工作器退出时的计数汇总
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkerSummary {
    pub worker_id: Uuid,
    /// 出队的任务数
    pub attempted: u64,
    /// 成功抓取并保存的任务数
    pub processed: u64,
}

/// Worker trait定义
///
/// 所有后台工作器都必须实现此trait
#[async_trait]
pub trait Worker: Send + Sync {
    /// 运行工作器，直到 `shutdown` 被取消
    async fn run(&self, shutdown: CancellationToken) -> Result<WorkerSummary, WorkerError>;

    /// 获取工作器名称
    fn name(&self) -> &str;
}
