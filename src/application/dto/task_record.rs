// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::task::{Task, DEFAULT_PRIORITY};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

/// 任务文件中的一条记录
///
/// `id` 和 `priority` 可省略
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TaskRecordDto {
    pub id: Option<String>,
    pub url: Option<String>,
    pub source: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
}

impl TaskRecordDto {
    /// 转换为任务，缺少 `id` 时使用 `article_{position}`
    ///
    /// # 参数
    ///
    /// * `position` - 记录在文件中的位置，从1开始
    pub fn into_task(self, position: usize) -> Result<Task, ValidationErrors> {
        let task = Task {
            id: self.id.unwrap_or_else(|| format!("article_{position}")),
            url: self.url.unwrap_or_default(),
            source: self.source.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            priority: self
                .priority
                .unwrap_or_else(|| DEFAULT_PRIORITY.to_string()),
        };
        task.validate()?;
        Ok(task)
    }
}
