// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// 默认任务优先级
pub const DEFAULT_PRIORITY: &str = "medium";

fn default_priority() -> String {
    DEFAULT_PRIORITY.to_string()
}

/// 抓取任务
///
/// 表示一个待处理的工作单元：抓取一个URL。
/// 由生产者创建并以JSON形式推入队列，被工作器弹出处理后即不再存在。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Task {
    /// 任务标识符，由生产者指定
    #[validate(length(min = 1))]
    pub id: String,
    /// 目标URL
    #[validate(length(min = 1))]
    pub url: String,
    /// 来源标签
    #[validate(length(min = 1))]
    pub source: String,
    /// 分类标签
    #[validate(length(min = 1))]
    pub category: String,
    /// 优先级，缺省时为 "medium"
    #[serde(default = "default_priority")]
    pub priority: String,
}

impl Task {
    /// 创建一个使用默认优先级的任务
    pub fn new(
        id: impl Into<String>,
        url: impl Into<String>,
        source: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            source: source.into(),
            category: category.into(),
            priority: default_priority(),
        }
    }

    /// 设置优先级
    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = priority.into();
        self
    }
}
