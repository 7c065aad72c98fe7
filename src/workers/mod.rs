// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 后台工作器模块
///
/// 包括工作器特质和从队列消费抓取任务的工作器
pub mod scrape_worker;
pub mod worker;
