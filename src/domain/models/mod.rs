// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 任务（task）：队列中传递的抓取请求
/// - 文章（article）：任务与抓取结果组合而成的持久化记录
pub mod article;
pub mod task;
