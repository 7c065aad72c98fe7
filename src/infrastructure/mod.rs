// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 该模块包含系统的技术实现细节，负责与外部系统的交互。
///
/// 包含的子模块：
/// - 缓存（cache）：Redis客户端
/// - 数据库（database）：数据库连接和实体映射
/// - 指标（metrics）：任务计数和耗时
/// - 仓库实现（repositories）：领域仓库接口的具体实现
pub mod cache;
pub mod database;
pub mod metrics;
pub mod repositories;
