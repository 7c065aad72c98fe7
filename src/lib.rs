// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 读取任务文件并发布到队列
pub mod application;

/// 命令行模块
pub mod cli;

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含任务与文章实体、内容提取规则和仓库接口
pub mod domain;

/// 引擎模块
///
/// 页面获取与带重试的抓取
pub mod engines;

/// 基础设施模块
///
/// 提供外部服务集成，如数据库、Redis和指标
pub mod infrastructure;

/// 队列模块
///
/// 基于Redis列表的任务队列
pub mod queue;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;

/// 工作器模块
///
/// 从队列消费任务的后台工作器
pub mod workers;
