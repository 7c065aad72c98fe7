// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 提供从HTML中提取标题与正文的启发式规则
pub mod extraction_service;
