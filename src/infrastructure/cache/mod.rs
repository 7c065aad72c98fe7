// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// Redis访问模块
///
/// 提供任务队列底层使用的Redis客户端
pub mod redis_client;
