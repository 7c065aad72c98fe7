// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 数据库模块
///
/// 提供带重试的数据库连接和文章表实体
pub mod connection;
pub mod entities;
