// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 抓取引擎模块
///
/// 包括单次获取的HTTP客户端与带重试的抓取引擎
pub mod reqwest_engine;
pub mod scrape_engine;
pub mod traits;
