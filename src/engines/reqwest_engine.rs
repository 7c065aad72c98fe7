// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::engines::traits::{ContentFetcher, FetchError};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::redirect::Policy;
use std::time::{Duration, Instant};
use tracing::debug;
use url::Url;

/// 最多跟随的重定向次数
const MAX_REDIRECTS: usize = 10;

/// 基于reqwest的HTTP获取器
///
/// 复用同一个客户端，所有请求携带固定的User-Agent并自动跟随重定向
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    /// 创建新的获取器
    ///
    /// # 参数
    ///
    /// * `user_agent` - 请求使用的客户端标识
    ///
    /// # 返回值
    ///
    /// * `Ok(ReqwestFetcher)` - 获取器实例
    /// * `Err(reqwest::Error)` - 客户端构建失败（如TLS后端初始化失败）
    pub fn new(user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ContentFetcher for ReqwestFetcher {
    /// 执行HTTP GET
    ///
    /// # 参数
    ///
    /// * `url` - 目标URL
    /// * `timeout` - 整个请求（含读取响应体）的超时时间
    ///
    /// # 返回值
    ///
    /// * `Ok(Bytes)` - 成功状态码下的原始响应体
    /// * `Err(FetchError)` - 超时、连接失败或非成功状态码
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<Bytes, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let start = Instant::now();
        let response = self
            .client
            .get(parsed)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, timeout, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().to_string();
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(url, timeout, e))?;

        debug!(
            url,
            final_url = %final_url,
            status = status.as_u16(),
            bytes = body.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Fetched page"
        );

        Ok(body)
    }

    fn name(&self) -> &'static str {
        "reqwest"
    }
}

#[cfg(test)]
#[path = "reqwest_engine_test.rs"]
mod tests;
