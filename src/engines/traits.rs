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

use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use thiserror::Error;

/// 获取错误类型
#[derive(Error, Debug)]
pub enum FetchError {
    /// URL无法解析
    #[error("Invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },
    /// 超时
    #[error("Request to {url} timed out after {}s", timeout.as_secs_f64())]
    Timeout { url: String, timeout: Duration },
    /// 连接失败
    #[error("Connection to {url} failed: {message}")]
    Connect { url: String, message: String },
    /// 响应状态码不表示成功
    #[error("Unexpected HTTP status {status} from {url}")]
    Status { url: String, status: u16 },
    /// 其他请求错误
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
}

impl FetchError {
    /// 将reqwest错误归类
    pub fn from_reqwest(url: &str, timeout: Duration, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                timeout,
            }
        } else if err.is_connect() {
            FetchError::Connect {
                url: url.to_string(),
                message: err.to_string(),
            }
        } else {
            FetchError::Request(err)
        }
    }
}

/// 内容获取特质
///
/// 执行单次获取，不做重试
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// 获取URL的原始响应体
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<Bytes, FetchError>;

    /// 获取器名称
    fn name(&self) -> &'static str;
}
