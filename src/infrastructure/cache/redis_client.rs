// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, AsyncConnectionConfig, RedisResult};
use std::time::Duration;

/// 阻塞命令的响应超时在服务端超时之外预留的余量
const BLOCKING_RESPONSE_MARGIN: Duration = Duration::from_secs(2);

/// Redis客户端
///
/// 提供任务队列所需的列表操作的异步接口
#[derive(Clone)]
pub struct RedisClient {
    /// Redis客户端
    client: redis::Client,
}

impl RedisClient {
    /// 创建新的Redis客户端实例
    ///
    /// 只解析连接URL，不会建立连接
    ///
    /// # 参数
    ///
    /// * `redis_url` - Redis连接URL
    pub fn new(redis_url: &str) -> RedisResult<Self> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self { client })
    }

    async fn connection(&self) -> RedisResult<MultiplexedConnection> {
        self.client.get_multiplexed_async_connection().await
    }

    /// 响应超时长于服务端阻塞时间的连接
    async fn blocking_connection(&self, block_for: Duration) -> RedisResult<MultiplexedConnection> {
        let config = AsyncConnectionConfig::new()
            .set_response_timeout(Some(block_for + BLOCKING_RESPONSE_MARGIN));
        self.client
            .get_multiplexed_async_connection_with_config(&config)
            .await
    }

    /// 检查Redis是否可达
    pub async fn ping(&self) -> RedisResult<()> {
        let mut con = self.connection().await?;
        redis::cmd("PING").query_async::<String>(&mut con).await?;
        Ok(())
    }

    /// 将值插入列表头部
    ///
    /// # 返回值
    ///
    /// * `Ok(u64)` - 插入后的列表长度
    pub async fn lpush(&self, key: &str, value: &str) -> RedisResult<u64> {
        let mut con = self.connection().await?;
        con.lpush(key, value).await
    }

    /// 阻塞地从列表尾部弹出一个值
    ///
    /// # 参数
    ///
    /// * `key` - 列表键
    /// * `timeout` - 最长等待时间，超时返回 `None`
    pub async fn brpop(&self, key: &str, timeout: Duration) -> RedisResult<Option<String>> {
        let mut con = self.blocking_connection(timeout).await?;
        // BRPOP replies with (key, value) or nil on timeout
        let reply: Option<(String, String)> = con.brpop(key, timeout.as_secs_f64()).await?;
        Ok(reply.map(|(_, value)| value))
    }

    /// 获取列表长度
    pub async fn llen(&self, key: &str) -> RedisResult<u64> {
        let mut con = self.connection().await?;
        con.llen(key).await
    }

    /// 删除键
    pub async fn del(&self, key: &str) -> RedisResult<()> {
        let mut con = self.connection().await?;
        con.del::<_, ()>(key).await
    }
}
