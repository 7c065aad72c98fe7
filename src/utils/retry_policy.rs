// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;

/// 退避方式
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackoffStrategy {
    /// 第N次失败后等待 N × 基础间隔
    Linear,
    /// 第N次失败后等待 基础间隔 × multiplier^(N-1)
    Exponential { multiplier: f64 },
}

/// 重试策略配置
///
/// `max_attempts` 是总尝试次数（含首次），尝试编号从1开始
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 最大尝试次数
    pub max_attempts: u32,
    /// 基础退避时间
    pub base_delay: Duration,
    /// 最大退避时间
    pub max_backoff: Option<Duration>,
    /// 退避方式
    pub strategy: BackoffStrategy,
}

impl RetryPolicy {
    /// 线性退避策略，用于页面抓取
    pub fn linear(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            max_backoff: None,
            strategy: BackoffStrategy::Linear,
        }
    }

    /// 每次翻倍的指数退避策略，用于建立连接
    pub fn doubling(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay: initial_delay,
            max_backoff: None,
            strategy: BackoffStrategy::Exponential { multiplier: 2.0 },
        }
    }

    /// 设置退避上限
    pub fn with_max_backoff(mut self, max_backoff: Duration) -> Self {
        self.max_backoff = Some(max_backoff);
        self
    }

    /// 实际生效的尝试次数，至少一次
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// 计算第 `attempt` 次失败后的退避时间
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let attempt = attempt.max(1);
        let backoff_secs = match self.strategy {
            BackoffStrategy::Linear => self.base_delay.as_secs_f64() * attempt as f64,
            BackoffStrategy::Exponential { multiplier } => {
                self.base_delay.as_secs_f64() * multiplier.powi(attempt as i32 - 1)
            }
        };

        let capped = match self.max_backoff {
            Some(max) => backoff_secs.min(max.as_secs_f64()),
            None => backoff_secs,
        };

        Duration::try_from_secs_f64(capped.max(0.0)).unwrap_or(Duration::MAX)
    }

    /// 是否还有下一次尝试
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.attempts()
    }

    /// 第 `attempt` 次失败后应等待的时间；最后一次尝试之后不再等待
    pub fn delay_after_attempt(&self, attempt: u32) -> Option<Duration> {
        self.should_retry(attempt)
            .then(|| self.calculate_backoff(attempt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_backoff_linear() {
        let policy = RetryPolicy::linear(3, Duration::from_secs(1));

        assert_eq!(policy.calculate_backoff(1), Duration::from_secs(1));
        assert_eq!(policy.calculate_backoff(2), Duration::from_secs(2));
        assert_eq!(policy.calculate_backoff(3), Duration::from_secs(3));
    }

    #[test]
    fn test_calculate_backoff_doubling() {
        let policy = RetryPolicy::doubling(5, Duration::from_secs(1));

        assert_eq!(policy.calculate_backoff(1), Duration::from_secs(1));
        assert_eq!(policy.calculate_backoff(2), Duration::from_secs(2)); // 1 * 2^1
        assert_eq!(policy.calculate_backoff(3), Duration::from_secs(4)); // 1 * 2^2
    }

    #[test]
    fn test_calculate_backoff_max_limit() {
        let policy =
            RetryPolicy::doubling(20, Duration::from_secs(1)).with_max_backoff(Duration::from_secs(5));

        assert_eq!(policy.calculate_backoff(10), Duration::from_secs(5));
    }

    #[test]
    fn test_calculate_backoff_saturates_instead_of_overflowing() {
        let policy = RetryPolicy::doubling(u32::MAX, Duration::from_secs(1));

        assert_eq!(policy.calculate_backoff(5_000), Duration::MAX);

        let capped = policy.with_max_backoff(Duration::from_secs(30));
        assert_eq!(capped.calculate_backoff(5_000), Duration::from_secs(30));
    }

    #[test]
    fn test_no_delay_after_final_attempt() {
        let policy = RetryPolicy::linear(3, Duration::from_millis(500));

        assert_eq!(policy.delay_after_attempt(1), Some(Duration::from_millis(500)));
        assert_eq!(policy.delay_after_attempt(2), Some(Duration::from_millis(1000)));
        assert_eq!(policy.delay_after_attempt(3), None);
    }

    #[test]
    fn test_should_retry() {
        let policy = RetryPolicy::linear(3, Duration::from_secs(1));

        assert!(policy.should_retry(1));
        assert!(policy.should_retry(2));
        assert!(!policy.should_retry(3));
        assert!(!policy.should_retry(4));
    }

    #[test]
    fn test_zero_attempts_still_runs_once() {
        let policy = RetryPolicy::linear(0, Duration::from_secs(1));

        assert_eq!(policy.attempts(), 1);
        assert_eq!(policy.delay_after_attempt(1), None);
    }
}
