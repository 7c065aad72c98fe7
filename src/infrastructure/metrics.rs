// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::MetricsSettings;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{info, warn};

pub const TASKS_TOTAL: &str = "harvestr_tasks_total";
pub const TASK_DURATION_SECONDS: &str = "harvestr_task_duration_seconds";

/// 任务结果标签
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Completed,
    Failed,
}

impl TaskOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskOutcome::Completed => "completed",
            TaskOutcome::Failed => "failed",
        }
    }
}

/// 初始化Prometheus导出器
///
/// 未启用时不安装记录器，指标宏成为空操作。
/// 导出器安装失败只记录警告，不影响抓取流程。
///
/// # 返回值
///
/// 导出器是否已启动
pub fn init_metrics(settings: &MetricsSettings) -> bool {
    if !settings.enabled {
        return false;
    }

    let addr: SocketAddr = match settings.listen_addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            warn!(listen_addr = %settings.listen_addr, error = %e, "Invalid metrics listen address");
            return false;
        }
    };

    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!("Failed to install Prometheus recorder: {}. This might happen if the port is already in use.", e);
        return false;
    }

    describe_counter!(TASKS_TOTAL, "Total number of tasks processed, by outcome");
    describe_histogram!(
        TASK_DURATION_SECONDS,
        "Time spent scraping and storing a single task"
    );

    info!("Metrics exporter listening on {}", addr);
    true
}

/// 记录一个任务的结果和耗时
pub fn record_task(outcome: TaskOutcome, elapsed: Duration) {
    counter!(TASKS_TOTAL, "outcome" => outcome.as_str()).increment(1);
    histogram!(TASK_DURATION_SECONDS).record(elapsed.as_secs_f64());
}
