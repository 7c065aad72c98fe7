// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// 命令行参数
///
/// 连接参数来自配置文件和 `HARVESTR__` 前缀的环境变量
#[derive(Parser, Debug)]
#[command(author, version, about = "Queue-driven web content harvester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Consume tasks from the queue until Ctrl-C or SIGTERM
    Worker,
    /// Push every valid record of a JSON array file onto the queue
    Publish {
        /// Path to the JSON task file
        file: PathBuf,
    },
    /// Print queue length and stored article counts
    Stats,
    /// Print the most recently created articles
    Recent {
        /// Number of articles to print
        #[arg(short, long, default_value_t = 10)]
        limit: u64,
    },
    /// Delete every pending task from the queue
    ClearQueue,
}
