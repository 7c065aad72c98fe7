// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use harvestr::domain::models::task::Task;
use harvestr::infrastructure::cache::redis_client::RedisClient;
use harvestr::queue::task_queue::{RedisTaskQueue, TaskQueue};
use std::time::Duration;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage};

async fn redis_queue() -> (RedisTaskQueue, ContainerAsync<GenericImage>) {
    let redis_node = GenericImage::new("redis", "7-alpine")
        .start()
        .await
        .expect("Failed to start Redis");
    let redis_port = redis_node
        .get_host_port_ipv4(6379)
        .await
        .expect("Failed to get Redis port");

    let client = RedisClient::new(&format!("redis://127.0.0.1:{}", redis_port))
        .expect("Invalid Redis URL");
    let queue = RedisTaskQueue::new(client, "test_articles_queue");

    // Retry until the server accepts connections
    for _ in 0..20 {
        if queue.ping().await.is_ok() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(250)).await;
    }

    (queue, redis_node)
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_redis_queue_is_fifo() {
    let (queue, _node) = redis_queue().await;
    queue.clear().await.unwrap();

    for i in 1..=3 {
        let task = Task::new(format!("t{i}"), format!("https://e.test/{i}"), "s", "c");
        queue.push(&task).await.unwrap();
        assert_eq!(queue.length().await.unwrap(), i);
    }

    for i in 1..=3u64 {
        let task = queue.pop(Duration::from_secs(1)).await.unwrap().unwrap();
        assert_eq!(task.id, format!("t{i}"));
        assert_eq!(queue.length().await.unwrap(), 3 - i);
    }
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_redis_pop_times_out_on_empty_queue() {
    let (queue, _node) = redis_queue().await;
    queue.clear().await.unwrap();

    let popped = queue.pop(Duration::from_secs(1)).await.unwrap();
    assert!(popped.is_none());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_redis_clear_empties_queue() {
    let (queue, _node) = redis_queue().await;

    queue
        .push(&Task::new("t1", "https://e.test/1", "s", "c"))
        .await
        .unwrap();
    queue.clear().await.unwrap();

    assert_eq!(queue.length().await.unwrap(), 0);
}
