// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{pipeline, start_site, ARTICLE_PATH, SLOW_PATH};
use harvestr::application::publisher::Publisher;
use harvestr::domain::models::article::ArticleStatus;
use harvestr::domain::models::task::Task;
use harvestr::domain::repositories::article_repository::ArticleRepository;
use harvestr::queue::task_queue::TaskQueue;
use harvestr::workers::worker::Worker;
use std::io::Write;
use tempfile::NamedTempFile;

#[tokio::test]
async fn test_completed_page_end_to_end() {
    let site = start_site().await;
    let pipeline = pipeline().await;
    let url = format!("{}{}", site.uri(), ARTICLE_PATH);

    pipeline
        .queue
        .push(&Task::new("a1", &url, "tech_blog", "programming"))
        .await
        .unwrap();
    let summary = pipeline.worker.run(pipeline.shutdown.clone()).await.unwrap();

    assert_eq!(summary.attempted, 1);
    assert_eq!(summary.processed, 1);

    let article = pipeline.repository.find_by_url(&url).await.unwrap().unwrap();
    assert_eq!(article.status, ArticleStatus::Completed);
    assert_eq!(article.title.as_deref(), Some("Understanding Ownership"));
    let content = article.content.unwrap();
    assert!(content.starts_with("Ownership Ownership lets Rust"));
    assert!(!content.contains("track()"));
    assert!(content.chars().count() <= 2000);
    assert!(article.scraped_at.is_some());
    assert_eq!(article.source, "tech_blog");
    assert_eq!(article.priority, "medium");
}

#[tokio::test]
async fn test_timing_out_page_is_stored_as_failed() {
    let site = start_site().await;
    let pipeline = pipeline().await;
    let url = format!("{}{}", site.uri(), SLOW_PATH);

    pipeline
        .queue
        .push(&Task::new("a2", &url, "tech_blog", "programming"))
        .await
        .unwrap();
    let summary = pipeline.worker.run(pipeline.shutdown.clone()).await.unwrap();

    assert_eq!(summary.attempted, 1);
    assert_eq!(summary.processed, 0);

    let article = pipeline.repository.find_by_url(&url).await.unwrap().unwrap();
    assert_eq!(article.status, ArticleStatus::Failed);
    assert!(article.error_message.unwrap().contains("timed out"));
    assert_eq!(article.content, None);
    assert_eq!(article.scraped_at, None);
}

#[tokio::test]
async fn test_duplicate_urls_leave_one_row() {
    let site = start_site().await;
    let pipeline = pipeline().await;
    let url = format!("{}{}", site.uri(), ARTICLE_PATH);

    for id in ["first", "second"] {
        pipeline
            .queue
            .push(&Task::new(id, &url, "tech_blog", "programming"))
            .await
            .unwrap();
    }
    let summary = pipeline.worker.run(pipeline.shutdown.clone()).await.unwrap();

    assert_eq!(summary.processed, 2);
    let stats = pipeline.repository.stats().await.unwrap();
    assert_eq!(stats.total, 1);
    assert_eq!(stats.completed, 1);
}

#[tokio::test]
async fn test_published_file_is_harvested() {
    let site = start_site().await;
    let pipeline = pipeline().await;
    let good = format!("{}{}", site.uri(), ARTICLE_PATH);
    let slow = format!("{}{}", site.uri(), SLOW_PATH);

    let records = serde_json::json!([
        {"id": "a1", "url": good, "source": "s", "category": "c", "priority": "high"},
        {"url": slow, "source": "s", "category": "c"},
        {"url": "https://missing-category.test", "source": "s"}
    ]);
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(records.to_string().as_bytes()).unwrap();

    let publisher = Publisher::new(pipeline.queue.clone());
    let report = publisher.publish_from_file(file.path()).await.unwrap();
    assert_eq!((report.total, report.valid, report.published), (3, 2, 2));
    assert_eq!(publisher.queue_status().await.unwrap().queue_length, 2);

    let summary = pipeline.worker.run(pipeline.shutdown.clone()).await.unwrap();
    assert_eq!(summary.attempted, 2);
    assert_eq!(summary.processed, 1);

    let stats = pipeline.worker.stats().await.unwrap();
    assert_eq!(stats.queue_length, 0);
    assert_eq!(stats.database.completed, 1);
    assert_eq!(stats.database.failed, 1);

    let failed = pipeline.repository.find_by_url(&slow).await.unwrap().unwrap();
    assert_eq!(failed.id, "article_2");

    let recent = pipeline.repository.recent(10).await.unwrap();
    assert_eq!(recent.len(), 2);
    // the slow task was created after the first one finished
    assert_eq!(recent[0].url, slow);
}

#[tokio::test]
async fn test_queue_length_moves_by_one_per_push_and_pop() {
    let pipeline = pipeline().await;
    let queue = &pipeline.queue;

    assert_eq!(queue.length().await.unwrap(), 0);
    for (n, id) in ["q1", "q2", "q3"].into_iter().enumerate() {
        queue
            .push(&Task::new(id, &format!("https://site.test/{id}"), "feed", "news"))
            .await
            .unwrap();
        assert_eq!(queue.length().await.unwrap(), n as u64 + 1);
    }

    for expected_id in ["q1", "q2", "q3"] {
        let before = queue.length().await.unwrap();
        let task = queue
            .pop(std::time::Duration::from_secs(1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(task.id, expected_id);
        assert_eq!(queue.length().await.unwrap(), before - 1);
    }

    assert!(queue.pop(std::time::Duration::from_secs(1)).await.unwrap().is_none());
    assert_eq!(queue.length().await.unwrap(), 0);
}
