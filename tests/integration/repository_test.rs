// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::memory_repository;
use chrono::Utc;
use harvestr::domain::models::article::{Article, ArticleStatus, ScrapedContent};
use harvestr::domain::models::task::Task;
use harvestr::domain::repositories::article_repository::{ArticleRepository, ArticleStats};

fn task(url: &str) -> Task {
    Task::new("r1", url, "news", "world").with_priority("low")
}

#[tokio::test]
async fn test_last_write_wins_per_url() {
    let repository = memory_repository().await;
    let url = "https://example.org/story";

    let completed = Article::completed(
        task(url),
        ScrapedContent {
            title: "Story".to_string(),
            content: "Body".to_string(),
            scraped_at: Utc::now(),
        },
    );
    repository.save(&completed).await.unwrap();
    repository
        .save(&Article::failed(task(url), "Request timed out"))
        .await
        .unwrap();

    let stored = repository.find_by_url(url).await.unwrap().unwrap();
    assert_eq!(stored.status, ArticleStatus::Failed);
    assert_eq!(stored.title, None);
    assert_eq!(stored.priority, "low");
    assert_eq!(
        repository.stats().await.unwrap(),
        ArticleStats {
            total: 1,
            completed: 0,
            failed: 1,
            pending: 0
        }
    );
}

#[tokio::test]
async fn test_recent_is_requeried_each_time() {
    let repository = memory_repository().await;

    repository
        .save(&Article::pending(task("https://example.org/1")))
        .await
        .unwrap();
    assert_eq!(repository.recent(5).await.unwrap().len(), 1);

    repository
        .save(&Article::pending(task("https://example.org/2")))
        .await
        .unwrap();
    let recent = repository.recent(5).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].url, "https://example.org/2");
    assert!(recent[0].created_at >= recent[1].created_at);
}
