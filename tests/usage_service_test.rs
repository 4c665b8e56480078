// ABOUTME: Integration tests for the usage aggregation service
// ABOUTME: Uses fixed clocks to pin the trailing window and day ordering
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chrono::{DateTime, Duration, TimeZone, Utc};
use common::{create_test_server_resources, create_tracker, insert_raw_message, log_tokens, new_user};
use expense_tracker::errors::ErrorCode;
use expense_tracker::models::{MessageRole, TrackerType, UsageCounters};

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
}

#[tokio::test]
async fn test_empty_ledger_yields_zero_counters() {
    let resources = create_test_server_resources().await.unwrap();
    let user = new_user();

    let usage = resources
        .usage_service
        .overall_usage_at(&user, fixed_now())
        .await
        .unwrap();

    assert_eq!(usage.overall, UsageCounters::default());
    assert!(usage.by_tracker.is_empty());
    assert!(usage.recent_activity.is_empty());
}

#[tokio::test]
async fn test_window_boundary_is_inclusive() {
    let resources = create_test_server_resources().await.unwrap();
    let user = new_user();
    let now = fixed_now();
    let db = &resources.database;
    insert_raw_message(db, &user.user_id, "t1", "user", 1, now - Duration::days(30)).await;
    insert_raw_message(db, &user.user_id, "t1", "user", 2, now - Duration::days(30) - Duration::seconds(1)).await;

    let usage = resources
        .usage_service
        .overall_usage_at(&user, now)
        .await
        .unwrap();

    assert_eq!(usage.overall.total_messages, 2);
    assert_eq!(usage.recent_activity.len(), 1);
    assert_eq!(usage.recent_activity[0].date, "2025-05-16");
    assert_eq!(usage.recent_activity[0].token_count, 1);
}

#[tokio::test]
async fn test_recent_activity_merges_trackers_per_day() {
    let resources = create_test_server_resources().await.unwrap();
    let user = new_user();
    let now = fixed_now();
    let db = &resources.database;
    insert_raw_message(db, &user.user_id, "t1", "user", 3, now - Duration::hours(2)).await;
    insert_raw_message(db, &user.user_id, "t2", "assistant", 4, now - Duration::hours(1)).await;
    insert_raw_message(db, &user.user_id, "t2", "user", 5, now - Duration::days(3)).await;

    let usage = resources
        .usage_service
        .overall_usage_at(&user, now)
        .await
        .unwrap();

    let days: Vec<(&str, u64, u64)> = usage
        .recent_activity
        .iter()
        .map(|d| (d.date.as_str(), d.message_count, d.token_count))
        .collect();
    assert_eq!(days, [("2025-06-12", 1, 5), ("2025-06-15", 2, 7)]);
    assert_eq!(usage.by_tracker.len(), 2);
}

#[tokio::test]
async fn test_by_tracker_ties_keep_a_stable_order() {
    let resources = create_test_server_resources().await.unwrap();
    let user = new_user();
    let now = fixed_now();
    let db = &resources.database;
    for tracker in ["b-tracker", "a-tracker", "c-tracker"] {
        insert_raw_message(db, &user.user_id, tracker, "user", 1, now).await;
    }
    insert_raw_message(db, &user.user_id, "c-tracker", "user", 1, now).await;

    let usage = resources
        .usage_service
        .overall_usage_at(&user, now)
        .await
        .unwrap();

    let ids: Vec<&str> = usage
        .by_tracker
        .iter()
        .map(|row| row.tracker_id.as_str())
        .collect();
    assert_eq!(ids, ["c-tracker", "a-tracker", "b-tracker"]);
    assert!(usage.by_tracker.iter().all(|row| row.tracker_name == "Unknown"));
}

#[tokio::test]
async fn test_tracker_usage_daily_usage_is_newest_first() {
    let resources = create_test_server_resources().await.unwrap();
    let user = new_user();
    let tracker = create_tracker(&resources, &user, "Rent", TrackerType::Personal).await;
    let now = fixed_now();
    let db = &resources.database;
    for days_ago in [1, 10, 4] {
        insert_raw_message(db, &user.user_id, &tracker.id, "user", 2, now - Duration::days(days_ago)).await;
    }

    let usage = resources
        .usage_service
        .tracker_usage_at(&user, &tracker.id, now)
        .await
        .unwrap();

    let dates: Vec<&str> = usage.daily_usage.iter().map(|d| d.date.as_str()).collect();
    assert_eq!(dates, ["2025-06-14", "2025-06-11", "2025-06-05"]);
    assert_eq!(usage.counters.total_tokens, 6);
}

#[tokio::test]
async fn test_tracker_usage_counts_lifetime_but_windows_daily() {
    let resources = create_test_server_resources().await.unwrap();
    let user = new_user();
    let tracker = create_tracker(&resources, &user, "Old", TrackerType::Business).await;
    let now = fixed_now();
    insert_raw_message(&resources.database, &user.user_id, &tracker.id, "assistant", 9, now - Duration::days(90)).await;

    let usage = resources
        .usage_service
        .tracker_usage_at(&user, &tracker.id, now)
        .await
        .unwrap();

    assert_eq!(usage.counters.total_messages, 1);
    assert_eq!(usage.counters.ai_messages, 1);
    assert!(usage.daily_usage.is_empty());
    assert_eq!(usage.messages.len(), 1);
}

#[tokio::test]
async fn test_tracker_usage_rejects_sentinels_before_lookup() {
    let resources = create_test_server_resources().await.unwrap();
    let user = new_user();

    for raw in ["undefined", " null ", "", "a/b"] {
        let error = resources
            .usage_service
            .tracker_usage(&user, raw)
            .await
            .unwrap_err();
        assert_eq!(error.code, ErrorCode::InvalidInput, "tracker id {raw:?}");
    }
}

#[tokio::test]
async fn test_tracker_usage_hides_other_users_trackers() {
    let resources = create_test_server_resources().await.unwrap();
    let owner = new_user();
    let other = new_user();
    let tracker = create_tracker(&resources, &owner, "Mine", TrackerType::Personal).await;

    let error = resources
        .usage_service
        .tracker_usage(&other, &tracker.id)
        .await
        .unwrap_err();

    assert_eq!(error.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_log_message_counts_tokens_and_stamps_time() {
    let resources = create_test_server_resources().await.unwrap();
    let user = new_user();
    let before = Utc::now() - Duration::seconds(1);

    let message = log_tokens(&resources, &user, "any-tracker", MessageRole::User, 12).await;

    assert_eq!(message.token_count, 12);
    assert_eq!(message.user_id, user.user_id);
    assert_eq!(message.tracker_id, "any-tracker");
    assert!(message.timestamp >= before);
    assert!(!message.id.is_empty());
}

#[tokio::test]
async fn test_empty_content_is_a_zero_token_message() {
    let resources = create_test_server_resources().await.unwrap();
    let user = new_user();

    let message = resources
        .usage_service
        .log_message(&user, "t1", MessageRole::Assistant, "")
        .await
        .unwrap();
    let usage = resources.usage_service.overall_usage(&user).await.unwrap();

    assert_eq!(message.token_count, 0);
    assert_eq!(usage.overall.total_messages, 1);
    assert_eq!(usage.overall.total_tokens, 0);
    assert_eq!(usage.overall.ai_messages, 1);
}
