//! Concurrent reviews against one school.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use helpers::{setup, setup_file_backed, test_config, wait_for};
use pathway::domain::models::{EvidenceStatus, Stage};
use pathway::services::{EvidenceSubmission, ProgressionService};

#[tokio::test]
async fn test_concurrent_approvals_award_once() {
    let (ctx, _dir) = setup_file_backed().await;
    let school = ctx.register("Summerfield").await;
    ctx.approve_n(school.id, Stage::Inspire, 3).await;
    ctx.complete_investigate_signals(school.id).await;

    let mut pending = Vec::new();
    for _ in 0..50 {
        let evidence = ctx
            .service
            .submit_evidence(EvidenceSubmission {
                school_id: school.id,
                stage: Stage::Act,
                requirement_id: None,
                submitted_by: "teacher".to_string(),
            })
            .await
            .unwrap();
        pending.push(evidence.id);
    }

    let service = Arc::new(ProgressionService::from_sqlite(
        ctx.pool.clone(),
        &test_config(),
        ctx.notifier.clone(),
    ));
    let handles: Vec<_> = pending
        .into_iter()
        .map(|id| {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .review_evidence(id, EvidenceStatus::Approved, "reviewer", None)
                    .await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let school = ctx.service.get_school(school.id).await.unwrap();
    assert!(school.award_completed);
    assert_eq!(school.rounds_completed, 1);
    assert!(school.flags_are_monotonic());
    assert!(school.cache_is_consistent());

    let certificates = ctx.service.list_certificates(school.id).await.unwrap();
    assert_eq!(certificates.len(), 1);

    let notifier = ctx.notifier.clone();
    assert!(wait_for(|| notifier.awards() >= 1, Duration::from_secs(5)).await);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(notifier.awards(), 1);
}

#[tokio::test]
async fn test_concurrent_evaluations_are_idempotent() {
    let ctx = setup().await;
    let school = ctx.register("Willowbrook").await;
    ctx.approve_n(school.id, Stage::Inspire, 2).await;
    sqlx::query(
        "INSERT INTO evidence (id, school_id, stage, round_number, status, submitted_at) VALUES (?, ?, 'inspire', 1, 'approved', ?)",
    )
    .bind(uuid::Uuid::new_v4().to_string())
    .bind(school.id.to_string())
    .bind(chrono::Utc::now().to_rfc3339())
    .execute(&ctx.pool)
    .await
    .unwrap();

    let service = Arc::new(ProgressionService::from_sqlite(
        ctx.pool.clone(),
        &test_config(),
        ctx.notifier.clone(),
    ));
    let outcomes = futures::future::join_all((0..10).map(|_| {
        let service = service.clone();
        async move { service.evaluate(school.id).await }
    }))
    .await;

    let writers = outcomes
        .into_iter()
        .map(Result::unwrap)
        .filter(|outcome| outcome.completed.contains(&Stage::Inspire))
        .count();
    assert_eq!(writers, 1, "exactly one evaluation completes the stage");

    let notifier = ctx.notifier.clone();
    assert!(wait_for(|| notifier.stage_completions(Stage::Inspire) == 1, Duration::from_secs(5)).await);
}
