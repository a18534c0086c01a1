//! End-to-end progression through a round and into the next one.

mod helpers;

use std::time::Duration;

use helpers::{requirement_id, setup, wait_for};
use pathway::domain::models::{EvidenceStatus, Stage};
use pathway::services::{EvidenceSubmission, OverrideToggle};
use pathway::DomainError;

#[tokio::test]
async fn test_full_round_awards_certificate_and_notifies() {
    let ctx = setup().await;
    let school = ctx.register("Hillside Primary").await;

    let school = ctx.approve_n(school.id, Stage::Inspire, 3).await;
    assert!(school.inspire_completed);
    assert_eq!(school.current_stage, Stage::Investigate);
    assert_eq!(school.progress_percentage, 33);

    ctx.complete_investigate_signals(school.id).await;
    let school = ctx.service.get_school(school.id).await.unwrap();
    assert!(school.investigate_completed);
    assert!(school.audit_quiz_completed);
    assert_eq!(school.progress_percentage, 67);

    let school = ctx.approve_n(school.id, Stage::Act, 3).await;
    assert!(school.act_completed);
    assert!(school.award_completed);
    assert_eq!(school.current_stage, Stage::Act);
    assert_eq!(school.progress_percentage, 100);
    assert_eq!(school.rounds_completed, 1);

    let certificates = ctx.service.list_certificates(school.id).await.unwrap();
    assert_eq!(certificates.len(), 1);
    assert_eq!(certificates[0].round_number, 1);
    assert!(certificates[0].certificate_number.starts_with("R1-"));
    assert_eq!(certificates[0].metadata.achievement.act_items, 3);

    let notifier = ctx.notifier.clone();
    assert!(wait_for(|| notifier.awards() == 1, Duration::from_secs(5)).await);
    assert!(wait_for(|| notifier.stage_completions(Stage::Inspire) == 1, Duration::from_secs(5)).await);
    assert!(wait_for(|| notifier.stage_completions(Stage::Investigate) == 1, Duration::from_secs(5)).await);
    assert_eq!(notifier.stage_completions(Stage::Act), 0);
}

#[tokio::test]
async fn test_threshold_boundary() {
    let ctx = setup().await;
    let school = ctx.register("Brook Lane").await;

    let school = ctx.approve_n(school.id, Stage::Inspire, 2).await;
    assert!(!school.inspire_completed);
    assert_eq!(school.progress_percentage, 0);

    let school = ctx
        .approve(school.id, Stage::Inspire, Some(requirement_id(Stage::Inspire, 3)))
        .await;
    assert!(school.inspire_completed);
}

#[tokio::test]
async fn test_override_fills_the_gap() {
    let ctx = setup().await;
    let school = ctx.register("Oak Tree Academy").await;
    ctx.approve_n(school.id, Stage::Inspire, 2).await;

    let result = ctx
        .service
        .toggle_override(OverrideToggle {
            school_id: school.id,
            requirement_id: requirement_id(Stage::Inspire, 3),
            stage: Stage::Inspire,
            round_number: 1,
            admin_id: "admin".to_string(),
        })
        .await
        .unwrap();
    assert!(result.created);

    let school = ctx.service.get_school(school.id).await.unwrap();
    assert!(school.inspire_completed);

    let counts = ctx.service.get_progression_counts(school.id, None).await.unwrap();
    assert_eq!(counts.inspire.approved, 2);
    assert_eq!(counts.inspire.overrides, 1);
    assert_eq!(counts.inspire.total, 3);
}

#[tokio::test]
async fn test_override_on_covered_requirement_adds_nothing() {
    let ctx = setup().await;
    let school = ctx.register("Riverside").await;
    ctx.approve_n(school.id, Stage::Inspire, 2).await;

    ctx.service
        .toggle_override(OverrideToggle {
            school_id: school.id,
            requirement_id: requirement_id(Stage::Inspire, 1),
            stage: Stage::Inspire,
            round_number: 1,
            admin_id: "admin".to_string(),
        })
        .await
        .unwrap();

    let counts = ctx.service.get_progression_counts(school.id, None).await.unwrap();
    assert_eq!(counts.inspire.total, 2);
    assert!(!ctx.service.get_school(school.id).await.unwrap().inspire_completed);
}

#[tokio::test]
async fn test_flags_survive_override_removal() {
    let ctx = setup().await;
    let school = ctx.register("Meadow View").await;
    ctx.approve_n(school.id, Stage::Inspire, 2).await;

    let toggle = OverrideToggle {
        school_id: school.id,
        requirement_id: requirement_id(Stage::Inspire, 3),
        stage: Stage::Inspire,
        round_number: 1,
        admin_id: "admin".to_string(),
    };
    assert!(ctx.service.toggle_override(toggle.clone()).await.unwrap().created);
    assert!(!ctx.service.toggle_override(toggle).await.unwrap().created);

    let school = ctx.service.get_school(school.id).await.unwrap();
    assert!(school.inspire_completed, "completion flags are never cleared");
    assert!(ctx.service.list_overrides(school.id, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_new_round_resets_flags_and_keeps_history() {
    let ctx = setup().await;
    let school = ctx.register("Northgate").await;
    ctx.complete_round(school.id).await;

    let school = ctx.service.start_new_round(school.id).await.unwrap();
    assert_eq!(school.current_round, 2);
    assert_eq!(school.rounds_completed, 1);
    assert!(!school.inspire_completed);
    assert!(!school.award_completed);
    assert!(school.audit_quiz_completed, "audit is lifetime state");
    assert_eq!(school.current_stage, Stage::Inspire);
    assert_eq!(school.progress_percentage, 0);

    let counts = ctx.service.get_progression_counts(school.id, None).await.unwrap();
    assert_eq!(counts.round_number, 2);
    assert_eq!(counts.inspire.total, 0);

    let history = ctx.service.get_progression_counts(school.id, Some(1)).await.unwrap();
    assert_eq!(history.inspire.total, 3);
    assert_eq!(history.act.total, 3);
    assert_eq!(ctx.service.list_evidence(school.id, Some(1)).await.unwrap().len(), 6);
    assert!(ctx.service.list_evidence(school.id, Some(2)).await.unwrap().is_empty());

    let err = ctx.service.start_new_round(school.id).await.unwrap_err();
    assert!(matches!(err, DomainError::InvalidState(_)));
}

#[tokio::test]
async fn test_second_round_issues_its_own_certificate() {
    let ctx = setup().await;
    let school = ctx.register("Westfield").await;
    ctx.complete_round(school.id).await;
    ctx.service.start_new_round(school.id).await.unwrap();

    ctx.approve_n(school.id, Stage::Inspire, 3).await;
    // Audit and action plan carry over, so Investigate completes with Inspire
    let school = ctx.service.get_school(school.id).await.unwrap();
    assert!(school.investigate_completed);

    let school = ctx.approve_n(school.id, Stage::Act, 3).await;
    assert!(school.award_completed);
    assert_eq!(school.rounds_completed, 2);

    let rounds: Vec<u32> = ctx
        .service
        .list_certificates(school.id)
        .await
        .unwrap()
        .iter()
        .map(|c| c.round_number)
        .collect();
    assert_eq!(rounds, vec![1, 2]);
}

#[tokio::test]
async fn test_submission_rejected_once_round_awarded() {
    let ctx = setup().await;
    let school = ctx.register("Greenacre").await;
    ctx.complete_round(school.id).await;

    let err = ctx
        .service
        .submit_evidence(EvidenceSubmission {
            school_id: school.id,
            stage: Stage::Act,
            requirement_id: None,
            submitted_by: "teacher".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidState(_)));
}

#[tokio::test]
async fn test_review_is_one_way() {
    let ctx = setup().await;
    let school = ctx.register("Elm Park").await;
    let evidence = ctx
        .service
        .submit_evidence(EvidenceSubmission {
            school_id: school.id,
            stage: Stage::Inspire,
            requirement_id: None,
            submitted_by: "teacher".to_string(),
        })
        .await
        .unwrap();

    ctx.service
        .review_evidence(evidence.id, EvidenceStatus::Rejected, "reviewer", Some("blurry photo".to_string()))
        .await
        .unwrap();
    let err = ctx
        .service
        .review_evidence(evidence.id, EvidenceStatus::Approved, "reviewer", None)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidState(_)));
}

#[tokio::test]
async fn test_investigate_counts_evidence_quiz_and_plan() {
    let ctx = setup().await;
    let school = ctx.register("Riverside Academy").await;
    ctx.approve_n(school.id, Stage::Inspire, 3).await;
    ctx.approve(school.id, Stage::Investigate, Some(requirement_id(Stage::Investigate, 1)))
        .await;
    ctx.complete_investigate_signals(school.id).await;

    let counts = ctx.service.get_progression_counts(school.id, None).await.unwrap();
    assert_eq!(counts.investigate.approved, 1);
    assert!(counts.investigate.has_quiz);
    assert!(counts.investigate.has_action_plan);
    assert_eq!(counts.investigate.total, 3);

    let school = ctx.service.get_school(school.id).await.unwrap();
    assert!(school.investigate_completed);
    assert_eq!(school.current_stage, Stage::Act);
    assert_eq!(school.progress_percentage, 67);
}
