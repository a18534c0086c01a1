//! Property tests for the progression state machine.

use proptest::prelude::*;
use uuid::Uuid;

use pathway::domain::models::{InvestigateCount, ProgressionCounts, School, Stage, StageCount, StageThresholds};
use pathway::services::plan;

/// A persisted school whose flags respect stage order.
fn school_strategy() -> impl Strategy<Value = School> {
    (0usize..=3, any::<bool>(), 0u32..5).prop_map(|(completed, quiz, rounds)| {
        let mut school = School::new("Property Primary");
        school.inspire_completed = completed >= 1;
        school.investigate_completed = completed >= 2;
        school.act_completed = completed >= 3;
        school.award_completed = completed >= 3;
        school.audit_quiz_completed = quiz;
        school.rounds_completed = rounds + u32::from(completed >= 3);
        school
    })
}

fn counts_strategy() -> impl Strategy<Value = ProgressionCounts> {
    (0u32..6, 0u32..4, 0u32..4, 0u32..3, any::<bool>(), any::<bool>(), 0u32..6, 0u32..4).prop_map(
        |(ia, io, va, vo, quiz, plan, aa, ao)| ProgressionCounts {
            school_id: Uuid::nil(),
            round_number: 1,
            inspire: StageCount::new(ia, io),
            investigate: InvestigateCount::new(va, vo, quiz, plan),
            act: StageCount::new(aa, ao),
        },
    )
}

proptest! {
    #[test]
    fn flags_are_never_cleared(school in school_strategy(), counts in counts_strategy()) {
        let next = plan(&school, &counts, &StageThresholds::default()).next;
        for stage in Stage::ALL {
            prop_assert!(!school.is_completed(stage) || next.is_completed(stage));
        }
        prop_assert!(!school.award_completed || next.award_completed);
        prop_assert!(!school.audit_quiz_completed || next.audit_quiz_completed);
    }

    #[test]
    fn stage_order_is_preserved(school in school_strategy(), counts in counts_strategy()) {
        let next = plan(&school, &counts, &StageThresholds::default()).next;
        prop_assert!(next.flags_are_monotonic());
        prop_assert!(next.cache_is_consistent());
    }

    #[test]
    fn percentage_follows_flags(school in school_strategy(), counts in counts_strategy()) {
        let next = plan(&school, &counts, &StageThresholds::default()).next;
        let expected = if next.act_completed {
            100
        } else if next.investigate_completed {
            67
        } else if next.inspire_completed {
            33
        } else {
            0
        };
        prop_assert_eq!(next.progress_percentage, expected);
    }

    #[test]
    fn planning_twice_changes_nothing(school in school_strategy(), counts in counts_strategy()) {
        let thresholds = StageThresholds::default();
        let first = plan(&school, &counts, &thresholds);
        let second = plan(&first.next, &counts, &thresholds);
        prop_assert!(!second.changed);
        prop_assert!(second.completed.is_empty());
    }

    #[test]
    fn round_counted_once_per_award(school in school_strategy(), counts in counts_strategy()) {
        let result = plan(&school, &counts, &StageThresholds::default());
        let awarded_now = result.completed.contains(&Stage::Act);
        prop_assert_eq!(
            result.next.rounds_completed,
            school.rounds_completed + u32::from(awarded_now)
        );
    }
}
