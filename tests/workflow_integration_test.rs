use chrono::NaiveDate;
use league_handicap::core::workflow::{match_day_status, player_index, MatchOutcome};
use league_handicap::domain::model::{
    Course, CourseId, Match, MatchDay, MatchDayId, MatchDayStatus, MatchId, PlayerHandicap,
    PlayerId, ScoreSubmission, SeasonId,
};
use league_handicap::{submit_scores, EngineError, InMemoryLeague};

const ANN: [i32; 9] = [5, 4, 6, 5, 5, 4, 6, 5, 5];
const BOB: [i32; 9] = [6, 4, 7, 5, 6, 5, 6, 5, 6];
const CAT: [i32; 9] = [5, 3, 6, 4, 5, 3, 6, 4, 5];
const DAN: [i32; 9] = [6, 4, 6, 5, 6, 4, 7, 5, 5];

fn id(s: &str) -> PlayerId {
    PlayerId::new(s)
}

fn day_id(s: &str) -> MatchDayId {
    MatchDayId::new(s)
}

fn played(player: &str, match_id: &str, gross: &[i32]) -> ScoreSubmission {
    ScoreSubmission::played(id(player), MatchId::new(match_id), gross.to_vec())
}

/// Four players, three weekly match days on a neutral nine-hole course.
fn league() -> InMemoryLeague {
    let store = InMemoryLeague::new();
    store
        .add_course(Course {
            id: CourseId::new("front"),
            name: "Front Nine".to_string(),
            pars: vec![4, 3, 5, 4, 4, 3, 5, 4, 4],
            stroke_indices: vec![1, 7, 3, 5, 2, 9, 4, 6, 8],
            course_rating: 36.0,
            slope_rating: 113,
            par: 36,
        })
        .unwrap();

    for (player, provisional) in [("ann", 10.0), ("bob", 14.0), ("cat", 8.0), ("dan", 12.0)] {
        store
            .add_player(PlayerHandicap::seeded(id(player), player, provisional))
            .unwrap();
    }

    let schedule = [
        ("week-1", 7, [("m1", "ann", "bob"), ("m2", "cat", "dan")]),
        ("week-2", 14, [("m3", "ann", "cat"), ("m4", "bob", "dan")]),
        ("week-3", 21, [("m5", "ann", "dan"), ("m6", "bob", "cat")]),
    ];
    for (day, date, matches) in schedule {
        store
            .add_match_day(MatchDay {
                id: day_id(day),
                season_id: SeasonId::new("2024"),
                date: NaiveDate::from_ymd_opt(2024, 5, date).unwrap(),
                course_id: CourseId::new("front"),
                status: MatchDayStatus::Scheduled,
            })
            .unwrap();
        for (match_id, a, b) in matches {
            store
                .add_match(Match::scheduled(
                    MatchId::new(match_id),
                    day_id(day),
                    CourseId::new("front"),
                    id(a),
                    id(b),
                ))
                .unwrap();
        }
    }

    store
}

fn week_one_batch() -> Vec<ScoreSubmission> {
    vec![
        played("ann", "m1", &ANN),
        played("bob", "m1", &BOB),
        played("cat", "m2", &CAT),
        played("dan", "m2", &DAN),
    ]
}

#[test]
fn test_full_batch_completes_match_day() {
    let store = league();
    let report = submit_scores(&store, &day_id("week-1"), &week_one_batch()).unwrap();

    assert_eq!(report.status, MatchDayStatus::Completed);
    assert!(!report.is_partial());
    assert_eq!(report.matches.len(), 2);
    assert_eq!(report.handicap_updates.len(), 4);

    // Bob (playing handicap 13) gets 3 strokes from Ann (10) on stroke index 1-3.
    match &report.matches[0] {
        MatchOutcome::Scored {
            points, strokes, ..
        } => {
            assert_eq!((points.points_a, points.points_b), (15, 7));
            assert_eq!(strokes[&id("ann")], vec![0; 9]);
            assert_eq!(strokes[&id("bob")], vec![1, 0, 1, 0, 1, 0, 0, 0, 0]);
        }
        other => panic!("expected a scored match, got {:?}", other),
    }
    for outcome in &report.matches {
        if let MatchOutcome::Scored { points, .. } = outcome {
            assert_eq!(points.total(), 22);
        }
    }

    // One round: (2 * provisional + differential) / 3.
    assert_eq!(store.player(&id("ann")).unwrap().index, 9.7);
    assert_eq!(store.player(&id("bob")).unwrap().index, 14.0);

    let stored = store.get_match(&MatchId::new("m1")).unwrap();
    assert_eq!(stored.status, MatchDayStatus::Completed);
    assert_eq!(stored.points.unwrap().points_a, 15);
}

#[test]
fn test_single_sided_match_is_deferred() {
    let store = league();
    let report =
        submit_scores(&store, &day_id("week-1"), &[played("ann", "m1", &ANN)]).unwrap();

    assert_eq!(report.status, MatchDayStatus::Scheduled);
    assert_eq!(
        report.matches,
        vec![MatchOutcome::Pending {
            match_id: MatchId::new("m1"),
            waiting_for: vec![id("bob")],
        }]
    );
    // The handicap still moves on a single submission.
    assert_eq!(report.handicap_updates.len(), 1);
    assert!(store.get_match(&MatchId::new("m1")).unwrap().points.is_none());

    let report =
        submit_scores(&store, &day_id("week-1"), &[played("bob", "m1", &BOB)]).unwrap();
    assert!(matches!(report.matches[0], MatchOutcome::Scored { .. }));
    // m2 still has no scores
    assert_eq!(report.status, MatchDayStatus::Scheduled);
}

#[test]
fn test_invalid_entries_become_warnings() {
    let store = league();
    let batch = vec![
        played("ann", "m1", &ANN),
        played("bob", "m1", &BOB[..8]),
        played("cat", "m9", &CAT),
        played("dan", "m1", &DAN),
        played("ann", "m1", &BOB),
    ];

    let report = submit_scores(&store, &day_id("week-1"), &batch).unwrap();

    assert!(report.is_partial());
    assert_eq!(report.warnings.len(), 4);
    assert_eq!(report.handicap_updates.len(), 1);
    assert_eq!(report.handicap_updates[0].player_id, id("ann"));
    // The first entry for Ann wins; the duplicate is ignored.
    assert_eq!(report.handicap_updates[0].adjusted_gross, 45);
    assert_eq!(store.differentials(&id("ann")).unwrap().len(), 1);
    assert!(store.differentials(&id("bob")).unwrap().is_empty());
}

#[test]
fn test_batch_with_only_invalid_entries_commits_nothing() {
    let store = league();
    let report =
        submit_scores(&store, &day_id("week-2"), &[played("ann", "m3", &[4, 4])]).unwrap();

    assert_eq!(report.warnings.len(), 1);
    assert!(report.locked_days.is_empty());
    assert_eq!(store.player(&id("ann")).unwrap().index, 10.0);
    assert_eq!(
        match_day_status(&store, &day_id("week-1")).unwrap(),
        MatchDayStatus::Scheduled
    );
}

#[test]
fn test_later_scores_lock_earlier_days() {
    let store = league();
    submit_scores(&store, &day_id("week-1"), &week_one_batch()).unwrap();

    let report =
        submit_scores(&store, &day_id("week-2"), &[played("ann", "m3", &ANN)]).unwrap();
    assert_eq!(report.locked_days, vec![day_id("week-1")]);
    assert_eq!(
        match_day_status(&store, &day_id("week-1")).unwrap(),
        MatchDayStatus::Locked
    );
    assert_eq!(
        store.get_match(&MatchId::new("m2")).unwrap().status,
        MatchDayStatus::Locked
    );

    // Week 3 locks week 2 even though week 2 never completed.
    let report =
        submit_scores(&store, &day_id("week-3"), &[played("dan", "m5", &DAN)]).unwrap();
    assert_eq!(report.locked_days, vec![day_id("week-2")]);
    assert_eq!(
        match_day_status(&store, &day_id("week-2")).unwrap(),
        MatchDayStatus::Locked
    );
}

#[test]
fn test_locked_day_rejects_writes_without_side_effects() {
    let store = league();
    submit_scores(&store, &day_id("week-1"), &week_one_batch()).unwrap();
    submit_scores(&store, &day_id("week-2"), &[played("ann", "m3", &ANN)]).unwrap();

    let matches_before = store.matches().unwrap();
    let players_before = store.players().unwrap();

    for _ in 0..2 {
        let err = submit_scores(&store, &day_id("week-1"), &[played("ann", "m1", &CAT)])
            .unwrap_err();
        assert!(matches!(err, EngineError::StateViolation { .. }));
    }

    assert_eq!(store.matches().unwrap(), matches_before);
    assert_eq!(store.players().unwrap(), players_before);
}

#[test]
fn test_retried_batch_converges() {
    let store = league();
    let first = submit_scores(&store, &day_id("week-1"), &week_one_batch()).unwrap();
    let matches_after_first = store.matches().unwrap();
    let players_after_first = store.players().unwrap();

    let second = submit_scores(&store, &day_id("week-1"), &week_one_batch()).unwrap();

    assert_eq!(first, second);
    assert_eq!(store.matches().unwrap(), matches_after_first);
    assert_eq!(store.players().unwrap(), players_after_first);
    assert_eq!(store.differentials(&id("ann")).unwrap().len(), 1);
}

#[test]
fn test_completed_day_accepts_corrections() {
    let store = league();
    submit_scores(&store, &day_id("week-1"), &week_one_batch()).unwrap();

    // Ann's card was entered wrong: she actually shot 42.
    let corrected = [4, 4, 5, 5, 5, 4, 5, 5, 5];
    let report =
        submit_scores(&store, &day_id("week-1"), &[played("ann", "m1", &corrected)]).unwrap();

    assert_eq!(report.status, MatchDayStatus::Completed);
    assert_eq!(report.handicap_updates[0].differential, 6.0);
    // (2 * 10 + 6) / 3 = 8.67
    assert_eq!(store.player(&id("ann")).unwrap().index, 8.7);
    assert_eq!(store.differentials(&id("ann")).unwrap().len(), 1);
    let points = store.get_match(&MatchId::new("m1")).unwrap().points.unwrap();
    assert_eq!(points.total(), 22);
    assert!(points.points_a > 15);
}

#[test]
fn test_absent_player_gets_synthetic_scores() {
    let store = league();
    let batch = vec![
        played("ann", "m1", &ANN),
        ScoreSubmission::absent(id("bob"), MatchId::new("m1")),
    ];

    let report = submit_scores(&store, &day_id("week-1"), &batch).unwrap();

    assert_eq!(report.absences.len(), 1);
    let absence = &report.absences[0];
    assert_eq!(absence.playing_handicap, 13);
    assert_eq!(absence.scores.iter().sum::<i32>(), 36 + 13 + 3);
    assert_eq!(absence.posted_index, 14.0);
    assert_eq!(absence.adjusted_index, 16.0);

    // Absent rounds never feed the handicap index.
    assert!(store.differentials(&id("bob")).unwrap().is_empty());
    assert_eq!(
        player_index(&store, &SeasonId::new("2024"), &id("bob"))
            .unwrap()
            .index,
        14.0
    );
    assert!(matches!(report.matches[0], MatchOutcome::Scored { .. }));
}

#[test]
fn test_switching_to_absent_removes_differential() {
    let store = league();
    let batch = vec![played("ann", "m1", &ANN), played("bob", "m1", &[7; 9])];
    submit_scores(&store, &day_id("week-1"), &batch).unwrap();
    // Both par 3s cap at 6: adjusted 61, differential 25, (28 + 25) / 3
    assert_eq!(store.differentials(&id("bob")).unwrap().len(), 1);
    assert_eq!(store.player(&id("bob")).unwrap().index, 17.7);

    submit_scores(
        &store,
        &day_id("week-1"),
        &[ScoreSubmission::absent(id("bob"), MatchId::new("m1"))],
    )
    .unwrap();

    assert!(store.differentials(&id("bob")).unwrap().is_empty());
    assert_eq!(store.player(&id("bob")).unwrap().index, 14.0);
}

#[test]
fn test_second_week_plays_off_updated_index() {
    let store = league();
    submit_scores(&store, &day_id("week-1"), &week_one_batch()).unwrap();

    let report = submit_scores(
        &store,
        &day_id("week-2"),
        &[played("ann", "m3", &ANN), played("cat", "m3", &CAT)],
    )
    .unwrap();

    let ann = report
        .handicap_updates
        .iter()
        .find(|u| u.player_id == id("ann"))
        .unwrap();
    assert_eq!(ann.previous_index, 9.7);
    // (10 + 9 + 9) / 3
    assert_eq!(ann.index, 9.3);
}

#[test]
fn test_unknown_match_day_is_not_found() {
    let store = league();
    let err = submit_scores(&store, &day_id("week-9"), &week_one_batch()).unwrap_err();
    assert!(matches!(err, EngineError::NotFound { .. }));
}
