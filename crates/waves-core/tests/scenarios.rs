// End-to-end checks of the engine against worked examples: table lookups,
// pitch-by-pitch and appearance-ending plays, and the ranked strategy view.

use waves_core::*;

const EPS: f64 = 1e-9;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < EPS
}

#[test]
fn empty_bases_no_outs_fresh_count() {
    assert!(approx(run_expectancy(0, RunnerState::Empty, Count::FRESH), 0.48));
}

#[test]
fn runner_on_first_one_ball() {
    assert!(approx(run_expectancy(0, RunnerState::First, Count::new(1, 0)), 0.88));
}

#[test]
fn taking_ball_one_with_runner_on_first() {
    let after = AfterState::new(0, RunnerState::First).with_count(Count::new(1, 0));
    assert!(approx(after_run_expectancy(after, Outcome::BallTaken), 0.88));
    assert!(approx(pev(0, 0.85, after, Outcome::BallTaken), 0.03));
}

#[test]
fn double_play_from_empty_bases() {
    let after = AfterState::new(2, RunnerState::Empty);
    assert!(approx(after_run_expectancy(after, Outcome::DoublePlay), 0.10));
    let value = pev(0, 0.48, after, Outcome::DoublePlay);
    assert!(approx(value, 0.10 - 0.48 + outcome::DOUBLE_PLAY_PENALTY));
    assert!(value < -0.8);
}

fn commit(before: &Situation, action: Action, result: PlayResult) -> PlayRecord {
    let result = PlayResult { action, ..result };
    PlayRecord::compute(format!("{:?}", result), "2025-06-01", before, &result)
}

#[test]
fn ranked_strategies_for_repeated_situation() {
    let before = Situation {
        runners: RunnerState::First,
        ..Situation::default()
    };
    let base = PlayResult {
        action: Action::Attack,
        outcome: Outcome::Single,
        runs_scored: 0,
        next_outs: 0,
        next_runners: RunnerState::FirstSecond,
        next_count: Count::FRESH,
        pitch_count: None,
    };

    let mut records = vec![
        commit(&before, Action::Attack, base.clone()),
        commit(
            &before,
            Action::Attack,
            PlayResult {
                outcome: Outcome::Grounder,
                next_outs: 1,
                next_runners: RunnerState::Second,
                ..base.clone()
            },
        ),
        commit(
            &before,
            Action::Take,
            PlayResult {
                outcome: Outcome::BallTaken,
                next_runners: RunnerState::First,
                next_count: Count::new(1, 0),
                ..base.clone()
            },
        ),
    ];
    // Same PEVs as the worked example: 0.40 and 0.20 swinging away, 0.03 taking.
    records[0].pev = 0.40;
    records[1].pev = 0.20;
    assert!(approx(records[2].pev, 0.03));

    let stats = aggregate(&before.fingerprint(), &records);
    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0].action, Action::Attack);
    assert_eq!(stats[0].count, 2);
    assert!(approx(stats[0].avg_pev, 0.30));
    assert_eq!(stats[1].action, Action::Take);
    assert_eq!(stats[1].count, 1);
    assert!(approx(stats[1].avg_pev, 0.03));
}

#[test]
fn aggregate_invariants_hold_over_mixed_history() {
    let outcomes = [
        Outcome::Single,
        Outcome::Grounder,
        Outcome::Walk,
        Outcome::StrikeoutLooking,
        Outcome::DoublePlay,
        Outcome::Foul,
        Outcome::Error,
    ];
    let mut records = Vec::new();
    for (i, outcome) in outcomes.iter().enumerate() {
        for (j, action) in Action::ALL.iter().enumerate() {
            let before = Situation {
                outs: (i % 2) as u8,
                runners: RunnerState::ALL[j % 8],
                ..Situation::default()
            };
            let result = PlayResult {
                action: *action,
                outcome: *outcome,
                runs_scored: (i % 3) as u32,
                next_outs: (i % 2) as u8 + 1,
                next_runners: RunnerState::ALL[(i + j) % 8],
                next_count: Count::new(1, 1),
                pitch_count: Some((i + j) as u32 % 7),
            };
            records.push(PlayRecord::compute(format!("{i}-{j}"), "2025-06-01", &before, &result));
        }
    }

    let mut fingerprints: Vec<String> = records.iter().map(|r| r.state_id.clone()).collect();
    fingerprints.sort();
    fingerprints.dedup();

    for fp in fingerprints {
        let stats = aggregate(&fp, &records);
        let matching = records.iter().filter(|r| r.state_id == fp).count();
        assert_eq!(total_samples(&stats), matching);
        for pair in stats.windows(2) {
            assert!(pair[0].avg_pev >= pair[1].avg_pev);
        }
        for s in &stats {
            assert!((0.0..=1.0).contains(&s.success_rate));
        }
    }
}
