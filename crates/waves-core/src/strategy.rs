// Strategy aggregation: which action has historically paid off in a situation.

use serde::{Deserialize, Serialize};

use crate::outcome::Action;
use crate::record::PlayRecord;

/// Per-action summary for one situation fingerprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyStat {
    pub action: Action,
    pub count: usize,
    #[serde(rename = "avgPEV")]
    pub avg_pev: f64,
    /// Fraction of samples with a positive PEV.
    pub success_rate: f64,
    pub avg_pitches: f64,
}

/// Which slice of the history to aggregate over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    All,
    /// Only plays where the named team was batting.
    Team(String),
}

impl Scope {
    /// `Team` scope for the given offense, falling back to `All` when the
    /// offense is unknown.
    pub fn for_offense(team: Option<&str>) -> Self {
        match team {
            Some(name) if !name.trim().is_empty() => Scope::Team(name.to_string()),
            _ => Scope::All,
        }
    }

    pub fn includes(&self, record: &PlayRecord) -> bool {
        match self {
            Scope::All => true,
            Scope::Team(name) if name.trim().is_empty() => true,
            Scope::Team(name) => record.offense_team.as_deref() == Some(name.as_str()),
        }
    }
}

/// Records visible under `scope`, in their original order.
pub fn filter_scope<'a>(records: &'a [PlayRecord], scope: &Scope) -> Vec<&'a PlayRecord> {
    records.iter().filter(|r| scope.includes(r)).collect()
}

#[derive(Default)]
struct Accumulator {
    count: usize,
    total_pev: f64,
    successes: usize,
    total_pitches: u64,
}

/// Summarize every action observed under `fingerprint`, best mean PEV first.
///
/// Groups keep first-seen order before the stable sort, so equal means stay in
/// the order the actions first appear in the history.
pub fn aggregate<'a, I>(fingerprint: &str, records: I) -> Vec<StrategyStat>
where
    I: IntoIterator<Item = &'a PlayRecord>,
{
    let mut groups: Vec<(Action, Accumulator)> = Vec::new();

    for record in records.into_iter().filter(|r| r.state_id == fingerprint) {
        let idx = match groups.iter().position(|(a, _)| *a == record.action) {
            Some(idx) => idx,
            None => {
                groups.push((record.action, Accumulator::default()));
                groups.len() - 1
            }
        };
        let acc = &mut groups[idx].1;
        acc.count += 1;
        acc.total_pev += record.pev;
        if record.pev > 0.0 {
            acc.successes += 1;
        }
        acc.total_pitches += u64::from(record.pitches_or_default());
    }

    let mut stats: Vec<StrategyStat> = groups
        .into_iter()
        .map(|(action, acc)| {
            let n = acc.count as f64;
            StrategyStat {
                action,
                count: acc.count,
                avg_pev: acc.total_pev / n,
                success_rate: acc.successes as f64 / n,
                avg_pitches: acc.total_pitches as f64 / n,
            }
        })
        .collect();

    stats.sort_by(|a, b| b.avg_pev.total_cmp(&a.avg_pev));

    tracing::debug!(fingerprint, actions = stats.len(), "aggregated strategies");
    stats
}

/// The action with the best mean PEV, if any history exists.
pub fn recommend<'a, I>(fingerprint: &str, records: I) -> Option<StrategyStat>
where
    I: IntoIterator<Item = &'a PlayRecord>,
{
    aggregate(fingerprint, records).into_iter().next()
}

pub fn total_samples(stats: &[StrategyStat]) -> usize {
    stats.iter().map(|s| s.count).sum()
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
