//! Relationship health scoring.
//!
//! A score is a weighted blend of three sub-scores over an interaction
//! history:
//!
//! | sub-score | weight | signal                                    |
//! |-----------|--------|-------------------------------------------|
//! | recency   | 0.5    | days since the latest interaction         |
//! | frequency | 0.3    | interactions in the last 90 days          |
//! | variety   | 0.2    | distinct interaction kinds in that window |
//!
//! Groups get a second pass: their own interactions are scored directly, and
//! only when there are none do we fall back to member and family activity,
//! halving the result.

use std::collections::HashSet;

use chrono::{Days, NaiveDate};
use log::debug;

use crate::models::{GroupId, GroupScore, InteractionEvent, ScoreResult, ScoreSource, ScoreTier};
use crate::time::days_between;

/// Frequency and variety only look at this many trailing days.
pub const SCORING_WINDOW_DAYS: u64 = 90;

/// Multiplier applied to scores inferred from member/family activity.
pub const FALLBACK_DAMPING: f64 = 0.5;

const RECENCY_WEIGHT: f64 = 0.5;
const FREQUENCY_WEIGHT: f64 = 0.3;
const VARIETY_WEIGHT: f64 = 0.2;

/// Score an interaction history as of `now`.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use rapport::models::{InteractionEvent, ScoreTier};
/// use rapport::services::scoring::score;
///
/// let today = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
/// let result = score(&[InteractionEvent::new(today, "call")], today);
/// assert_eq!(result.score, 62);
/// assert_eq!(result.label, ScoreTier::Good);
/// ```
pub fn score(events: &[InteractionEvent], now: NaiveDate) -> ScoreResult {
    let Some(latest) = events.iter().map(|e| e.date).max() else {
        return ScoreResult::NO_DATA;
    };

    let recency = recency_score(days_between(latest, now));

    let window_start = now
        .checked_sub_days(Days::new(SCORING_WINDOW_DAYS))
        .unwrap_or(NaiveDate::MIN);
    let in_window: Vec<&InteractionEvent> =
        events.iter().filter(|e| e.date >= window_start).collect();
    let frequency = frequency_score(in_window.len());
    let variety = variety_score(
        in_window
            .iter()
            .map(|e| e.kind.as_str())
            .collect::<HashSet<_>>()
            .len(),
    );

    let weighted = recency * RECENCY_WEIGHT
        + f64::from(frequency) * FREQUENCY_WEIGHT
        + f64::from(variety) * VARIETY_WEIGHT;
    let total = clamp_percent(weighted);

    ScoreResult {
        score: total,
        label: ScoreTier::from_score(total),
        recency: clamp_percent(recency),
        frequency,
        variety,
    }
}

/// Piecewise-linear decay from 100 (today) to 0 (more than 90 days ago).
/// Future-dated interactions count as today.
pub fn recency_score(days_since: i64) -> f64 {
    let d = days_since as f64;
    match days_since {
        i64::MIN..=0 => 100.0,
        1..=7 => 100.0 - (d / 7.0) * 20.0,
        8..=14 => 80.0 - ((d - 7.0) / 7.0) * 20.0,
        15..=30 => 60.0 - ((d - 14.0) / 16.0) * 20.0,
        31..=60 => 40.0 - ((d - 30.0) / 30.0) * 20.0,
        61..=90 => 20.0 - ((d - 60.0) / 30.0) * 20.0,
        _ => 0.0,
    }
}

pub fn frequency_score(count: usize) -> u8 {
    match count {
        8.. => 100,
        5..=7 => 80,
        3..=4 => 60,
        2 => 40,
        1 => 20,
        0 => 0,
    }
}

pub fn variety_score(distinct_kinds: usize) -> u8 {
    match distinct_kinds {
        3.. => 100,
        2 => 60,
        1 => 30,
        0 => 0,
    }
}

/// Halve the overall score and re-derive its tier. Sub-scores are kept so
/// the breakdown still reflects the underlying activity.
pub fn dampen(raw: ScoreResult) -> ScoreResult {
    let damped = clamp_percent(f64::from(raw.score) * FALLBACK_DAMPING);
    ScoreResult {
        score: damped,
        label: ScoreTier::from_score(damped),
        ..raw
    }
}

/// Score a group from its own events, falling back to member/family events.
///
/// `fallback` is only called when `direct` is empty.
pub fn score_group<F>(direct: &[InteractionEvent], fallback: F, now: NaiveDate) -> ScoreResult
where
    F: FnOnce() -> Vec<InteractionEvent>,
{
    score_group_with_source(direct, fallback, now).0
}

/// Like [`score_group`], also reporting which signal the result came from.
pub fn score_group_with_source<F>(
    direct: &[InteractionEvent],
    fallback: F,
    now: NaiveDate,
) -> (ScoreResult, ScoreSource)
where
    F: FnOnce() -> Vec<InteractionEvent>,
{
    if !direct.is_empty() {
        return (score(direct, now), ScoreSource::Direct);
    }

    let fallback_events = fallback();
    if fallback_events.is_empty() {
        return (ScoreResult::NO_DATA, ScoreSource::None);
    }

    let raw = score(&fallback_events, now);
    debug!(
        "Dampening fallback score {} over {} events",
        raw.score,
        fallback_events.len()
    );
    (dampen(raw), ScoreSource::Fallback)
}

/// Input row for [`score_groups`].
pub struct GroupEvents<F> {
    pub group_id: GroupId,
    pub name: String,
    pub direct: Vec<InteractionEvent>,
    pub fallback: F,
}

/// Score every group independently. Output follows input order; pass the
/// result through [`rank_by_attention`] to surface neglected groups first.
pub fn score_groups<I, F>(groups: I, now: NaiveDate) -> Vec<GroupScore>
where
    I: IntoIterator<Item = GroupEvents<F>>,
    F: FnOnce() -> Vec<InteractionEvent>,
{
    groups
        .into_iter()
        .map(|group| {
            let (score, source) = score_group_with_source(&group.direct, group.fallback, now);
            GroupScore {
                group_id: group.group_id,
                name: group.name,
                source,
                score,
            }
        })
        .collect()
}

/// Lowest score first; ties keep a stable order by group id.
pub fn rank_by_attention(scores: &mut [GroupScore]) {
    scores.sort_by(|a, b| {
        a.score
            .score
            .cmp(&b.score.score)
            .then_with(|| a.group_id.cmp(&b.group_id))
    });
}

fn clamp_percent(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
#[path = "scoring_tests.rs"]
mod scoring_tests;
