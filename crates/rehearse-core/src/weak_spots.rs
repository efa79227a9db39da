//! Weak-spot aggregation across stored sessions.
//!
//! Topics are compared as exact strings: "STAR_method" and "star method"
//! count separately.

use std::collections::BTreeMap;

use crate::model::SessionSummary;

/// Count how many sessions listed each weak-spot topic.
///
/// A topic listed twice in the same session counts twice. Empty topics are
/// skipped.
pub fn aggregate_weak_spots<'a, I>(sessions: I) -> BTreeMap<String, u32>
where
    I: IntoIterator<Item = &'a SessionSummary>,
{
    let mut counts = BTreeMap::new();
    for session in sessions {
        for topic in &session.weak_spot_topics {
            if topic.is_empty() {
                continue;
            }
            *counts.entry(topic.clone()).or_insert(0) += 1;
        }
    }
    counts
}

/// Topics ordered by count descending, ties broken by topic ascending.
pub fn rank_weak_spots(counts: &BTreeMap<String, u32>) -> Vec<(String, u32)> {
    let mut ranked: Vec<(String, u32)> = counts.iter().map(|(t, c)| (t.clone(), *c)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
}

/// The `top_k` highest-ranked topics.
pub fn top_weak_spots(counts: &BTreeMap<String, u32>, top_k: usize) -> Vec<String> {
    rank_weak_spots(counts)
        .into_iter()
        .take(top_k)
        .map(|(topic, _)| topic)
        .collect()
}
