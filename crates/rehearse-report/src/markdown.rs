//! Markdown session review.

use std::fmt::Write;

use rehearse_core::model::{criterion_means, overall_mean, Criterion, StoredSession};

/// Render a stored session as a Markdown document.
pub fn render_markdown(session: &StoredSession) -> String {
    let summary = &session.summary;
    let mut md = String::new();

    let _ = writeln!(md, "# Interview review: {}", summary.role);
    let _ = writeln!(
        md,
        "\n_{} · {} questions · {}_\n",
        summary.user_id,
        summary.evaluations.len(),
        session.timestamp.format("%Y-%m-%d %H:%M UTC")
    );

    md.push_str("## Summary\n\n");
    md.push_str(summary.summary_text.trim());
    md.push_str("\n\n");

    if let Some(means) = criterion_means(&summary.evaluations) {
        md.push_str("## Scores\n\n| Criterion | Average |\n|---|---|\n");
        for (criterion, mean) in &means {
            let _ = writeln!(md, "| {} | {mean:.1} |", criterion.title());
        }
        if let Some(overall) = overall_mean(&summary.evaluations) {
            let _ = writeln!(md, "| **Overall** | **{overall:.1}** |");
        }
        md.push('\n');
    }

    push_topics(&mut md, "Weak spots", &summary.weak_spot_topics);
    push_topics(&mut md, "Strengths", &summary.strength_topics);

    if !summary.evaluations.is_empty() {
        md.push_str("## Questions\n");
    }
    for (i, evaluation) in summary.evaluations.iter().enumerate() {
        let _ = writeln!(md, "\n### {}. {}\n", i + 1, evaluation.question);
        for line in evaluation.answer.lines() {
            let _ = writeln!(md, "> {line}");
        }
        md.push('\n');
        let scores: Vec<String> = Criterion::ALL
            .iter()
            .map(|c| format!("{} {}", c.key(), evaluation.scores.get(*c)))
            .collect();
        let _ = writeln!(md, "**Scores:** {}\n", scores.join(" · "));
        if !evaluation.weak_spots.is_empty() {
            let _ = writeln!(md, "**Weak spots:** {}\n", evaluation.weak_spots.join(", "));
        }
        if !evaluation.strengths.is_empty() {
            let _ = writeln!(md, "**Strengths:** {}\n", evaluation.strengths.join(", "));
        }
        if !evaluation.comments.trim().is_empty() {
            let _ = writeln!(md, "{}", evaluation.comments.trim());
        }
    }

    md
}

fn push_topics(md: &mut String, heading: &str, topics: &[String]) {
    if topics.is_empty() {
        return;
    }
    let _ = writeln!(md, "## {heading}\n");
    for topic in topics {
        let _ = writeln!(md, "- {topic}");
    }
    md.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use rehearse_core::model::{Evaluation, Scores, SessionSummary};

    fn session(evaluations: Vec<Evaluation>) -> StoredSession {
        StoredSession {
            timestamp: chrono::Utc::now(),
            summary: SessionSummary {
                user_id: "alice".into(),
                role: "Sales".into(),
                summary_text: "Strong rapport, weak closing.".into(),
                weak_spot_topics: vec!["closing".into()],
                strength_topics: vec!["rapport".into()],
                evaluations,
            },
        }
    }

    fn evaluation(score: u8) -> Evaluation {
        Evaluation {
            question: "How do you handle objections?".into(),
            answer: "I listen first.\nThen I reframe.".into(),
            scores: Scores::uniform(score),
            weak_spots: vec!["closing".into()],
            strengths: vec![],
            comments: "Add a concrete example.".into(),
        }
    }

    #[test]
    fn includes_summary_averages_and_questions() {
        let md = render_markdown(&session(vec![evaluation(6), evaluation(8)]));
        assert!(md.starts_with("# Interview review: Sales"));
        assert!(md.contains("Strong rapport, weak closing."));
        assert!(md.contains("| Structural Integrity (STAR) | 7.0 |"));
        assert!(md.contains("| **Overall** | **7.0** |"));
        assert!(md.contains("### 2. How do you handle objections?"));
        assert!(md.contains("> Then I reframe."));
        assert!(md.contains("structure_STAR 8"));
        assert!(md.contains("- rapport"));
    }

    #[test]
    fn empty_session_has_no_score_table() {
        let md = render_markdown(&session(vec![]));
        assert!(!md.contains("## Scores"));
        assert!(!md.contains("## Questions"));
        assert!(md.contains("0 questions"));
    }
}
