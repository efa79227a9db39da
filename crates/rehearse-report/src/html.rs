//! HTML session review.
//!
//! Produces a self-contained HTML file with all CSS inlined.

use anyhow::{Context, Result};
use std::path::Path;

use rehearse_core::model::{
    criterion_means, overall_mean, Criterion, Evaluation, StoredSession, MAX_SCORE,
};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn score_class(score: f64) -> &'static str {
    if score >= 8.0 {
        "good"
    } else if score >= 5.0 {
        "fair"
    } else {
        "poor"
    }
}

/// Generate an HTML review page for a stored session.
pub fn generate_html(session: &StoredSession) -> String {
    let summary = &session.summary;
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>rehearse review: {}</title>\n",
        html_escape(&summary.role)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    html.push_str("<header>\n");
    html.push_str(&format!(
        "<h1>Interview review: {}</h1>\n",
        html_escape(&summary.role)
    ));
    html.push_str(&format!(
        "<p class=\"meta\">{} | {} questions | {}</p>\n",
        html_escape(&summary.user_id),
        summary.evaluations.len(),
        session.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    html.push_str("<section class=\"summary\">\n<h2>Summary</h2>\n");
    for paragraph in summary.summary_text.split("\n\n").filter(|p| !p.trim().is_empty()) {
        html.push_str(&format!("<p>{}</p>\n", html_escape(paragraph.trim())));
    }
    html.push_str("</section>\n");

    if let Some(means) = criterion_means(&summary.evaluations) {
        html.push_str("<section class=\"scores\">\n<h2>Scores</h2>\n");
        html.push_str(&generate_bar_chart(&means));
        if let Some(overall) = overall_mean(&summary.evaluations) {
            html.push_str(&format!(
                "<p class=\"overall {}\">Overall: <strong>{overall:.1}</strong> / {MAX_SCORE}</p>\n",
                score_class(overall)
            ));
        }
        html.push_str("</section>\n");
    }

    html.push_str("<section class=\"topics\">\n");
    push_topic_list(&mut html, "Weak spots", "weak", &summary.weak_spot_topics);
    push_topic_list(&mut html, "Strengths", "strong", &summary.strength_topics);
    html.push_str("</section>\n");

    if !summary.evaluations.is_empty() {
        html.push_str("<section class=\"questions\">\n<h2>Questions</h2>\n");
        for (i, evaluation) in summary.evaluations.iter().enumerate() {
            push_question(&mut html, i + 1, evaluation);
        }
        html.push_str("</section>\n");
    }

    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(session).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("</body>\n</html>");
    html
}

fn push_topic_list(html: &mut String, heading: &str, class: &str, topics: &[String]) {
    html.push_str(&format!("<div class=\"{class}\">\n<h3>{heading}</h3>\n"));
    if topics.is_empty() {
        html.push_str("<p class=\"meta\">None recorded.</p>\n");
    } else {
        html.push_str("<ul>\n");
        for topic in topics {
            html.push_str(&format!("<li>{}</li>\n", html_escape(topic)));
        }
        html.push_str("</ul>\n");
    }
    html.push_str("</div>\n");
}

fn push_question(html: &mut String, number: usize, evaluation: &Evaluation) {
    html.push_str("<article>\n");
    html.push_str(&format!(
        "<h3>{number}. {}</h3>\n",
        html_escape(&evaluation.question)
    ));
    html.push_str(&format!(
        "<blockquote>{}</blockquote>\n",
        html_escape(&evaluation.answer).replace('\n', "<br>")
    ));

    html.push_str("<table>\n<tbody>\n");
    for criterion in Criterion::ALL {
        let score = evaluation.scores.get(criterion);
        html.push_str(&format!(
            "<tr><td>{}</td><td class=\"{}\">{score}</td></tr>\n",
            criterion.title(),
            score_class(f64::from(score))
        ));
    }
    html.push_str("</tbody></table>\n");

    if !evaluation.weak_spots.is_empty() {
        html.push_str(&format!(
            "<p><strong>Weak spots:</strong> {}</p>\n",
            html_escape(&evaluation.weak_spots.join(", "))
        ));
    }
    if !evaluation.strengths.is_empty() {
        html.push_str(&format!(
            "<p><strong>Strengths:</strong> {}</p>\n",
            html_escape(&evaluation.strengths.join(", "))
        ));
    }
    if !evaluation.comments.trim().is_empty() {
        html.push_str(&format!(
            "<p class=\"comments\">{}</p>\n",
            html_escape(evaluation.comments.trim())
        ));
    }
    html.push_str("</article>\n");
}

/// Write an HTML review to a file.
pub fn write_html_report(session: &StoredSession, path: &Path) -> Result<()> {
    let html = generate_html(session);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write report: {}", path.display()))?;
    Ok(())
}

fn generate_bar_chart(means: &[(Criterion, f64)]) -> String {
    let bar_height = 26;
    let max_width = 400;
    let padding = 10;
    let label_width = 240;

    let total_height = means.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, (criterion, mean)) in means.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let width = (mean / f64::from(MAX_SCORE) * max_width as f64) as usize;

        let color = match score_class(*mean) {
            "good" => "#22c55e",
            "fair" => "#eab308",
            _ => "#ef4444",
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(criterion.title())
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{:.1}</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            mean
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --good: #dcfce7; --fair: #fef9c3; --poor: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --good: #064e3b; --fair: #713f12; --poor: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0 auto; padding: 2rem; max-width: 60rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
.topics { display: flex; gap: 3rem; }
table { border-collapse: collapse; margin: 1rem 0; }
td { border: 1px solid var(--border); padding: 0.4rem 1rem; }
.good { background: var(--good); }
.fair { background: var(--fair); }
.poor { background: var(--poor); }
article { border-top: 1px solid var(--border); padding: 1rem 0; }
blockquote { margin: 1rem 0; padding-left: 1rem; border-left: 4px solid var(--border); }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use rehearse_core::model::{Scores, SessionSummary};

    fn make_session() -> StoredSession {
        StoredSession {
            timestamp: chrono::Utc::now(),
            summary: SessionSummary {
                user_id: "bob".into(),
                role: "Software Engineer".into(),
                summary_text: "First paragraph.\n\nSecond <paragraph>.".into(),
                weak_spot_topics: vec!["system_design".into()],
                strength_topics: vec![],
                evaluations: vec![Evaluation {
                    question: "Design a rate limiter.".into(),
                    answer: "Use a <token bucket> & Redis.".into(),
                    scores: Scores::uniform(9),
                    weak_spots: vec!["scalability".into()],
                    strengths: vec!["clarity".into()],
                    comments: "Good depth.".into(),
                }],
            },
        }
    }

    #[test]
    fn html_review_contains_required_elements() {
        let html = generate_html(&make_session());

        assert!(html.contains("<html"));
        assert!(html.contains("</html>"));
        assert!(html.contains("Interview review: Software Engineer"));
        assert!(html.contains("<p>Second &lt;paragraph&gt;.</p>"));
        assert!(html.contains("<li>system_design</li>"));
        assert!(html.contains("Structural Integrity (STAR)"));
        assert!(html.contains("Overall: <strong>9.0</strong> / 10"));
        assert!(html.contains("None recorded."));
    }

    #[test]
    fn answers_are_escaped() {
        let html = generate_html(&make_session());
        assert!(html.contains("Use a &lt;token bucket&gt; &amp; Redis."));
        assert!(!html.contains("<token bucket>"));
    }

    #[test]
    fn html_review_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("review.html");

        write_html_report(&make_session(), &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<html"));
    }
}
