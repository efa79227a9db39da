//! rehearse-report — renders a stored interview session for review.
//!
//! Both renderers show the summary, the per-criterion averages, the weak and
//! strong topics, and a per-question breakdown.

pub mod html;
pub mod markdown;

pub use html::{generate_html, write_html_report};
pub use markdown::render_markdown;
