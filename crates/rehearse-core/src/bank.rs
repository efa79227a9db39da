//! Role-based scripted question banks.

use crate::model::Question;

struct Scripted {
    text: &'static str,
    topic: &'static str,
    tags: &'static [&'static str],
}

const SOFTWARE_ENGINEER: &[Scripted] = &[
    Scripted {
        text: "Tell me about a time you debugged a particularly hard production issue.",
        topic: "behavioral",
        tags: &["STAR_method", "debugging", "ownership"],
    },
    Scripted {
        text: "Describe how you would design a rate limiter for an HTTP API.",
        topic: "system_design",
        tags: &["system_design", "scalability"],
    },
    Scripted {
        text: "Walk me through a piece of code you wrote that you're proud of.",
        topic: "technical_experience",
        tags: &["coding", "communication"],
    },
    Scripted {
        text: "How do you ensure code quality and reliability in your projects?",
        topic: "process",
        tags: &["testing", "code_review"],
    },
];

const SALES: &[Scripted] = &[
    Scripted {
        text: "Describe a time you turned around a difficult customer situation.",
        topic: "behavioral",
        tags: &["relationship_building", "objection_handling"],
    },
    Scripted {
        text: "How do you qualify and prioritize leads in your pipeline?",
        topic: "sales_process",
        tags: &["qualification", "prioritization"],
    },
    Scripted {
        text: "Walk me through your discovery process for a new prospect.",
        topic: "discovery",
        tags: &["questioning", "listening"],
    },
];

const CUSTOMER_SUPPORT: &[Scripted] = &[
    Scripted {
        text: "Tell me about a time you handled an escalated, frustrated customer.",
        topic: "behavioral",
        tags: &["de_escalation", "empathy"],
    },
    Scripted {
        text: "How do you balance speed and quality when handling support tickets?",
        topic: "prioritization",
        tags: &["time_management", "quality"],
    },
    Scripted {
        text: "Describe your approach to documenting and sharing recurring issues.",
        topic: "process",
        tags: &["documentation", "collaboration"],
    },
];

const GENERIC: &[Scripted] = &[
    Scripted {
        text: "Tell me about a time you faced a major challenge at work and how you handled it.",
        topic: "behavioral",
        tags: &["STAR_method"],
    },
    Scripted {
        text: "What do you consider your strongest professional skill, and why?",
        topic: "self_assessment",
        tags: &["self_awareness"],
    },
    Scripted {
        text: "Describe a situation where you had to collaborate with a difficult teammate.",
        topic: "collaboration",
        tags: &["communication", "teamwork"],
    },
];

const ROLES: &[(&str, &[Scripted])] = &[
    ("Software Engineer", SOFTWARE_ENGINEER),
    ("Sales", SALES),
    ("Customer Support", CUSTOMER_SUPPORT),
];

/// Roles with a dedicated question bank, in display order.
pub fn known_roles() -> Vec<&'static str> {
    ROLES.iter().map(|(name, _)| *name).collect()
}

/// Whether `role` has a dedicated bank (exact match).
pub fn is_known_role(role: &str) -> bool {
    ROLES.iter().any(|(name, _)| *name == role)
}

/// Questions for `role`, or the generic set for unknown roles. Never empty.
pub fn questions_for_role(role: &str) -> Vec<Question> {
    let bank = ROLES
        .iter()
        .find(|(name, _)| *name == role)
        .map(|(_, bank)| *bank)
        .unwrap_or(GENERIC);
    bank.iter()
        .map(|q| Question::new(q.text, q.topic, q.tags))
        .collect()
}
