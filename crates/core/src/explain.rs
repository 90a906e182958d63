use crate::models::Candidate;

pub const DOMAIN_TERMS: [&str; 6] = [
    "fintech",
    "healthcare",
    "ecommerce",
    "e-commerce",
    "startup",
    "enterprise",
];

pub const FALLBACK_EXPLANATION: &str = "General experience and skills match the requirements";

const MAX_LISTED_SKILLS: usize = 5;

pub fn explain_match(query: &str, candidate: &Candidate) -> String {
    let query_lower = query.to_lowercase();
    let mut parts = Vec::new();

    let matching_skills = candidate
        .skills
        .iter()
        .filter(|skill| query_lower.contains(skill.as_str()))
        .take(MAX_LISTED_SKILLS)
        .map(String::as_str)
        .collect::<Vec<_>>();
    if !matching_skills.is_empty() {
        parts.push(format!("Has relevant skills: {}", matching_skills.join(", ")));
    }

    if !candidate.experience_summary.is_empty() {
        parts.push(candidate.experience_summary.clone());
    }

    let text_lower = candidate.full_text.to_lowercase();
    for domain in DOMAIN_TERMS {
        if query_lower.contains(domain) && text_lower.contains(domain) {
            parts.push(format!("Experience in {domain}"));
        }
    }

    if parts.is_empty() {
        return FALLBACK_EXPLANATION.to_string();
    }

    parts.join(" | ")
}
