use crate::error::IngestError;
use crate::models::CandidateFields;
use regex::Regex;
use std::path::Path;

pub const SKILL_VOCABULARY: [&str; 43] = [
    "python",
    "java",
    "javascript",
    "react",
    "node.js",
    "nodejs",
    "angular",
    "vue",
    "typescript",
    "c++",
    "c#",
    "ruby",
    "php",
    "swift",
    "kotlin",
    "sql",
    "mongodb",
    "postgresql",
    "mysql",
    "redis",
    "aws",
    "azure",
    "gcp",
    "docker",
    "kubernetes",
    "jenkins",
    "git",
    "agile",
    "scrum",
    "machine learning",
    "deep learning",
    "ai",
    "data science",
    "tensorflow",
    "pytorch",
    "rest api",
    "graphql",
    "microservices",
    "devops",
    "fintech",
    "blockchain",
    "cybersecurity",
    "cloud computing",
];

pub const TITLE_KEYWORDS: [&str; 10] = [
    "engineer",
    "developer",
    "architect",
    "manager",
    "analyst",
    "consultant",
    "specialist",
    "lead",
    "senior",
    "junior",
];

pub const YEARS_NOT_SPECIFIED: &str = "Not specified";

const TITLE_SCAN_LINES: usize = 20;

const EMAIL_PATTERN: &str = r"(?i)\b[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}\b";
const PHONE_PATTERN: &str = r"\b\d{3}[-.]?\d{3}[-.]?\d{4}\b";
const YEARS_PATTERN: &str = r"(?i)(\d+)\+?\s*years?\s*(?:of)?\s*experience";

#[derive(Debug, Clone)]
pub struct InfoExtractor {
    email_re: Regex,
    phone_re: Regex,
    years_re: Regex,
}

impl InfoExtractor {
    pub fn new() -> Result<Self, IngestError> {
        Ok(Self {
            email_re: Regex::new(EMAIL_PATTERN)?,
            phone_re: Regex::new(PHONE_PATTERN)?,
            years_re: Regex::new(YEARS_PATTERN)?,
        })
    }

    pub fn extract(&self, text: &str, filename: &str) -> CandidateFields {
        let lines = text
            .split('\n')
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>();
        let lowered = text.to_lowercase();

        let name = lines
            .first()
            .map(|line| (*line).to_string())
            .unwrap_or_else(|| name_from_filename(filename));

        let email = self
            .email_re
            .find(text)
            .map(|found| found.as_str().to_string());
        let phone = self
            .phone_re
            .find(text)
            .map(|found| found.as_str().to_string());

        let years = self
            .years_re
            .captures(&lowered)
            .and_then(|capture| capture.get(1).map(|m| m.as_str().to_string()))
            .unwrap_or_else(|| YEARS_NOT_SPECIFIED.to_string());

        let mut experience_summary = format!("{years} years of experience");
        if let Some(role) = recent_role(&lines) {
            experience_summary.push_str(" | Recent role: ");
            experience_summary.push_str(role);
        }

        CandidateFields {
            name,
            email,
            phone,
            skills: match_skills(&lowered),
            experience_summary,
        }
    }
}

pub fn match_skills(lowered: &str) -> Vec<String> {
    // Plain substring containment: "ai" also fires inside "maintain".
    SKILL_VOCABULARY
        .iter()
        .filter(|skill| lowered.contains(*skill))
        .map(|skill| (*skill).to_string())
        .collect()
}

fn recent_role<'a>(lines: &[&'a str]) -> Option<&'a str> {
    lines.iter().take(TITLE_SCAN_LINES).copied().find(|line| {
        let lowered = line.to_lowercase();
        TITLE_KEYWORDS.iter().any(|title| lowered.contains(title))
    })
}

pub fn name_from_filename(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(filename)
        .replace('_', " ")
}
