use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CandidateFields {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub skills: Vec<String>,
    pub experience_summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Candidate {
    pub id: String,
    pub path: String,
    pub filename: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub skills: Vec<String>,
    pub experience_summary: String,
    pub full_text: String,
}

impl Candidate {
    pub fn from_fields(
        id: String,
        path: String,
        filename: String,
        full_text: String,
        fields: CandidateFields,
    ) -> Self {
        Self {
            id,
            path,
            filename,
            name: fields.name,
            email: fields.email,
            phone: fields.phone,
            skills: fields.skills,
            experience_summary: fields.experience_summary,
            full_text,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchResult {
    pub id: String,
    pub name: String,
    pub path: String,
    pub filename: String,
    pub score: f64,
    pub skills: Vec<String>,
    pub experience_summary: String,
    pub explanation: String,
}

impl MatchResult {
    pub fn new(candidate: &Candidate, score: f64, explanation: String) -> Self {
        Self {
            id: candidate.id.clone(),
            name: candidate.name.clone(),
            path: candidate.path.clone(),
            filename: candidate.filename.clone(),
            score,
            skills: candidate.skills.clone(),
            experience_summary: candidate.experience_summary.clone(),
            explanation,
        }
    }
}
