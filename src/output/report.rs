//! Analysis report structures

use crate::processing::document::SectionKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The scorecard returned for a single resume. Built once per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub filename: String,
    pub mime_type: String,

    /// Weighted aggregate of the four sub-scores (0-100)
    pub overall_score: u8,
    pub ats_score: u8,
    pub keyword_score: u8,
    pub formatting_score: u8,
    pub content_score: u8,

    /// Present only when a job description was supplied
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub job_match_score: Option<u8>,

    pub grade: Grade,

    /// Canonical skill names, in taxonomy order
    pub skills_found: Vec<String>,

    /// Job skills absent from the resume, or common in-demand skills without a job
    pub missing_skills: Vec<String>,

    /// Recognized skills named by the job description
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub job_required_skills: Option<Vec<String>>,

    /// Resume words that look like misspelled missing skills
    pub near_misses: Vec<NearMiss>,

    pub sections_detected: Vec<SectionKind>,
    pub missing_sections: Vec<SectionKind>,

    /// Highest-confidence first
    pub strengths: Vec<Finding>,

    /// Highest-impact first
    pub improvements: Vec<Finding>,

    pub word_count: usize,
}

impl AnalysisReport {
    /// Named sub-scores in display order.
    pub fn sub_scores(&self) -> [(&'static str, u8); 4] {
        [
            ("ATS Compatibility", self.ats_score),
            ("Keyword Relevance", self.keyword_score),
            ("Formatting", self.formatting_score),
            ("Content Quality", self.content_score),
        ]
    }

    pub fn has_job_description(&self) -> bool {
        self.job_match_score.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisArea {
    Ats,
    Keywords,
    Formatting,
    Content,
}

impl fmt::Display for AnalysisArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisArea::Ats => write!(f, "ATS"),
            AnalysisArea::Keywords => write!(f, "Keywords"),
            AnalysisArea::Formatting => write!(f, "Formatting"),
            AnalysisArea::Content => write!(f, "Content"),
        }
    }
}

/// A strength or improvement statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub area: AnalysisArea,
    pub message: String,
    /// Sub-score points the signal earned (strength) or lost (improvement)
    pub impact: u8,
}

impl Finding {
    pub fn new(area: AnalysisArea, message: impl Into<String>, impact: u32) -> Self {
        Self {
            area,
            message: message.into(),
            impact: impact.min(100) as u8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearMiss {
    pub skill: String,
    pub found_as: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    #[serde(rename = "B+")]
    BPlus,
    B,
    C,
}

impl Grade {
    pub fn from_score(score: u8) -> Self {
        match score {
            90.. => Grade::APlus,
            80..=89 => Grade::A,
            70..=79 => Grade::BPlus,
            60..=69 => Grade::B,
            _ => Grade::C,
        }
    }

    pub fn letter(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::C => "C",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Grade::APlus => "Excellent!",
            Grade::A => "Great job!",
            Grade::BPlus => "Good work!",
            Grade::B => "Needs improvement",
            Grade::C => "Significant improvement needed",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.letter())
    }
}

/// Coarse rating used when rendering a sub-score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Strong, // 80 and above
    Fair,   // 60 to 79
    Weak,
}

impl ScoreBand {
    pub fn from_score(score: u8) -> Self {
        match score {
            80.. => ScoreBand::Strong,
            60..=79 => ScoreBand::Fair,
            _ => ScoreBand::Weak,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreBand::Strong => "strong",
            ScoreBand::Fair => "fair",
            ScoreBand::Weak => "weak",
        }
    }
}
