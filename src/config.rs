//! Configuration management for the resume analyzer

use crate::error::{Result, ResumeAnalyzerError};
use crate::processing::document::SectionKind;
use crate::processing::taxonomy::SkillCategory;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub limits: LimitsConfig,
    pub keywords: KeywordConfig,
    pub formatting: FormattingConfig,
    pub content: ContentConfig,
    pub scoring: ScoringConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_file_bytes: usize,
    pub min_text_chars: usize,
    pub request_timeout_ms: u64,
    pub extraction_workers: usize,
    pub overload_policy: OverloadPolicy,
}

/// What happens when every extraction worker is occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverloadPolicy {
    /// Fail immediately with `Busy`.
    Reject,
    /// Wait for a free worker, bounded by the request timeout.
    Wait,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordConfig {
    pub target_skill_count: usize,
    pub common_gap_skills: Vec<String>,
    pub near_miss_threshold: f64,
    pub custom_skills: Vec<CustomSkill>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomSkill {
    pub name: String,
    pub category: SkillCategory,
    #[serde(default)]
    pub synonyms: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormattingConfig {
    pub weights: FormattingWeights,
    pub ats_weights: AtsWeights,
    pub missing_section_ats_ceiling: u8,
    pub min_words: usize,
    pub max_words: usize,
    pub max_paragraph_words: usize,
    pub multi_column_min_lines: usize,
    pub multi_column_max_avg_line_chars: f64,
    pub multi_column_min_lines_per_paragraph: f64,
    pub max_symbol_ratio: f64,
}

/// Points awarded by the formatting analyzer. Must sum to 100.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormattingWeights {
    pub experience_section: u32,
    pub education_section: u32,
    pub skills_section: u32,
    pub contact_info: u32,
    pub bullet_consistency: u32,
    pub length_bounds: u32,
    pub paragraph_density: u32,
}

/// Points awarded toward ATS parseability. Must sum to 100.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AtsWeights {
    pub experience_section: u32,
    pub education_section: u32,
    pub skills_section: u32,
    pub contact_info: u32,
    pub single_column: u32,
    pub clean_glyphs: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    pub weights: ContentWeights,
    pub quantified_target: usize,
    pub pronoun_tolerance: usize,
    /// Passive entries at which the passive-voice points reach zero
    pub passive_tolerance: usize,
    pub summary_min_words: usize,
}

/// Points awarded by the content analyzer. Must sum to 100.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentWeights {
    pub quantified_achievements: u32,
    pub action_verbs: u32,
    pub first_person: u32,
    pub summary: u32,
    pub passive_voice: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub ats_weight: f64,
    pub keyword_weight: f64,
    pub formatting_weight: f64,
    pub content_weight: f64,
    /// Keyword weight used instead of `keyword_weight` when a job description is supplied.
    pub job_keyword_weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub detailed: bool,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
    Html,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: 10 * 1024 * 1024,
            min_text_chars: 50,
            request_timeout_ms: 30_000,
            extraction_workers: 4,
            overload_policy: OverloadPolicy::Reject,
        }
    }
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            target_skill_count: 10,
            common_gap_skills: [
                "docker",
                "kubernetes",
                "graphql",
                "next.js",
                "tensorflow",
                "agile",
                "ci/cd",
                "mongodb",
                "redis",
                "elasticsearch",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            near_miss_threshold: 0.92,
            custom_skills: Vec::new(),
        }
    }
}

impl Default for FormattingConfig {
    fn default() -> Self {
        Self {
            weights: FormattingWeights::default(),
            ats_weights: AtsWeights::default(),
            missing_section_ats_ceiling: 50,
            min_words: 150,
            max_words: 1200,
            max_paragraph_words: 80,
            multi_column_min_lines: 12,
            multi_column_max_avg_line_chars: 28.0,
            multi_column_min_lines_per_paragraph: 4.0,
            max_symbol_ratio: 0.01,
        }
    }
}

impl Default for FormattingWeights {
    fn default() -> Self {
        Self {
            experience_section: 10,
            education_section: 10,
            skills_section: 10,
            contact_info: 10,
            bullet_consistency: 25,
            length_bounds: 25,
            paragraph_density: 10,
        }
    }
}

impl FormattingWeights {
    pub fn section(&self, kind: SectionKind) -> u32 {
        match kind {
            SectionKind::Experience => self.experience_section,
            SectionKind::Education => self.education_section,
            SectionKind::Skills => self.skills_section,
            SectionKind::Summary | SectionKind::Projects | SectionKind::Certifications => 0,
        }
    }

    pub fn total(&self) -> u32 {
        self.experience_section
            + self.education_section
            + self.skills_section
            + self.contact_info
            + self.bullet_consistency
            + self.length_bounds
            + self.paragraph_density
    }
}

impl Default for AtsWeights {
    fn default() -> Self {
        Self {
            experience_section: 20,
            education_section: 20,
            skills_section: 20,
            contact_info: 15,
            single_column: 15,
            clean_glyphs: 10,
        }
    }
}

impl AtsWeights {
    pub fn section(&self, kind: SectionKind) -> u32 {
        match kind {
            SectionKind::Experience => self.experience_section,
            SectionKind::Education => self.education_section,
            SectionKind::Skills => self.skills_section,
            SectionKind::Summary | SectionKind::Projects | SectionKind::Certifications => 0,
        }
    }

    pub fn total(&self) -> u32 {
        self.experience_section
            + self.education_section
            + self.skills_section
            + self.contact_info
            + self.single_column
            + self.clean_glyphs
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            weights: ContentWeights::default(),
            quantified_target: 5,
            pronoun_tolerance: 5,
            passive_tolerance: 3,
            summary_min_words: 12,
        }
    }
}

impl Default for ContentWeights {
    fn default() -> Self {
        Self {
            quantified_achievements: 30,
            action_verbs: 30,
            first_person: 20,
            summary: 15,
            passive_voice: 5,
        }
    }
}

impl ContentWeights {
    pub fn total(&self) -> u32 {
        self.quantified_achievements + self.action_verbs + self.first_person + self.summary + self.passive_voice
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            ats_weight: 0.3,
            keyword_weight: 0.3,
            formatting_weight: 0.2,
            content_weight: 0.2,
            job_keyword_weight: 0.4,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Console,
            detailed: false,
            color_output: true,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            ResumeAnalyzerError::Configuration(format!("Failed to parse config: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            ResumeAnalyzerError::Configuration(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("resume-analyzer")
            .join("config.toml")
    }

    /// Reject weight tables and limits the scoring model cannot work with.
    pub fn validate(&self) -> Result<()> {
        let limits = &self.limits;
        if limits.max_file_bytes == 0 || limits.extraction_workers == 0 || limits.request_timeout_ms == 0 {
            return Err(ResumeAnalyzerError::Configuration(
                "limits.max_file_bytes, limits.extraction_workers and limits.request_timeout_ms must be positive"
                    .to_string(),
            ));
        }

        check_points("formatting.weights", self.formatting.weights.total())?;
        check_points("formatting.ats_weights", self.formatting.ats_weights.total())?;
        check_points("content.weights", self.content.weights.total())?;

        if self.formatting.missing_section_ats_ceiling > 100 {
            return Err(ResumeAnalyzerError::Configuration(
                "formatting.missing_section_ats_ceiling must be at most 100".to_string(),
            ));
        }
        if self.formatting.min_words == 0 || self.formatting.min_words >= self.formatting.max_words {
            return Err(ResumeAnalyzerError::Configuration(format!(
                "formatting.min_words ({}) must be positive and below max_words ({})",
                self.formatting.min_words, self.formatting.max_words
            )));
        }
        if self.keywords.target_skill_count == 0
            || self.content.quantified_target == 0
            || self.content.pronoun_tolerance == 0
            || self.content.passive_tolerance == 0
        {
            return Err(ResumeAnalyzerError::Configuration(
                "keywords.target_skill_count and the content targets and tolerances must be positive".to_string(),
            ));
        }

        let scoring = &self.scoring;
        // TOML accepts nan and inf, which would slip past every comparison below.
        let reals = [
            ("scoring.ats_weight", scoring.ats_weight),
            ("scoring.keyword_weight", scoring.keyword_weight),
            ("scoring.formatting_weight", scoring.formatting_weight),
            ("scoring.content_weight", scoring.content_weight),
            ("scoring.job_keyword_weight", scoring.job_keyword_weight),
            ("keywords.near_miss_threshold", self.keywords.near_miss_threshold),
            ("formatting.multi_column_max_avg_line_chars", self.formatting.multi_column_max_avg_line_chars),
            (
                "formatting.multi_column_min_lines_per_paragraph",
                self.formatting.multi_column_min_lines_per_paragraph,
            ),
            ("formatting.max_symbol_ratio", self.formatting.max_symbol_ratio),
        ];
        if let Some((name, value)) = reals.iter().find(|(_, value)| !value.is_finite()) {
            return Err(ResumeAnalyzerError::Configuration(format!(
                "{} must be a finite number, got {}",
                name, value
            )));
        }

        let weights = [
            scoring.ats_weight,
            scoring.keyword_weight,
            scoring.formatting_weight,
            scoring.content_weight,
        ];
        if weights.iter().any(|w| *w < 0.0) {
            return Err(ResumeAnalyzerError::Configuration(
                "scoring weights must not be negative".to_string(),
            ));
        }
        let sum: f64 = weights.iter().sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(ResumeAnalyzerError::Configuration(format!(
                "scoring weights must sum to 1.0, got {:.3}",
                sum
            )));
        }
        if !(0.0..1.0).contains(&scoring.job_keyword_weight) || scoring.keyword_weight >= 1.0 {
            return Err(ResumeAnalyzerError::Configuration(
                "scoring.job_keyword_weight and scoring.keyword_weight must lie in [0, 1)".to_string(),
            ));
        }

        Ok(())
    }
}

fn check_points(table: &str, total: u32) -> Result<()> {
    if total == 100 {
        Ok(())
    } else {
        Err(ResumeAnalyzerError::Configuration(format!(
            "{} must sum to 100 points, got {}",
            table, total
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.limits.max_file_bytes, 10 * 1024 * 1024);
        assert_eq!(config.keywords.target_skill_count, 10);
    }

    #[test]
    fn test_weights_must_sum_to_100() {
        let mut config = Config::default();
        config.formatting.weights.bullet_consistency += 5;
        assert!(matches!(
            config.validate(),
            Err(ResumeAnalyzerError::Configuration(_))
        ));

        let mut config = Config::default();
        config.scoring.ats_weight = 0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_finite_weights_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[scoring]\nats_weight = nan\n").unwrap();

        match Config::load_from(&path) {
            Err(ResumeAnalyzerError::Configuration(message)) => {
                assert!(message.contains("scoring.ats_weight"))
            }
            other => panic!("expected a configuration error, got {:?}", other),
        }

        let mut config = Config::default();
        config.keywords.near_miss_threshold = f64::INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_content_weights_include_passive_voice() {
        let mut config = Config::default();
        assert_eq!(config.content.weights.total(), 100);

        config.content.weights.passive_voice = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_round_trip_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.limits.overload_policy = OverloadPolicy::Wait;
        config.keywords.custom_skills.push(CustomSkill {
            name: "bevy".to_string(),
            category: SkillCategory::Tool,
            synonyms: vec!["bevy engine".to_string()],
        });
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.limits.overload_policy, OverloadPolicy::Wait);
        assert_eq!(loaded.keywords.custom_skills.len(), 1);
        assert_eq!(loaded.keywords.custom_skills[0].synonyms, vec!["bevy engine"]);
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[limits]\nmax_file_bytes = 2048\n").unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.limits.max_file_bytes, 2048);
        assert_eq!(loaded.limits.min_text_chars, 50);
        assert_eq!(loaded.scoring.job_keyword_weight, 0.4);
    }
}
