//! Score aggregation and report assembly

use crate::config::ScoringConfig;
use crate::output::report::{AnalysisReport, Finding, Grade};
use crate::processing::content::ContentAnalysis;
use crate::processing::document::ResumeDocument;
use crate::processing::formatting::FormattingAnalysis;
use crate::processing::keyword_matcher::KeywordAnalysis;
use log::info;
use std::collections::HashSet;

/// Round half away from zero and clamp to the 0-100 score range.
pub fn round_score(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}

/// Weights applied to the four sub-scores for one request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub ats: f64,
    pub keyword: f64,
    pub formatting: f64,
    pub content: f64,
}

impl ScoreWeights {
    /// With a job description the keyword weight is raised and the other
    /// three shrink proportionally so the total stays 1.0.
    pub fn for_request(config: &ScoringConfig, has_job_description: bool) -> Self {
        if !has_job_description {
            return Self {
                ats: config.ats_weight,
                keyword: config.keyword_weight,
                formatting: config.formatting_weight,
                content: config.content_weight,
            };
        }

        let rest = 1.0 - config.keyword_weight;
        let scale = if rest > 0.0 {
            (1.0 - config.job_keyword_weight) / rest
        } else {
            0.0
        };
        Self {
            ats: config.ats_weight * scale,
            keyword: config.job_keyword_weight,
            formatting: config.formatting_weight * scale,
            content: config.content_weight * scale,
        }
    }
}

pub struct ScoreAggregator {
    config: ScoringConfig,
}

impl ScoreAggregator {
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn overall_score(&self, ats: u8, keyword: u8, formatting: u8, content: u8, has_job_description: bool) -> u8 {
        let w = ScoreWeights::for_request(&self.config, has_job_description);
        round_score(
            w.ats * f64::from(ats)
                + w.keyword * f64::from(keyword)
                + w.formatting * f64::from(formatting)
                + w.content * f64::from(content),
        )
    }

    pub fn aggregate(
        &self,
        doc: &ResumeDocument,
        filename: &str,
        keywords: KeywordAnalysis,
        formatting: FormattingAnalysis,
        content: ContentAnalysis,
    ) -> AnalysisReport {
        let has_job_description = keywords.job_match_score.is_some();
        let overall_score = self.overall_score(
            formatting.ats_score,
            keywords.keyword_score,
            formatting.formatting_score,
            content.content_score,
            has_job_description,
        );

        info!(
            "Scored {}: overall {} (ats {}, keyword {}, formatting {}, content {})",
            filename,
            overall_score,
            formatting.ats_score,
            keywords.keyword_score,
            formatting.formatting_score,
            content.content_score
        );

        let strengths = merge_findings([keywords.strengths, formatting.strengths, content.strengths]);
        let improvements = merge_findings([keywords.improvements, formatting.improvements, content.improvements]);

        AnalysisReport {
            filename: filename.to_string(),
            mime_type: doc.mime_type().to_string(),
            overall_score,
            ats_score: formatting.ats_score,
            keyword_score: keywords.keyword_score,
            formatting_score: formatting.formatting_score,
            content_score: content.content_score,
            job_match_score: keywords.job_match_score,
            grade: Grade::from_score(overall_score),
            skills_found: keywords.skills_found,
            missing_skills: keywords.missing_skills,
            job_required_skills: keywords.required_skills,
            near_misses: keywords.near_misses,
            sections_detected: doc.sections().kinds(),
            missing_sections: formatting.missing_sections,
            strengths,
            improvements,
            word_count: doc.stats().word_count,
        }
    }
}

/// Concatenate in order, sort by impact descending (stable), drop repeated messages.
pub fn merge_findings<const N: usize>(lists: [Vec<Finding>; N]) -> Vec<Finding> {
    let mut merged: Vec<Finding> = lists.into_iter().flatten().collect();
    merged.sort_by(|a, b| b.impact.cmp(&a.impact));

    let mut seen = HashSet::new();
    merged.retain(|f| seen.insert(f.message.clone()));
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::report::AnalysisArea;

    fn aggregator() -> ScoreAggregator {
        ScoreAggregator::new(&ScoringConfig::default())
    }

    #[test]
    fn test_round_score_half_away_from_zero() {
        assert_eq!(round_score(72.5), 73);
        assert_eq!(round_score(72.49), 72);
        assert_eq!(round_score(-3.0), 0);
        assert_eq!(round_score(140.0), 100);
        assert_eq!(round_score(f64::NAN), 0);
    }

    #[test]
    fn test_default_weights() {
        // 0.3 * 80 + 0.3 * 50 + 0.2 * 70 + 0.2 * 60
        assert_eq!(aggregator().overall_score(80, 50, 70, 60, false), 65);
    }

    #[test]
    fn test_job_description_weights_renormalize() {
        let w = ScoreWeights::for_request(&ScoringConfig::default(), true);

        assert!((w.keyword - 0.4).abs() < 1e-9);
        assert!((w.ats + w.keyword + w.formatting + w.content - 1.0).abs() < 1e-9);
        assert!((w.ats / w.formatting - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_keyword_dominates_with_job_description() {
        let a = aggregator();
        assert!(a.overall_score(50, 100, 50, 50, true) > a.overall_score(50, 100, 50, 50, false));
        assert_eq!(a.overall_score(100, 100, 100, 100, true), 100);
        assert_eq!(a.overall_score(0, 0, 0, 0, true), 0);
    }

    #[test]
    fn test_merge_orders_by_impact_and_dedups() {
        let merged = merge_findings([
            vec![
                Finding::new(AnalysisArea::Keywords, "a", 10),
                Finding::new(AnalysisArea::Keywords, "b", 30),
            ],
            vec![
                Finding::new(AnalysisArea::Content, "c", 10),
                Finding::new(AnalysisArea::Content, "b", 5),
            ],
        ]);

        let messages: Vec<&str> = merged.iter().map(|f| f.message.as_str()).collect();
        assert_eq!(messages, vec!["b", "a", "c"]);
        assert_eq!(merged[0].impact, 30);
    }
}
