//! Skill extraction and keyword relevance scoring

use crate::config::KeywordConfig;
use crate::error::{Result, ResumeAnalyzerError};
use crate::output::report::{AnalysisArea, Finding, NearMiss};
use crate::processing::document::ResumeDocument;
use crate::processing::scoring::round_score;
use crate::processing::taxonomy::SkillTaxonomy;
use crate::processing::text_processor::TextProcessor;
use log::debug;
use std::collections::HashSet;
use std::sync::Arc;
use strsim::jaro_winkler;

/// Missing job skills named in a single improvement statement.
const MAX_NAMED_MISSING: usize = 5;

/// Shortest word considered for misspelling detection.
const NEAR_MISS_MIN_CHARS: usize = 5;

/// A job description with its recognized skills.
#[derive(Debug, Clone, PartialEq)]
pub struct JobDescription {
    pub text: String,
    /// Canonical names, in taxonomy order
    pub required_skills: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeywordAnalysis {
    pub skills_found: Vec<String>,
    pub missing_skills: Vec<String>,
    pub keyword_score: u8,
    /// Same as `keyword_score` when a job description was supplied
    pub job_match_score: Option<u8>,
    pub required_skills: Option<Vec<String>>,
    pub near_misses: Vec<NearMiss>,
    pub strengths: Vec<Finding>,
    pub improvements: Vec<Finding>,
}

pub struct KeywordMatcher {
    taxonomy: Arc<SkillTaxonomy>,
    processor: TextProcessor,
    target_skill_count: usize,
    common_gap_skills: Vec<String>,
    near_miss_threshold: f64,
    /// Every single-word surface form; such words are never near misses.
    known_forms: HashSet<String>,
}

impl KeywordMatcher {
    pub fn new(taxonomy: Arc<SkillTaxonomy>, config: &KeywordConfig) -> Result<Self> {
        let mut common_gap_skills = Vec::new();
        for name in &config.common_gap_skills {
            let record = taxonomy.get(name).ok_or_else(|| {
                ResumeAnalyzerError::Configuration(format!(
                    "common gap skill '{}' is not in the skill taxonomy",
                    name
                ))
            })?;
            if !common_gap_skills.contains(&record.canonical_name) {
                common_gap_skills.push(record.canonical_name.clone());
            }
        }

        let known_forms = taxonomy
            .records()
            .iter()
            .flat_map(|r| r.synonyms.iter())
            .filter(|s| !s.contains(char::is_whitespace))
            .cloned()
            .collect();

        Ok(Self {
            taxonomy,
            processor: TextProcessor::new(),
            target_skill_count: config.target_skill_count.max(1),
            common_gap_skills,
            near_miss_threshold: config.near_miss_threshold,
            known_forms,
        })
    }

    pub fn taxonomy(&self) -> &SkillTaxonomy {
        &self.taxonomy
    }

    /// Returns `None` for a blank description, which is treated as absent.
    pub fn parse_job_description(&self, text: &str) -> Option<JobDescription> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        Some(JobDescription {
            text: text.to_string(),
            required_skills: self.taxonomy.match_skills(text),
        })
    }

    pub fn analyze(&self, doc: &ResumeDocument, job: Option<&JobDescription>) -> KeywordAnalysis {
        let skills_found = self.taxonomy.match_skills(doc.extracted_text());
        debug!("Recognized {} skills: {:?}", skills_found.len(), skills_found);

        let mut strengths = Vec::new();
        let mut improvements = Vec::new();

        let (missing_skills, keyword_score, points_per_skill) = match job {
            Some(job) => {
                let required = &job.required_skills;
                let matched: Vec<&String> = required.iter().filter(|s| skills_found.contains(s)).collect();
                let missing: Vec<String> = required
                    .iter()
                    .filter(|s| !skills_found.contains(s))
                    .cloned()
                    .collect();

                let score = round_score(100.0 * matched.len() as f64 / required.len().max(1) as f64);

                if required.is_empty() {
                    improvements.push(Finding::new(
                        AnalysisArea::Keywords,
                        "The job description names no recognized skills, so keyword match could not be assessed",
                        0,
                    ));
                } else {
                    if !matched.is_empty() {
                        strengths.push(Finding::new(
                            AnalysisArea::Keywords,
                            format!(
                                "Matches {} of {} skills the job asks for: {}",
                                matched.len(),
                                required.len(),
                                join_names(matched.iter().map(|s| s.as_str()), MAX_NAMED_MISSING)
                            ),
                            u32::from(score),
                        ));
                    }
                    if !missing.is_empty() {
                        improvements.push(Finding::new(
                            AnalysisArea::Keywords,
                            format!(
                                "Add the job's required skills you have experience with: {}",
                                join_names(missing.iter().map(String::as_str), MAX_NAMED_MISSING)
                            ),
                            100 - u32::from(score),
                        ));
                    }
                }

                let per_skill = 100.0 / required.len().max(1) as f64;
                (missing, score, per_skill)
            }
            None => {
                let found = skills_found.len();
                let score = round_score(100.0 * (found as f64 / self.target_skill_count as f64).min(1.0));
                let missing: Vec<String> = self
                    .common_gap_skills
                    .iter()
                    .filter(|s| !skills_found.contains(s))
                    .cloned()
                    .collect();

                if found > 0 {
                    strengths.push(Finding::new(
                        AnalysisArea::Keywords,
                        format!(
                            "Lists {} recognized skills, including {}",
                            found,
                            join_names(skills_found.iter().map(String::as_str), 3)
                        ),
                        u32::from(score),
                    ));
                }
                if score < 100 {
                    let mut message = format!(
                        "Only {} of the {} skills a competitive resume usually lists were recognized",
                        found, self.target_skill_count
                    );
                    if !missing.is_empty() {
                        message.push_str(&format!(
                            "; consider in-demand skills such as {}",
                            join_names(missing.iter().map(String::as_str), 3)
                        ));
                    }
                    improvements.push(Finding::new(AnalysisArea::Keywords, message, 100 - u32::from(score)));
                }

                let per_skill = if found < self.target_skill_count {
                    100.0 / self.target_skill_count as f64
                } else {
                    0.0
                };
                (missing, score, per_skill)
            }
        };

        let near_misses = self.near_misses(doc.extracted_text(), &missing_skills);
        for near in &near_misses {
            improvements.push(Finding::new(
                AnalysisArea::Keywords,
                format!(
                    "\"{}\" looks like a misspelling of {}; ATS parsers only match exact terms",
                    near.found_as, near.skill
                ),
                u32::from(round_score(points_per_skill)),
            ));
        }

        KeywordAnalysis {
            skills_found,
            missing_skills,
            keyword_score,
            job_match_score: job.map(|_| keyword_score),
            required_skills: job.map(|j| j.required_skills.clone()),
            near_misses,
            strengths,
            improvements,
        }
    }

    /// For each missing skill, the resume word most similar to one of its
    /// single-word surface forms, if above the threshold.
    fn near_misses(&self, text: &str, missing: &[String]) -> Vec<NearMiss> {
        let words: Vec<String> = {
            let mut seen = HashSet::new();
            self.processor
                .words(text)
                .into_iter()
                .filter(|w| w.chars().count() >= NEAR_MISS_MIN_CHARS && !self.known_forms.contains(w))
                .filter(|w| seen.insert(w.clone()))
                .collect()
        };

        let mut near_misses = Vec::new();
        for skill in missing {
            let Some(record) = self.taxonomy.get(skill) else {
                continue;
            };

            let mut best: Option<(f64, &String)> = None;
            for form in record
                .synonyms
                .iter()
                .filter(|f| f.chars().count() >= NEAR_MISS_MIN_CHARS && !f.contains(char::is_whitespace))
            {
                for word in &words {
                    let similarity = jaro_winkler(word, form);
                    if similarity >= self.near_miss_threshold
                        && best.map_or(true, |(score, _)| similarity > score)
                    {
                        best = Some((similarity, word));
                    }
                }
            }

            if let Some((_, word)) = best {
                near_misses.push(NearMiss {
                    skill: skill.clone(),
                    found_as: word.clone(),
                });
            }
        }
        near_misses
    }
}

fn join_names<'a>(names: impl Iterator<Item = &'a str>, limit: usize) -> String {
    let names: Vec<&str> = names.collect();
    if names.len() <= limit {
        return names.join(", ");
    }
    format!("{} and {} more", names[..limit].join(", "), names.len() - limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::file_detector::DocumentFormat;

    fn matcher() -> KeywordMatcher {
        KeywordMatcher::new(Arc::new(SkillTaxonomy::builtin().unwrap()), &KeywordConfig::default()).unwrap()
    }

    fn doc(text: &str) -> ResumeDocument {
        ResumeDocument::new(Vec::new(), DocumentFormat::Pdf, text.to_string(), 0)
    }

    #[test]
    fn test_resume_only_scoring() {
        let m = matcher();
        let analysis = m.analyze(&doc("Built APIs using Python and React. Reduced latency by 30%."), None);

        assert_eq!(analysis.skills_found, vec!["python", "react"]);
        assert_eq!(analysis.keyword_score, 20);
        assert_eq!(analysis.job_match_score, None);
        assert_eq!(analysis.missing_skills.len(), 10);
        assert_eq!(analysis.missing_skills[0], "docker");
    }

    #[test]
    fn test_resume_only_score_saturates() {
        let text = "Python, Java, Rust, Go lang, SQL, Docker, Kubernetes, Redis, React, GraphQL, Linux, Git";
        let analysis = matcher().analyze(&doc(text), None);

        assert_eq!(analysis.keyword_score, 100);
        assert!(!analysis.missing_skills.iter().any(|s| s == "docker" || s == "redis"));
    }

    #[test]
    fn test_job_description_missing_skills() {
        let m = matcher();
        let job = m.parse_job_description("Looking for a Kubernetes and GraphQL expert").unwrap();
        let analysis = m.analyze(&doc("Built APIs using Python and React."), Some(&job));

        assert_eq!(job.required_skills, vec!["graphql", "kubernetes"]);
        assert_eq!(analysis.keyword_score, 0);
        assert_eq!(analysis.job_match_score, Some(0));
        assert!(analysis.missing_skills.contains(&"kubernetes".to_string()));
        assert!(analysis.missing_skills.contains(&"graphql".to_string()));
    }

    #[test]
    fn test_job_description_without_known_skills() {
        let m = matcher();
        let job = m.parse_job_description("We want a friendly person who likes plants").unwrap();
        let analysis = m.analyze(&doc("Python developer"), Some(&job));

        assert_eq!(analysis.keyword_score, 0);
        assert!(analysis.missing_skills.is_empty());
        assert_eq!(analysis.required_skills, Some(Vec::new()));
    }

    #[test]
    fn test_partial_job_match() {
        let m = matcher();
        let job = m.parse_job_description("Python, Docker and Kubernetes").unwrap();
        let analysis = m.analyze(&doc("Python and Docker in production"), Some(&job));

        assert_eq!(analysis.keyword_score, 67);
        assert_eq!(analysis.missing_skills, vec!["kubernetes"]);
        assert_eq!(analysis.strengths[0].impact, 67);
        assert_eq!(analysis.improvements[0].impact, 33);
    }

    #[test]
    fn test_blank_job_description_is_absent() {
        assert!(matcher().parse_job_description("   \n\t").is_none());
    }

    #[test]
    fn test_near_miss_reported_but_not_found() {
        let m = matcher();
        let job = m.parse_job_description("Kubernetes required").unwrap();
        let analysis = m.analyze(&doc("Operated Kubernets clusters"), Some(&job));

        assert!(analysis.skills_found.is_empty());
        assert_eq!(
            analysis.near_misses,
            vec![NearMiss {
                skill: "kubernetes".to_string(),
                found_as: "kubernets".to_string(),
            }]
        );
    }

    #[test]
    fn test_unknown_gap_skill_is_configuration_error() {
        let config = KeywordConfig {
            common_gap_skills: vec!["basket weaving".to_string()],
            ..KeywordConfig::default()
        };
        let result = KeywordMatcher::new(Arc::new(SkillTaxonomy::builtin().unwrap()), &config);
        assert!(matches!(result, Err(ResumeAnalyzerError::Configuration(_))));
    }

    #[test]
    fn test_join_names_truncates() {
        let names = ["a", "b", "c", "d"];
        assert_eq!(join_names(names.iter().copied(), 2), "a, b and 2 more");
        assert_eq!(join_names(names.iter().copied(), 4), "a, b, c, d");
    }
}
