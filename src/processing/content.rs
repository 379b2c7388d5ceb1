//! Sentence-level content quality analysis

use crate::config::ContentConfig;
use crate::output::report::{AnalysisArea, Finding};
use crate::processing::document::{ResumeDocument, SectionKind};
use crate::processing::scoring::round_score;
use crate::processing::text_processor::TextProcessor;
use log::debug;
use std::collections::HashSet;

const ACTION_VERBS: &[&str] = &[
    "accelerated", "achieved", "administered", "advised", "analyzed", "architected", "architect",
    "authored", "automated", "boosted", "build", "built", "coached", "collaborated", "completed",
    "configured", "consolidated", "coordinated", "create", "created", "cut", "debugged",
    "decreased", "delivered", "deliver", "deployed", "design", "designed", "develop", "developed",
    "directed", "doubled", "drive", "drove", "earned", "eliminated", "engineered", "enhanced",
    "established", "exceeded", "expanded", "facilitated", "founded", "generated", "grew",
    "halved", "hired", "implemented", "implement", "improved", "increased", "initiated",
    "instituted", "integrated", "introduced", "launched", "lead", "led", "lowered", "maintain",
    "maintained", "manage", "managed", "maximized", "mentored", "migrated", "minimized",
    "modernized", "monitored", "negotiated", "onboarded", "optimize", "optimized", "orchestrated",
    "organized", "oversaw", "own", "owned", "partnered", "pioneered", "presented", "produced",
    "programmed", "published", "raised", "rebuilt", "recruited", "redesigned", "reduced",
    "refactored", "resolved", "restructured", "revamped", "saved", "scaled", "secured",
    "shipped", "shortened", "simplified", "spearheaded", "standardized", "streamlined",
    "strengthened", "supervised", "trained", "transformed", "tripled", "upgraded", "won", "wrote",
];

const FIRST_PERSON: &[&str] = &["i", "me", "my", "mine", "myself"];

/// Openers that describe duties instead of results.
const WEAK_OPENERS: &[&str] = &["responsible for", "duties included", "tasked with", "worked on", "helped with"];

const BE_FORMS: &[&str] = &["am", "is", "are", "was", "were", "be", "been", "being"];

/// Past participles that do not end in -ed.
const IRREGULAR_PARTICIPLES: &[&str] = &[
    "begun", "bought", "brought", "built", "chosen", "done", "drawn", "driven", "found", "given",
    "grown", "held", "kept", "known", "led", "made", "paid", "proven", "put", "run", "seen", "sent",
    "set", "shown", "sold", "spent", "taken", "taught", "told", "won", "written",
];

/// -ed words that read as adjectives after a form of "be".
const ADJECTIVAL_PARTICIPLES: &[&str] = &[
    "based", "dedicated", "excited", "experienced", "interested", "located", "motivated",
    "qualified", "skilled", "talented",
];

/// Shortest unit counted toward the action-verb ratio when no bullets exist.
const MIN_UNIT_WORDS: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct ContentAnalysis {
    pub content_score: u8,
    pub quantified_achievements: Vec<String>,
    pub action_verb_ratio: f64,
    pub first_person_count: usize,
    /// Units containing at least one passive construction
    pub passive_count: usize,
    pub has_summary: bool,
    pub strengths: Vec<Finding>,
    pub improvements: Vec<Finding>,
}

/// A bullet line or sentence.
#[derive(Debug, Clone)]
struct Unit {
    text: String,
    bulleted: bool,
}

pub struct ContentAnalyzer {
    config: ContentConfig,
    processor: TextProcessor,
    verbs: HashSet<&'static str>,
}

impl ContentAnalyzer {
    pub fn new(config: &ContentConfig) -> Self {
        Self {
            config: config.clone(),
            processor: TextProcessor::new(),
            verbs: ACTION_VERBS.iter().copied().collect(),
        }
    }

    pub fn is_action_verb(&self, word: &str) -> bool {
        self.verbs.contains(word.to_lowercase().as_str())
    }

    pub fn analyze(&self, doc: &ResumeDocument) -> ContentAnalysis {
        let weights = &self.config.weights;
        let units = self.units(doc.extracted_text());

        let mut strengths = Vec::new();
        let mut improvements = Vec::new();

        // Quantified achievements
        let quantified_achievements: Vec<String> = units
            .iter()
            .filter(|u| self.is_quantified(&u.text))
            .map(|u| u.text.clone())
            .collect();
        let quantified_credit =
            (quantified_achievements.len() as f64 / self.config.quantified_target as f64).min(1.0);
        let quantified_points = f64::from(weights.quantified_achievements) * quantified_credit;
        if !quantified_achievements.is_empty() {
            strengths.push(Finding::new(
                AnalysisArea::Content,
                format!(
                    "{} achievement(s) backed by numbers, e.g. \"{}\"",
                    quantified_achievements.len(),
                    quantified_achievements[0]
                ),
                u32::from(round_score(quantified_points)),
            ));
        }
        if quantified_achievements.len() < self.config.quantified_target {
            improvements.push(Finding::new(
                AnalysisArea::Content,
                format!(
                    "Quantify more achievements with numbers or percentages ({} of {} found)",
                    quantified_achievements.len(),
                    self.config.quantified_target
                ),
                u32::from(round_score(f64::from(weights.quantified_achievements) - quantified_points)),
            ));
        }

        // Action-verb-led entries
        let candidates = self.verb_candidates(doc, &units);
        let led = candidates
            .iter()
            .filter(|u| self.processor.first_word(&u.text).is_some_and(|w| self.is_action_verb(&w)))
            .count();
        let action_verb_ratio = if candidates.is_empty() {
            0.0
        } else {
            led as f64 / candidates.len() as f64
        };
        let verb_points = f64::from(weights.action_verbs) * action_verb_ratio;
        if action_verb_ratio >= 0.5 {
            strengths.push(Finding::new(
                AnalysisArea::Content,
                format!("{}% of entries open with an action verb", round_score(action_verb_ratio * 100.0)),
                u32::from(round_score(verb_points)),
            ));
        }
        if action_verb_ratio < 0.8 {
            improvements.push(Finding::new(
                AnalysisArea::Content,
                "Start more entries with strong action verbs such as led, built or reduced",
                u32::from(round_score(f64::from(weights.action_verbs) - verb_points)),
            ));
        }

        // First-person pronouns
        let first_person_count = self
            .processor
            .words(doc.extracted_text())
            .iter()
            .filter(|w| FIRST_PERSON.contains(&w.as_str()))
            .count();
        let pronoun_credit = (1.0 - first_person_count as f64 / self.config.pronoun_tolerance as f64).max(0.0);
        let pronoun_points = f64::from(weights.first_person) * pronoun_credit;
        if first_person_count == 0 {
            strengths.push(Finding::new(
                AnalysisArea::Content,
                "Uses implied-subject phrasing with no first-person pronouns",
                weights.first_person,
            ));
        } else {
            improvements.push(Finding::new(
                AnalysisArea::Content,
                format!(
                    "Drop first-person pronouns ({} found); write \"Led the team\" rather than \"I led the team\"",
                    first_person_count
                ),
                u32::from(round_score(f64::from(weights.first_person) - pronoun_points)),
            ));
        }

        // Summary
        let has_summary = self.has_summary(doc);
        let summary_points = if has_summary { f64::from(weights.summary) } else { 0.0 };
        if has_summary {
            strengths.push(Finding::new(
                AnalysisArea::Content,
                "Opens with a professional summary",
                weights.summary,
            ));
        } else {
            improvements.push(Finding::new(
                AnalysisArea::Content,
                "Add a short professional summary at the top",
                weights.summary,
            ));
        }

        // Passive voice
        let passive_count = units
            .iter()
            .filter(|u| self.passive_constructions(&u.text) > 0)
            .count();
        let passive_credit = (1.0 - passive_count as f64 / self.config.passive_tolerance as f64).max(0.0);
        let passive_points = f64::from(weights.passive_voice) * passive_credit;
        if passive_count == 0 {
            strengths.push(Finding::new(
                AnalysisArea::Content,
                "Written in the active voice",
                weights.passive_voice,
            ));
        } else {
            improvements.push(Finding::new(
                AnalysisArea::Content,
                format!(
                    "Rewrite {} passive entr{} in the active voice: \"Generated reports\" rather than \"Reports were generated\"",
                    passive_count,
                    if passive_count == 1 { "y" } else { "ies" }
                ),
                u32::from(round_score(f64::from(weights.passive_voice) - passive_points)),
            ));
        }

        // Duty-style phrasing carries no points of its own.
        let weak = units
            .iter()
            .filter(|u| {
                let lower = u.text.to_lowercase();
                WEAK_OPENERS.iter().any(|opener| lower.starts_with(opener))
            })
            .count();
        if weak > 0 {
            improvements.push(Finding::new(
                AnalysisArea::Content,
                format!(
                    "Rewrite {} duty-style entr{} (\"responsible for ...\") as results",
                    weak,
                    if weak == 1 { "y" } else { "ies" }
                ),
                0,
            ));
        }

        let total = quantified_points + verb_points + pronoun_points + summary_points + passive_points;
        let content_score = round_score(100.0 * total / f64::from(weights.total().max(1)));

        debug!(
            "Content {} (quantified: {}, verb ratio: {:.2}, pronouns: {}, passive: {}, summary: {})",
            content_score,
            quantified_achievements.len(),
            action_verb_ratio,
            first_person_count,
            passive_count,
            has_summary
        );

        ContentAnalysis {
            content_score,
            quantified_achievements,
            action_verb_ratio,
            first_person_count,
            passive_count,
            has_summary,
            strengths,
            improvements,
        }
    }

    /// Contains a number or percent sign and an action verb.
    pub fn is_quantified(&self, text: &str) -> bool {
        self.processor.contains_number(text)
            && self
                .processor
                .words(text)
                .iter()
                .any(|w| self.verbs.contains(w.as_str()))
    }

    /// Counts a form of "be" followed by a past participle, allowing one
    /// adverb or "not" in between: "were generated", "was not approved".
    pub fn passive_constructions(&self, text: &str) -> usize {
        let words = self.processor.words(text);
        words
            .iter()
            .enumerate()
            .filter(|(_, word)| BE_FORMS.contains(&word.as_str()))
            .filter(|(i, _)| {
                let mut following = words[i + 1..].iter().map(String::as_str);
                let candidate = match following.next() {
                    Some(w) if w == "not" || (w.len() > 4 && w.ends_with("ly")) => following.next(),
                    other => other,
                };
                candidate.is_some_and(is_past_participle)
            })
            .count()
    }

    fn units(&self, text: &str) -> Vec<Unit> {
        let mut units = Vec::new();
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            if self.processor.bullet_glyph(line).is_some() {
                units.push(Unit {
                    text: self.processor.strip_bullet(line).to_string(),
                    bulleted: true,
                });
            } else {
                units.extend(self.processor.split_sentences(line).into_iter().map(|text| Unit {
                    text,
                    bulleted: false,
                }));
            }
        }
        units
    }

    /// Entries judged for verb-led phrasing: bullets of the experience and
    /// project sections when present, otherwise sentences long enough to be
    /// statements rather than titles.
    fn verb_candidates(&self, doc: &ResumeDocument, all_units: &[Unit]) -> Vec<Unit> {
        let section_units: Vec<Unit> = SectionKind::LIST_LIKE
            .iter()
            .filter_map(|kind| doc.sections().text(*kind))
            .flat_map(|text| self.units(text))
            .collect();

        let pool = if section_units.is_empty() {
            all_units.to_vec()
        } else {
            section_units
        };

        if pool.iter().any(|u| u.bulleted) {
            pool.into_iter().filter(|u| u.bulleted).collect()
        } else {
            pool.into_iter()
                .filter(|u| self.processor.word_count(&u.text) >= MIN_UNIT_WORDS)
                .collect()
        }
    }

    fn has_summary(&self, doc: &ResumeDocument) -> bool {
        let sections = doc.sections();
        if sections
            .text(SectionKind::Summary)
            .is_some_and(|text| !text.trim().is_empty())
        {
            return true;
        }

        self.processor
            .split_sentences(&sections.preamble)
            .iter()
            .any(|s| self.processor.word_count(s) >= self.config.summary_min_words)
    }
}

fn is_past_participle(word: &str) -> bool {
    if ADJECTIVAL_PARTICIPLES.contains(&word) {
        return false;
    }
    (word.len() > 4 && word.ends_with("ed")) || IRREGULAR_PARTICIPLES.contains(&word)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::file_detector::DocumentFormat;

    fn analyzer() -> ContentAnalyzer {
        ContentAnalyzer::new(&ContentConfig::default())
    }

    fn doc(text: &str) -> ResumeDocument {
        ResumeDocument::new(Vec::new(), DocumentFormat::Pdf, text.to_string(), 0)
    }

    #[test]
    fn test_quantified_statement_detected() {
        let analysis = analyzer().analyze(&doc(
            "John Doe. Experience: Built APIs using Python and React. Reduced latency by 30%.",
        ));

        assert_eq!(analysis.quantified_achievements, vec!["Reduced latency by 30%."]);
        assert!(analysis.strengths.iter().any(|f| f.message.contains("backed by numbers")));
    }

    #[test]
    fn test_quantified_beats_unquantified() {
        let a = analyzer();
        let with_numbers = a.analyze(&doc(
            "John Doe. Experience: Built APIs using Python and React. Reduced latency by 30%.",
        ));
        let without = a.analyze(&doc(
            "John Doe. Experience: Built APIs using Python and React. Reduced latency significantly.",
        ));

        assert!(without.quantified_achievements.is_empty());
        assert!(with_numbers.content_score > without.content_score);
    }

    #[test]
    fn test_number_without_verb_is_not_quantified() {
        let a = analyzer();
        assert!(!a.is_quantified("Team of 12 engineers"));
        assert!(a.is_quantified("Grew revenue 40% in two quarters"));
    }

    #[test]
    fn test_first_person_penalty_scales() {
        let a = analyzer();
        let clean = a.analyze(&doc("Experience\n\u{2022} Led a team of 5\n\u{2022} Built a compiler"));
        let chatty = a.analyze(&doc("Experience\n\u{2022} I led my team of 5\n\u{2022} I built a compiler"));

        assert_eq!(clean.first_person_count, 0);
        assert_eq!(chatty.first_person_count, 3);
        // 20 points, 3 of 5 tolerated pronouns used
        let pronoun_finding = chatty
            .improvements
            .iter()
            .find(|f| f.message.contains("first-person"))
            .unwrap();
        assert_eq!(pronoun_finding.impact, 12);
        assert!(clean.content_score > chatty.content_score);
    }

    #[test]
    fn test_action_verb_ratio_uses_experience_bullets() {
        let analysis = analyzer().analyze(&doc(
            "Experience\nSenior Engineer, Acme Corp 2019 - 2023\n\u{2022} Led migration to Kubernetes\n\u{2022} Responsible for on-call rota",
        ));

        assert!((analysis.action_verb_ratio - 0.5).abs() < f64::EPSILON);
        assert!(analysis.improvements.iter().any(|f| f.message.contains("duty-style")));
    }

    #[test]
    fn test_summary_detection() {
        let a = analyzer();
        let with_section = a.analyze(&doc("Summary\nBackend engineer\n\nExperience\n\u{2022} Built things"));
        let with_preamble = a.analyze(&doc(
            "Jane Doe\nBackend engineer with eight years of experience building payment systems at scale.\n\nExperience\n\u{2022} Built things",
        ));
        let without = a.analyze(&doc("Jane Doe\n\nExperience\n\u{2022} Built things"));

        assert!(with_section.has_summary);
        assert!(with_preamble.has_summary);
        assert!(!without.has_summary);
    }

    #[test]
    fn test_passive_voice_detected() {
        let a = analyzer();
        let passive = a.analyze(&doc(
            "Experience\n\u{2022} Was responsible for the billing service\n\u{2022} Reports were generated weekly for finance\n\u{2022} The API was built by a contractor",
        ));
        let active = a.analyze(&doc(
            "Experience\n\u{2022} Owned the billing service\n\u{2022} Generated weekly reports for finance\n\u{2022} Built the public API",
        ));

        assert_eq!(passive.passive_count, 2);
        assert_eq!(active.passive_count, 0);

        // 5 points, 2 of 3 tolerated entries used
        let finding = passive
            .improvements
            .iter()
            .find(|f| f.message.contains("passive"))
            .unwrap();
        assert_eq!(finding.impact, 3);
        assert!(!active.improvements.iter().any(|f| f.message.contains("passive")));
        assert!(active.strengths.iter().any(|f| f.message.contains("active voice")));
    }

    #[test]
    fn test_passive_constructions() {
        let a = analyzer();
        assert_eq!(a.passive_constructions("Reports were generated weekly"), 1);
        assert_eq!(a.passive_constructions("The release was not approved"), 1);
        assert_eq!(a.passive_constructions("Budget was quickly given to the team"), 1);
        assert_eq!(a.passive_constructions("Was responsible for the billing service"), 0);
        assert_eq!(a.passive_constructions("Engineer based in Berlin, is experienced in Go"), 0);
        assert_eq!(a.passive_constructions("Generated reports and built the API"), 0);
    }
}
