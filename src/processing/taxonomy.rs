//! Curated skill taxonomy and lexical skill matching

use crate::config::CustomSkill;
use crate::error::{Result, ResumeAnalyzerError};
use aho_corasick::{AhoCorasick, MatchKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillCategory {
    Technical,
    Soft,
    Certification,
    Tool,
}

impl SkillCategory {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "technical" | "tech" => Some(SkillCategory::Technical),
            "soft" => Some(SkillCategory::Soft),
            "certification" | "cert" => Some(SkillCategory::Certification),
            "tool" | "tools" => Some(SkillCategory::Tool),
            _ => None,
        }
    }
}

impl fmt::Display for SkillCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkillCategory::Technical => write!(f, "technical"),
            SkillCategory::Soft => write!(f, "soft"),
            SkillCategory::Certification => write!(f, "certification"),
            SkillCategory::Tool => write!(f, "tool"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillRecord {
    pub canonical_name: String,
    /// Surface forms, lowercase. Always includes the canonical name.
    pub synonyms: Vec<String>,
    pub category: SkillCategory,
}

impl SkillRecord {
    pub fn new(canonical_name: &str, category: SkillCategory, synonyms: &[&str]) -> Self {
        let canonical_name = canonical_name.trim().to_lowercase();
        let mut forms = vec![canonical_name.clone()];
        for synonym in synonyms {
            let synonym = synonym.trim().to_lowercase();
            if !synonym.is_empty() && !forms.contains(&synonym) {
                forms.push(synonym);
            }
        }

        Self {
            canonical_name,
            synonyms: forms,
            category,
        }
    }
}

/// A resolved occurrence of a skill in text. Offsets are byte positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkillMatch {
    pub skill: usize,
    pub start: usize,
    pub end: usize,
}

/// Read-only skill taxonomy. Built once and shared across requests.
pub struct SkillTaxonomy {
    records: Vec<SkillRecord>,
    matcher: AhoCorasick,
    /// Owning record for each automaton pattern.
    pattern_owner: Vec<usize>,
}

impl fmt::Debug for SkillTaxonomy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkillTaxonomy")
            .field("skills", &self.records.len())
            .field("patterns", &self.pattern_owner.len())
            .finish()
    }
}

impl SkillTaxonomy {
    pub fn builtin() -> Result<Self> {
        Self::new(Self::builtin_records())
    }

    /// Built-in skills followed by user-declared ones. A custom skill whose
    /// name is already known adds its synonyms to that record.
    pub fn with_custom_skills(custom: &[CustomSkill]) -> Result<Self> {
        let mut records = Self::builtin_records();

        for skill in custom {
            let synonyms: Vec<&str> = skill.synonyms.iter().map(String::as_str).collect();
            let record = SkillRecord::new(&skill.name, skill.category, &synonyms);
            if record.canonical_name.is_empty() {
                return Err(ResumeAnalyzerError::Configuration(
                    "custom skill with an empty name".to_string(),
                ));
            }

            match records
                .iter_mut()
                .find(|r| r.canonical_name == record.canonical_name)
            {
                Some(existing) => {
                    for synonym in record.synonyms {
                        if !existing.synonyms.contains(&synonym) {
                            existing.synonyms.push(synonym);
                        }
                    }
                }
                None => records.push(record),
            }
        }

        Self::new(records)
    }

    pub fn new(records: Vec<SkillRecord>) -> Result<Self> {
        let mut patterns: Vec<String> = Vec::new();
        let mut pattern_owner = Vec::new();
        let mut seen = HashSet::new();

        // A surface form declared twice belongs to the earlier record.
        for (index, record) in records.iter().enumerate() {
            for synonym in &record.synonyms {
                let key = synonym.to_lowercase();
                if !key.is_empty() && seen.insert(key.clone()) {
                    patterns.push(key);
                    pattern_owner.push(index);
                }
            }
        }

        let matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::Standard)
            .build(&patterns)
            .map_err(|e| ResumeAnalyzerError::Configuration(format!("Failed to build skill matcher: {}", e)))?;

        Ok(Self {
            records,
            matcher,
            pattern_owner,
        })
    }

    pub fn records(&self) -> &[SkillRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn index_of(&self, canonical_name: &str) -> Option<usize> {
        let name = canonical_name.trim().to_lowercase();
        self.records.iter().position(|r| r.canonical_name == name)
    }

    pub fn get(&self, canonical_name: &str) -> Option<&SkillRecord> {
        self.index_of(canonical_name).map(|i| &self.records[i])
    }

    /// Non-overlapping skill occurrences, left to right. At each position the
    /// longest surface form wins; equal lengths go to the earlier record.
    pub fn find_matches(&self, text: &str) -> Vec<SkillMatch> {
        let mut candidates: Vec<SkillMatch> = self
            .matcher
            .find_overlapping_iter(text)
            .filter(|m| is_word_bounded(text, m.start(), m.end()))
            .map(|m| SkillMatch {
                skill: self.pattern_owner[m.pattern().as_usize()],
                start: m.start(),
                end: m.end(),
            })
            .collect();

        candidates.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then((b.end - b.start).cmp(&(a.end - a.start)))
                .then(a.skill.cmp(&b.skill))
        });

        let mut resolved = Vec::new();
        let mut cursor = 0;
        for candidate in candidates {
            if candidate.start >= cursor {
                cursor = candidate.end;
                resolved.push(candidate);
            }
        }
        resolved
    }

    /// Distinct record indices present in `text`, in taxonomy order.
    pub fn match_skill_ids(&self, text: &str) -> Vec<usize> {
        self.find_matches(text)
            .into_iter()
            .map(|m| m.skill)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Canonical names of the skills present in `text`, in taxonomy order.
    pub fn match_skills(&self, text: &str) -> Vec<String> {
        self.match_skill_ids(text)
            .into_iter()
            .map(|i| self.records[i].canonical_name.clone())
            .collect()
    }

    fn builtin_records() -> Vec<SkillRecord> {
        use SkillCategory::*;

        BUILTIN_SKILLS
            .iter()
            .map(|(name, category, synonyms)| {
                let category = match category {
                    'T' => Technical,
                    'S' => Soft,
                    'C' => Certification,
                    _ => Tool,
                };
                SkillRecord::new(name, category, synonyms)
            })
            .collect()
    }
}

fn is_word_bounded(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

// (canonical name, category tag, extra surface forms)
// Tags: T technical, S soft, C certification, O tool.
// Certifications sit ahead of the skills their titles contain.
const BUILTIN_SKILLS: &[(&str, char, &[&str])] = &[
    // Languages
    ("python", 'T', &["python3"]),
    ("javascript", 'T', &["js", "ecmascript", "es6"]),
    ("typescript", 'T', &[]),
    ("java", 'T', &[]),
    ("c++", 'T', &["cpp"]),
    ("c#", 'T', &["csharp", "c sharp"]),
    ("golang", 'T', &["go lang"]),
    ("rust", 'T', &[]),
    ("ruby", 'T', &[]),
    ("php", 'T', &[]),
    ("kotlin", 'T', &[]),
    ("swift", 'T', &[]),
    ("scala", 'T', &[]),
    ("sql", 'T', &[]),
    ("bash", 'T', &["shell scripting"]),
    ("powershell", 'T', &[]),
    ("matlab", 'T', &[]),
    ("html", 'T', &["html5"]),
    ("css", 'T', &["css3"]),
    ("sass", 'T', &["scss"]),
    // Frameworks and libraries
    ("react", 'T', &["react.js", "reactjs"]),
    ("react native", 'T', &[]),
    ("angular", 'T', &["angularjs", "angular.js"]),
    ("vue", 'T', &["vue.js", "vuejs"]),
    ("svelte", 'T', &[]),
    ("next.js", 'T', &["nextjs", "next js"]),
    ("node.js", 'T', &["nodejs", "node js"]),
    ("express", 'T', &["express.js", "expressjs"]),
    ("redux", 'T', &[]),
    ("jquery", 'T', &[]),
    ("tailwind css", 'T', &["tailwind", "tailwindcss"]),
    ("bootstrap", 'T', &[]),
    ("django", 'T', &[]),
    ("flask", 'T', &[]),
    ("fastapi", 'T', &[]),
    ("spring boot", 'T', &["spring framework"]),
    ("ruby on rails", 'T', &["rails", "ror"]),
    ("laravel", 'T', &[]),
    (".net", 'T', &["dotnet", "asp.net", ".net core"]),
    // Data and machine learning
    ("machine learning", 'T', &[]),
    ("deep learning", 'T', &[]),
    ("natural language processing", 'T', &["nlp"]),
    ("computer vision", 'T', &[]),
    ("data analysis", 'T', &["data analytics"]),
    ("tensorflow", 'T', &[]),
    ("pytorch", 'T', &[]),
    ("scikit-learn", 'T', &["sklearn", "scikit learn"]),
    ("pandas", 'T', &[]),
    ("numpy", 'T', &[]),
    ("apache spark", 'T', &["spark", "pyspark"]),
    ("hadoop", 'T', &[]),
    ("apache kafka", 'T', &["kafka"]),
    ("airflow", 'T', &["apache airflow"]),
    // Storage
    ("postgresql", 'T', &["postgres"]),
    ("mysql", 'T', &[]),
    ("sqlite", 'T', &[]),
    ("mongodb", 'T', &["mongo"]),
    ("redis", 'T', &[]),
    ("elasticsearch", 'T', &["elastic search"]),
    ("dynamodb", 'T', &[]),
    ("cassandra", 'T', &[]),
    ("nosql", 'T', &[]),
    // APIs and architecture
    ("graphql", 'T', &[]),
    ("rest api", 'T', &["rest apis", "restful", "restful api", "restful apis"]),
    ("grpc", 'T', &[]),
    ("microservices", 'T', &["microservice"]),
    // Practices
    ("ci/cd", 'T', &["cicd", "ci cd", "continuous integration", "continuous delivery", "continuous deployment"]),
    ("devops", 'T', &[]),
    ("agile", 'T', &[]),
    ("scrum", 'T', &[]),
    ("kanban", 'T', &[]),
    ("test-driven development", 'T', &["tdd", "test driven development"]),
    ("unit testing", 'T', &["unit tests"]),
    // Certifications
    ("aws certified solutions architect", 'C', &["aws solutions architect"]),
    ("aws certified developer", 'C', &[]),
    ("certified kubernetes administrator", 'C', &["cka"]),
    ("project management professional", 'C', &["pmp"]),
    ("certified scrummaster", 'C', &["certified scrum master", "csm"]),
    ("cissp", 'C', &[]),
    ("comptia security+", 'C', &["security+"]),
    ("ccna", 'C', &[]),
    ("google cloud professional", 'C', &["professional cloud architect"]),
    ("azure fundamentals", 'C', &["az-900"]),
    // Tools and platforms
    ("aws", 'O', &["amazon web services"]),
    ("azure", 'O', &["microsoft azure"]),
    ("gcp", 'O', &["google cloud", "google cloud platform"]),
    ("docker", 'O', &[]),
    ("kubernetes", 'O', &["k8s"]),
    ("helm", 'O', &[]),
    ("terraform", 'O', &[]),
    ("ansible", 'O', &[]),
    ("jenkins", 'O', &[]),
    ("github actions", 'O', &[]),
    ("git", 'O', &[]),
    ("github", 'O', &[]),
    ("gitlab", 'O', &[]),
    ("linux", 'O', &["unix"]),
    ("nginx", 'O', &[]),
    ("prometheus", 'O', &[]),
    ("grafana", 'O', &[]),
    ("jira", 'O', &[]),
    ("confluence", 'O', &[]),
    ("figma", 'O', &[]),
    ("postman", 'O', &[]),
    ("webpack", 'O', &[]),
    ("jest", 'O', &[]),
    ("cypress", 'O', &[]),
    ("selenium", 'O', &[]),
    ("pytest", 'O', &[]),
    ("junit", 'O', &[]),
    ("tableau", 'O', &[]),
    ("power bi", 'O', &["powerbi"]),
    ("excel", 'O', &["microsoft excel"]),
    // Soft skills
    ("leadership", 'S', &["team lead", "led a team", "team leadership"]),
    ("communication", 'S', &["communication skills"]),
    ("teamwork", 'S', &["team player", "collaboration", "collaborative"]),
    ("problem solving", 'S', &["problem-solving", "troubleshooting"]),
    ("project management", 'S', &[]),
    ("time management", 'S', &[]),
    ("mentoring", 'S', &["mentorship", "mentored", "coaching"]),
    ("critical thinking", 'S', &[]),
    ("stakeholder management", 'S', &[]),
    ("public speaking", 'S', &["presentations"]),
    ("adaptability", 'S', &["adaptable"]),
];
