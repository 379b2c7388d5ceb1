//! Main analysis engine: extraction, the three analyzers and aggregation

use crate::config::{Config, OverloadPolicy};
use crate::error::{Result, ResumeAnalyzerError};
use crate::input::file_detector::DocumentFormat;
use crate::input::manager::DocumentExtractor;
use crate::output::report::AnalysisReport;
use crate::processing::content::ContentAnalyzer;
use crate::processing::document::ResumeDocument;
use crate::processing::formatting::FormattingAnalyzer;
use crate::processing::keyword_matcher::{JobDescription, KeywordMatcher};
use crate::processing::scoring::ScoreAggregator;
use crate::processing::taxonomy::SkillTaxonomy;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinError;

/// One resume to analyze.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub job_description: Option<String>,
    pub filename: Option<String>,
}

impl AnalysisRequest {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
            job_description: None,
            filename: None,
        }
    }

    pub fn with_job_description(mut self, text: impl Into<String>) -> Self {
        self.job_description = Some(text.into());
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }
}

/// Analysis engine shared by all requests. Holds only read-only state plus
/// the extraction worker pool.
pub struct AnalysisEngine {
    extractor: Arc<DocumentExtractor>,
    keywords: Arc<KeywordMatcher>,
    formatting: Arc<FormattingAnalyzer>,
    content: Arc<ContentAnalyzer>,
    aggregator: ScoreAggregator,
    workers: Arc<Semaphore>,
    capacity: usize,
    overload_policy: OverloadPolicy,
    request_timeout: Duration,
}

impl AnalysisEngine {
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;

        let taxonomy = Arc::new(SkillTaxonomy::with_custom_skills(&config.keywords.custom_skills)?);
        info!("Loaded skill taxonomy with {} skills", taxonomy.len());

        let capacity = config.limits.extraction_workers;

        Ok(Self {
            extractor: Arc::new(DocumentExtractor::new(&config.limits)),
            keywords: Arc::new(KeywordMatcher::new(taxonomy, &config.keywords)?),
            formatting: Arc::new(FormattingAnalyzer::new(&config.formatting)),
            content: Arc::new(ContentAnalyzer::new(&config.content)),
            aggregator: ScoreAggregator::new(&config.scoring),
            workers: Arc::new(Semaphore::new(capacity)),
            capacity,
            overload_policy: config.limits.overload_policy,
            request_timeout: Duration::from_millis(config.limits.request_timeout_ms),
        })
    }

    pub fn taxonomy(&self) -> &SkillTaxonomy {
        self.keywords.taxonomy()
    }

    pub fn extractor(&self) -> &DocumentExtractor {
        &self.extractor
    }

    /// Extraction slots not currently in use.
    pub fn available_workers(&self) -> usize {
        self.workers.available_permits()
    }

    pub fn job_description(&self, text: &str) -> Option<JobDescription> {
        self.keywords.parse_job_description(text)
    }

    /// Analyze a resume. Oversized and unsupported input is rejected before
    /// anything is parsed; the rest runs under the request deadline.
    pub async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisReport> {
        let start = Instant::now();

        if let Err(e) = self.extractor.check_size(request.bytes.len()) {
            warn!("Rejected upload: {}", e);
            return Err(e);
        }
        let format = DocumentExtractor::resolve_format(&request.mime_type)?;

        let limit_ms = self.request_timeout.as_millis() as u64;
        let report = tokio::time::timeout(self.request_timeout, self.run(request, format))
            .await
            .map_err(|_| {
                warn!("Analysis exceeded {}ms deadline", limit_ms);
                ResumeAnalyzerError::Timeout { limit_ms }
            })??;

        info!("Analysis completed in {:?}", start.elapsed());
        Ok(report)
    }

    async fn run(
        &self,
        request: AnalysisRequest,
        format: DocumentFormat,
    ) -> Result<AnalysisReport> {
        let AnalysisRequest {
            bytes,
            job_description,
            filename,
            ..
        } = request;
        let filename = filename.unwrap_or_else(|| format!("resume.{}", format.extension()));

        // A timed-out request abandons the blocking decode but cannot stop it,
        // so the permit travels with the decode and is released when it ends.
        let permit = self.acquire_worker().await?;
        let extractor = Arc::clone(&self.extractor);
        let doc = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            extractor.extract_as(&bytes, format)
        })
        .await
        .map_err(|e| extraction_join_error(e, format))??;

        debug!(
            "Extracted {} words, sections {:?}",
            doc.stats().word_count,
            doc.sections().kinds()
        );

        let doc = Arc::new(doc);
        let job = job_description.and_then(|text| self.keywords.parse_job_description(&text));

        let keyword_task = {
            let (matcher, doc, job) = (Arc::clone(&self.keywords), Arc::clone(&doc), job.clone());
            tokio::task::spawn_blocking(move || matcher.analyze(&doc, job.as_ref()))
        };
        let formatting_task = {
            let (analyzer, doc) = (Arc::clone(&self.formatting), Arc::clone(&doc));
            tokio::task::spawn_blocking(move || analyzer.analyze(&doc))
        };
        let content_task = {
            let (analyzer, doc) = (Arc::clone(&self.content), Arc::clone(&doc));
            tokio::task::spawn_blocking(move || analyzer.analyze(&doc))
        };

        let (keywords, formatting, content) =
            tokio::join!(keyword_task, formatting_task, content_task);

        Ok(self.aggregator.aggregate(
            &doc,
            &filename,
            keywords.map_err(analyzer_join_error)?,
            formatting.map_err(analyzer_join_error)?,
            content.map_err(analyzer_join_error)?,
        ))
    }

    async fn acquire_worker(&self) -> Result<OwnedSemaphorePermit> {
        match self.overload_policy {
            OverloadPolicy::Reject => Arc::clone(&self.workers).try_acquire_owned().map_err(|_| {
                warn!("All {} extraction workers busy, rejecting request", self.capacity);
                ResumeAnalyzerError::Busy {
                    capacity: self.capacity,
                }
            }),
            OverloadPolicy::Wait => Arc::clone(&self.workers)
                .acquire_owned()
                .await
                .map_err(|_| ResumeAnalyzerError::AnalysisFailed("extraction worker pool closed".to_string())),
        }
    }

    /// Run the analyzers and aggregation on an already-extracted document,
    /// on the calling thread.
    pub fn analyze_document(
        &self,
        doc: &ResumeDocument,
        job_description: Option<&str>,
        filename: &str,
    ) -> AnalysisReport {
        let job = job_description.and_then(|text| self.keywords.parse_job_description(text));

        self.aggregator.aggregate(
            doc,
            filename,
            self.keywords.analyze(doc, job.as_ref()),
            self.formatting.analyze(doc),
            self.content.analyze(doc),
        )
    }
}

fn extraction_join_error(e: JoinError, format: DocumentFormat) -> ResumeAnalyzerError {
    if e.is_panic() {
        ResumeAnalyzerError::CorruptDocument {
            format,
            reason: "extractor aborted while decoding the document".to_string(),
        }
    } else {
        ResumeAnalyzerError::AnalysisFailed(format!("extraction task failed: {}", e))
    }
}

fn analyzer_join_error(e: JoinError) -> ResumeAnalyzerError {
    ResumeAnalyzerError::AnalysisFailed(format!("analyzer task failed: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::file_detector::LEGACY_WORD_MIME;
    use crate::input::text_extractor::fixtures::legacy_doc;

    const RESUME: &str = "Jane Doe\rjane@example.com\r\rExperience\r\u{2022} Built APIs using Python and React\r\u{2022} Reduced latency by 30%\r\rEducation\rBSc Computer Science\r\rSkills\rPython, React, Docker";

    fn engine_with(edit: impl FnOnce(&mut Config)) -> AnalysisEngine {
        let mut config = Config::default();
        edit(&mut config);
        AnalysisEngine::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_analyze_legacy_word_resume() {
        let engine = engine_with(|_| {});
        let report = engine
            .analyze(AnalysisRequest::new(legacy_doc(RESUME), LEGACY_WORD_MIME))
            .await
            .unwrap();

        assert_eq!(report.filename, "resume.doc");
        assert_eq!(report.skills_found, vec!["python", "react", "docker"]);
        assert!(report.missing_sections.is_empty());
        assert_eq!(report.job_match_score, None);
        assert_eq!(engine.available_workers(), 4);
    }

    #[tokio::test]
    async fn test_busy_when_pool_is_full() {
        let engine = engine_with(|c| c.limits.extraction_workers = 1);
        let held = Arc::clone(&engine.workers).try_acquire_owned().unwrap();

        let result = engine
            .analyze(AnalysisRequest::new(legacy_doc(RESUME), LEGACY_WORD_MIME))
            .await;
        assert!(matches!(result, Err(ResumeAnalyzerError::Busy { capacity: 1 })));

        drop(held);
        let result = engine
            .analyze(AnalysisRequest::new(legacy_doc(RESUME), LEGACY_WORD_MIME))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_waiting_request_times_out() {
        let engine = engine_with(|c| {
            c.limits.extraction_workers = 1;
            c.limits.request_timeout_ms = 50;
            c.limits.overload_policy = OverloadPolicy::Wait;
        });
        let _held = Arc::clone(&engine.workers).try_acquire_owned().unwrap();

        let result = engine
            .analyze(AnalysisRequest::new(legacy_doc(RESUME), LEGACY_WORD_MIME))
            .await;
        assert!(matches!(result, Err(ResumeAnalyzerError::Timeout { limit_ms: 50 })));
    }

    #[tokio::test]
    async fn test_timed_out_decode_keeps_its_slot() {
        let engine = engine_with(|c| {
            c.limits.extraction_workers = 1;
            c.limits.request_timeout_ms = 1;
            c.limits.max_file_bytes = 64 * 1024 * 1024;
        });
        let large = legacy_doc(&RESUME.repeat(30_000));

        let result = engine
            .analyze(AnalysisRequest::new(large, LEGACY_WORD_MIME))
            .await;
        assert!(matches!(result, Err(ResumeAnalyzerError::Timeout { limit_ms: 1 })));

        // The abandoned decode is still running and still counts against the pool.
        assert_eq!(engine.available_workers(), 0);
        let result = engine
            .analyze(AnalysisRequest::new(legacy_doc(RESUME), LEGACY_WORD_MIME))
            .await;
        assert!(matches!(result, Err(ResumeAnalyzerError::Busy { capacity: 1 })));

        for _ in 0..600 {
            if engine.available_workers() == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert_eq!(engine.available_workers(), 1);
    }

    #[tokio::test]
    async fn test_size_checked_before_format() {
        let engine = engine_with(|_| {});
        let result = engine
            .analyze(AnalysisRequest::new(vec![b' '; 12 * 1024 * 1024], "image/png"))
            .await;
        assert!(matches!(result, Err(ResumeAnalyzerError::FileTooLarge { .. })));
    }

    #[tokio::test]
    async fn test_parallel_and_sequential_paths_agree() {
        let engine = engine_with(|_| {});
        let job = "Python, Docker and Kubernetes";

        let report = engine
            .analyze(
                AnalysisRequest::new(legacy_doc(RESUME), LEGACY_WORD_MIME)
                    .with_job_description(job)
                    .with_filename("jane.doc"),
            )
            .await
            .unwrap();

        let doc = engine.extractor().extract(&legacy_doc(RESUME), LEGACY_WORD_MIME).unwrap();
        assert_eq!(report, engine.analyze_document(&doc, Some(job), "jane.doc"));
        assert_eq!(report.job_match_score, Some(67));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = Config::default();
        config.content.weights.summary = 0;
        assert!(matches!(
            AnalysisEngine::new(&config),
            Err(ResumeAnalyzerError::Configuration(_))
        ));
    }
}
