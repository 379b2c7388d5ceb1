//! Text processing and analysis module

pub mod analyzer;
pub mod content;
pub mod document;
pub mod formatting;
pub mod keyword_matcher;
pub mod scoring;
pub mod taxonomy;
pub mod text_processor;

pub use analyzer::{AnalysisEngine, AnalysisRequest};
