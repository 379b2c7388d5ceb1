//! Input processing module
//! Handles format detection, text extraction and normalization

pub mod file_detector;
pub mod manager;
pub mod text_extractor;

pub use file_detector::DocumentFormat;
pub use manager::DocumentExtractor;
