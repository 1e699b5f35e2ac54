pub mod extraction_service;
pub mod field_comparator;
pub mod field_parser;
pub mod image_service;
pub mod performance_tracker;
pub mod prompts;

pub use extraction_service::{ExtractionPrompt, ExtractionService, RetryPolicy};
pub use field_comparator::compare;
pub use field_parser::{parse_expected_mapping, parse_field_text};
pub use image_service::ImageService;
pub use performance_tracker::{PerformanceState, PerformanceSummary, PerformanceTracker};
