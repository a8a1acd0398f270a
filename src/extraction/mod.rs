//! Receipt extraction: the vision model gateway and the response normalizer

pub mod gateway;
pub mod normalize;

pub use gateway::{ExtractionError, GeminiGateway, VisionGateway};
pub use normalize::{extract_json_object, normalize_extraction};
