pub mod vision_model;

pub use vision_model::{ModelError, OpenAiVisionModel, VisionModel, VisionRequest};
