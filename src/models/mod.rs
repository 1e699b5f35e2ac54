pub mod document;
pub mod eval_case;
pub mod field_mapping;
pub mod image;
pub mod loaders;

pub use document::DocumentType;
pub use eval_case::EvalCase;
pub use field_mapping::{value_text, ExtractedFields, FieldMapping};
pub use image::{EncodedImage, ImageExtension, ImageSource, Rotation};
pub use loaders::load_eval_case;
