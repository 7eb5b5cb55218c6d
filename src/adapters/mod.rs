pub mod catalog;
pub mod openai;

pub use catalog::JsonCatalog;
pub use openai::OpenAiGenerator;
