mod client;
pub mod schema;
pub mod types;

pub use client::GeminiClient;
pub use schema::StructuredOutput;
pub use types::{
    Candidate, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part,
    StructuredRequest,
};
