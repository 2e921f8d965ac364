pub mod answer;
pub mod embeddings;
pub mod semantic_search;

pub use answer::{AnswerGenerator, PROMPT_TEMPLATE};
pub use embeddings::EmbeddingGenerator;
pub use semantic_search::SemanticSearch;
