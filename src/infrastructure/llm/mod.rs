//! LLM-backed summarization

mod openai;

pub use openai::{
    OpenAiSummarizer, UnconfiguredSummarizer, DEFAULT_OPENAI_BASE_URL, DEFAULT_SUMMARY_MODEL,
};
