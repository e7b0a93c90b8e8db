//! AI selector advisor implementations.

pub mod openai;

pub use openai::OpenAiAdvisor;
