pub mod gemini_client;

pub use gemini_client::{GenerationClient, HttpTransport, QuestionTransport, RetryPolicy};
