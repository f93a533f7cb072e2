pub mod generation_flow;
pub mod quiz_session;

pub use generation_flow::GenerationFlow;
pub use quiz_session::{calculate_results, QuizSession, SessionState};
