pub mod answer_label;
pub mod attachment;
pub mod envelope;
pub mod question;

pub use answer_label::AnswerLabel;
pub use attachment::{EncodedAttachment, UploadedFile};
pub use envelope::{GenerateContentResponse, GenerationRequest};
pub use question::{AnswerMap, Question, ScoreResult};
