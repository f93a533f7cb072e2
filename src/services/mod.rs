pub mod exporter;
pub mod file_encoder;
pub mod prompt_builder;
pub mod response_parser;

pub use exporter::Exporter;
pub use file_encoder::FileEncoder;
pub use prompt_builder::PromptBuilder;
pub use response_parser::parse_response;
