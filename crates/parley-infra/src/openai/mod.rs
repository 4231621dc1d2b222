//! OpenAI adapters: the Assistants v2 thread/run API and chat completions.

pub mod assistants;
pub mod completion;
pub mod types;

pub use assistants::OpenAiAssistantGateway;
pub use completion::OpenAiCompletionProvider;
