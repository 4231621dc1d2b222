//! Assistant gateway abstractions.
//!
//! - `AssistantGateway`: RPITIT port for the remote thread/run/message API
//! - `BoxAssistantGateway`: Object-safe wrapper shared across poll tasks

pub mod box_gateway;
pub mod port;

pub use box_gateway::BoxAssistantGateway;
pub use port::AssistantGateway;
