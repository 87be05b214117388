// ABOUTME: Agent module — generative model interface, Gemini client, and background worker.
// ABOUTME: The worker runs remote calls off the foreground and reports outcomes by channel.

pub mod gemini;
pub mod provider;
pub mod worker;

pub use gemini::GeminiClient;
pub use provider::*;
pub use worker::{DispatchError, GenerationOutcome, GenerationRequest, GenerationWorker};
