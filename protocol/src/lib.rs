mod envelope;
mod models;

pub use envelope::ApiEnvelope;
pub use models::ChatConversation;
pub use models::ChatRequest;
pub use models::ModelId;
