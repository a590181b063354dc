pub mod client;
pub mod decode;
pub mod dispatch;
pub mod endpoint;
pub mod error;
pub mod frame;

pub use crate::client::ChatClient;
pub use crate::client::StreamPhase;
pub use crate::client::run_stream;
pub use crate::dispatch::ChatHandler;
pub use crate::dispatch::EventDispatcher;
pub use crate::dispatch::Flow;
pub use crate::endpoint::EndpointConfig;
pub use crate::endpoint::WireApi;
pub use crate::error::Error;
pub use crate::error::Result;
pub use crate::frame::FieldBlockFraming;
pub use crate::frame::Frame;
pub use crate::frame::Framing;
pub use crate::frame::JsonLinesFraming;
