use bytes::Bytes;
use futures::Stream;
use futures::StreamExt;
use futures::TryStreamExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::trace;

use jarvis_protocol::ChatRequest;

use crate::decode::Utf8StreamDecoder;
use crate::dispatch::ChatHandler;
use crate::dispatch::EventDispatcher;
use crate::dispatch::Flow;
use crate::endpoint::EndpointConfig;
use crate::endpoint::WireApi;
use crate::error::Error;
use crate::error::Result;
use crate::frame::FieldBlockFraming;
use crate::frame::Framing;
use crate::frame::JsonLinesFraming;

pub mod fixtures;
pub mod http;

/// Lifecycle of one chat turn's stream. A constructed client sits in
/// `Idle` until a send is issued; `Completed` and `Failed` are
/// terminal: no callback fires after either is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamPhase {
    Idle,
    Requesting,
    Streaming,
    Completed,
    Failed,
}

/// How a finished stream ended; input to the one-time terminal
/// transition.
enum StreamEnd {
    Completed,
    Failed(String),
}

/// Streaming chat client. One `send_message` call drives one stream:
/// bytes are pulled serially, and every callback for chunk N returns
/// before chunk N+1 is requested.
pub struct ChatClient {
    http_client: reqwest::Client,
    config: EndpointConfig,
}

impl ChatClient {
    pub fn new(config: EndpointConfig) -> Self {
        trace!(phase = ?StreamPhase::Idle, "chat client ready");
        Self {
            http_client: reqwest::Client::new(),
            config,
        }
    }

    pub fn with_http_client(http_client: reqwest::Client, config: EndpointConfig) -> Self {
        Self {
            http_client,
            config,
        }
    }

    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }

    /// Send one chat turn and surface streamed events through `handler`.
    ///
    /// Resolves once the stream reaches its terminal transition. Fatal
    /// errors invoke `on_error` and also surface as `Err`; a clean end
    /// of stream invokes `on_complete` and resolves `Ok`.
    pub async fn send_message(
        &self,
        request: &ChatRequest,
        handler: &mut dyn ChatHandler,
    ) -> Result<()> {
        self.send_message_with_cancel(request, handler, &CancellationToken::new())
            .await
    }

    /// Like [`ChatClient::send_message`], with an abort condition checked
    /// before each read suspension point. Cancellation routes through the
    /// same terminal transition as a read failure.
    pub async fn send_message_with_cancel(
        &self,
        request: &ChatRequest,
        handler: &mut dyn ChatHandler,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let url = self.config.stream_url();
        debug!(%url, phase = ?StreamPhase::Requesting, "sending chat message");

        let response = match self
            .http_client
            .post(url)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .json(request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                let err = Error::Http(err);
                handler.on_error(&err.to_string());
                return Err(err);
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read response>".to_string());
            let err = Error::UnexpectedStatus { status, body };
            handler.on_error(&err.to_string());
            return Err(err);
        }

        debug!(phase = ?StreamPhase::Streaming, "chat stream open");
        let stream = response
            .bytes_stream()
            .map_err(|err| Error::Stream(err.to_string()));

        let mut framing: Box<dyn Framing> = match self.config.wire_api {
            WireApi::FieldBlock => Box::new(FieldBlockFraming::new()),
            WireApi::JsonLines => Box::new(JsonLinesFraming::new()),
        };
        run_stream(stream, framing.as_mut(), handler, cancel).await
    }

    /// GET a non-streaming endpoint and unwrap its `{code, message, data}`
    /// envelope.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        http::get_json(&self.http_client, &self.config, path).await
    }

    /// POST to a non-streaming endpoint and unwrap its envelope.
    pub async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        http::post_json(&self.http_client, &self.config, path, body).await
    }
}

/// Pump transport bytes through decode → framing → dispatch until the
/// stream ends, a terminal frame arrives, the token is cancelled, or a
/// read fails. Strictly serial: the next chunk is not requested until
/// the previous one is fully dispatched.
///
/// Exactly one terminal callback fires before this returns, whichever
/// way the stream ends.
pub async fn run_stream<S>(
    mut stream: S,
    framing: &mut dyn Framing,
    handler: &mut dyn ChatHandler,
    cancel: &CancellationToken,
) -> Result<()>
where
    S: Stream<Item = Result<Bytes>> + Unpin,
{
    let mut decoder = Utf8StreamDecoder::new();
    let mut dispatcher = EventDispatcher::new();

    let end = 'read: loop {
        let next = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                break 'read StreamEnd::Failed("stream cancelled".to_string());
            }
            next = stream.next() => next,
        };

        match next {
            Some(Ok(chunk)) => {
                trace!(len = chunk.len(), "received stream chunk");
                let text = decoder.decode(&chunk, true);
                for frame in framing.push_chunk(&text) {
                    if dispatcher.dispatch(frame, handler) == Flow::Complete {
                        // Explicit completion: any further buffered bytes
                        // are ignored.
                        break 'read StreamEnd::Completed;
                    }
                }
            }
            Some(Err(err)) => break 'read StreamEnd::Failed(err.to_string()),
            None => {
                // Transport closed without an explicit completion marker:
                // force-flush held-back bytes and any buffered trailing
                // line, then infer completion.
                let text = decoder.decode(&[], false);
                let mut frames = framing.push_chunk(&text);
                frames.extend(framing.finish());
                for frame in frames {
                    if dispatcher.dispatch(frame, handler) == Flow::Complete {
                        break 'read StreamEnd::Completed;
                    }
                }
                break 'read StreamEnd::Completed;
            }
        }
    };

    finish(end, handler)
}

/// The one-time terminal transition. Both completion paths (terminal
/// frame, transport close) and every failure path converge here, and it
/// runs exactly once per stream, so exactly one of
/// `on_complete`/`on_error` fires as the final callback.
fn finish(end: StreamEnd, handler: &mut dyn ChatHandler) -> Result<()> {
    match end {
        StreamEnd::Completed => {
            debug!(phase = ?StreamPhase::Completed, "chat stream finished");
            handler.on_complete();
            Ok(())
        }
        StreamEnd::Failed(message) => {
            debug!(phase = ?StreamPhase::Failed, %message, "chat stream failed");
            handler.on_error(&message);
            Err(Error::Stream(message))
        }
    }
}
