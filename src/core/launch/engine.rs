// ─── Launch Engine ───
// Boundary to the external download/patch/launch engine.

use async_trait::async_trait;
use futures_util::stream::{self, BoxStream, Stream, StreamExt};
use tokio::sync::mpsc;

use super::request::LaunchRequest;
use crate::core::error::LauncherResult;

/// Events an engine session reports, in the order they happen.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// An archive is being unpacked.
    Extract(String),
    /// Game files downloaded so far.
    Progress { current: u64, total: u64 },
    /// Existing files verified so far.
    Check { current: u64, total: u64 },
    /// Engine's own remaining-time estimate.
    Estimated { seconds: f64 },
    Speed { bytes_per_second: f64 },
    /// Loader patching step.
    Patch(String),
    /// Output from the running game.
    Data(String),
    /// Game process exited.
    Close { code: i32 },
    Error(String),
}

impl EngineEvent {
    pub fn name(&self) -> &'static str {
        match self {
            EngineEvent::Extract(_) => "extract",
            EngineEvent::Progress { .. } => "progress",
            EngineEvent::Check { .. } => "check",
            EngineEvent::Estimated { .. } => "estimated",
            EngineEvent::Speed { .. } => "speed",
            EngineEvent::Patch(_) => "patch",
            EngineEvent::Data(_) => "data",
            EngineEvent::Close { .. } => "close",
            EngineEvent::Error(_) => "error",
        }
    }
}

/// One live engine session. Dropping it releases the event stream.
pub struct EngineSession {
    events: BoxStream<'static, EngineEvent>,
}

impl EngineSession {
    pub fn new<S>(events: S) -> Self
    where
        S: Stream<Item = EngineEvent> + Send + 'static,
    {
        Self {
            events: events.boxed(),
        }
    }

    /// Session fed through a channel; the session ends when every sender is dropped.
    pub fn channel(capacity: usize) -> (mpsc::Sender<EngineEvent>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        let events = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|event| (event, rx))
        });
        (tx, Self::new(events))
    }

    pub async fn next_event(&mut self) -> Option<EngineEvent> {
        self.events.next().await
    }
}

#[async_trait]
pub trait LaunchEngine: Send + Sync {
    /// Hand the request to the engine and return its event stream.
    async fn start(&self, request: LaunchRequest) -> LauncherResult<EngineSession>;
}
