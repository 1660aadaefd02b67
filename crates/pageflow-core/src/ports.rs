//! Collaborator ports the pagination core calls.
//!
//! Transport, persistence and event delivery are delegated to adapters
//! implementing these traits; the core owns no wire format.

use std::time::Duration;

use async_trait::async_trait;

use crate::{
    domain::{ChannelId, MessageRef, UserId},
    render::Page,
    Result,
};

/// Outbound message payload: a structured page or plain text.
#[derive(Clone, Debug)]
pub enum OutboundContent {
    Page(Page),
    Text(String),
}

/// An inbound control signal (reaction/marker) on a message.
#[derive(Clone, Debug)]
pub struct ControlEvent {
    pub user: UserId,
    pub message: MessageRef,
    pub symbol: String,
}

/// An inbound text message in a channel.
#[derive(Clone, Debug)]
pub struct ReplyEvent {
    pub user: UserId,
    pub channel: ChannelId,
    pub text: String,
}

/// Cross-messenger port for sending, editing and annotating messages.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send(&self, channel: ChannelId, content: &OutboundContent) -> Result<MessageRef>;
    async fn edit(&self, msg: MessageRef, content: &OutboundContent) -> Result<()>;
    async fn delete(&self, msg: MessageRef) -> Result<()>;

    /// Attach a control symbol to a message.
    async fn attach_control(&self, msg: MessageRef, symbol: &str) -> Result<()>;

    /// Remove a user's control marker from a message. May fail with
    /// `Error::PermissionDenied`; callers treat retraction as best-effort.
    async fn retract_control(&self, msg: MessageRef, symbol: &str, user: UserId) -> Result<()>;
}

/// Blocking waits for the next inbound event of a given kind.
///
/// Contract: events delivered before the call is in flight are not observed
/// (no buffering across session boundaries), and events failing the predicate
/// are skipped silently without resetting the budget clock.
/// `Error::TimedOut` is the only expected failure.
#[async_trait]
pub trait EventWait: Send + Sync {
    async fn next_control(
        &self,
        predicate: &(dyn for<'a> Fn(&'a ControlEvent) -> bool + Send + Sync),
        budget: Duration,
    ) -> Result<ControlEvent>;

    async fn next_reply(
        &self,
        predicate: &(dyn for<'a> Fn(&'a ReplyEvent) -> bool + Send + Sync),
        budget: Duration,
    ) -> Result<ReplyEvent>;
}

/// Supplies the full ordered raw content set for a paginated view.
///
/// Called at most once per session, and only when no filter is active.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch(&self, owner: UserId, kind: &str, filter: Option<&str>) -> Result<Vec<String>>;
}
