//! The jump-to-page sub-dialog.

use std::time::Duration;

use tracing::debug;

use crate::{
    domain::{ChannelId, MessageRef, UserId},
    nav,
    pages::PageSet,
    ports::{EventWait, MessagingPort, OutboundContent, ReplyEvent},
    Error, Result,
};

/// Transient sub-flow converting a jump control signal into a validated page
/// index. While it runs, the parent session loop is suspended.
#[derive(Clone, Copy, Debug)]
pub struct JumpDialog {
    pub owner: UserId,
    pub channel: ChannelId,
    /// The session's active message, re-rendered on a successful selection.
    pub message: MessageRef,
    pub budget: Duration,
}

impl JumpDialog {
    /// Prompt for a 1-based page number, wait for a valid reply, apply it and
    /// clean up the prompt.
    ///
    /// Replies that fail to parse or fall out of range are non-matches: the
    /// wait keeps running until a valid reply arrives or the budget elapses.
    /// Returns the new zero-based index, or `None` on timeout (a notice is
    /// sent and the page stays unchanged).
    pub async fn run(
        &self,
        messenger: &dyn MessagingPort,
        events: &dyn EventWait,
        pages: &PageSet,
    ) -> Result<Option<usize>> {
        let max_index = pages.max_page_index();
        let prompt = messenger
            .send(
                self.channel,
                &OutboundContent::Text(format!(
                    "Which page do you want to turn to? 1-{}",
                    max_index + 1
                )),
            )
            .await?;

        let owner = self.owner;
        let channel = self.channel;
        let accept = move |reply: &ReplyEvent| {
            reply.user == owner
                && reply.channel == channel
                && parse_page_number(&reply.text, max_index).is_some()
        };

        let reply = match events.next_reply(&accept, self.budget).await {
            Ok(reply) => reply,
            Err(Error::TimedOut) => {
                debug!("no page number within budget, aborting jump");
                messenger
                    .send(
                        self.channel,
                        &OutboundContent::Text("You ran out of time.".to_string()),
                    )
                    .await?;
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        // The predicate already validated the content.
        let Some(number) = parse_page_number(&reply.text, max_index) else {
            return Ok(None);
        };

        let index = nav::jump_to(number);
        messenger.edit(self.message, &pages.outbound(index)).await?;
        messenger.delete(prompt).await?;
        Ok(Some(index))
    }
}

/// Parse a reply as a 1-based page number within `[1, max_index + 1]`.
pub fn parse_page_number(text: &str, max_index: usize) -> Option<usize> {
    let number = text.trim().parse::<usize>().ok()?;
    (1..=max_index + 1).contains(&number).then_some(number)
}
