//! Terminal adapter: the messaging and event-wait ports over stdin/stdout.
//!
//! Stands where a real messenger adapter (Telegram, Discord) would sit.
//! Messages are printed with their ids, edits reprint the message, and
//! control signals are typed as symbols or short aliases.

use std::sync::Mutex;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::{timeout_at, Duration, Instant};
use tracing::debug;

use pageflow_core::domain::{ChannelId, MessageId, MessageRef, UserId};
use pageflow_core::ports::{ControlEvent, EventWait, MessagingPort, OutboundContent, ReplyEvent};
use pageflow_core::{Error, Result};

/// Map a typed line to a control symbol.
///
/// Accepts the raw symbols plus short aliases; anything else is not a
/// control signal.
pub fn control_symbol_for(input: &str) -> Option<&'static str> {
    match input.trim() {
        "\u{23EE}" | "<<" | "first" => Some("\u{23EE}"),
        "\u{25C0}" | "<" | "prev" | "previous" | "back" => Some("\u{25C0}"),
        "\u{25B6}" | ">" | "next" => Some("\u{25B6}"),
        "\u{23ED}" | ">>" | "last" => Some("\u{23ED}"),
        "\u{1F522}" | "#" | "jump" => Some("\u{1F522}"),
        _ => None,
    }
}

/// One terminal "chat": implements both messaging and event waits, with
/// typed control input attributed to the bound user and the most recent
/// interactive message.
pub struct ConsoleChat {
    user: UserId,
    channel: ChannelId,
    inner: Mutex<Inner>,
    lines: tokio::sync::Mutex<mpsc::UnboundedReceiver<String>>,
}

struct Inner {
    next_id: i32,
    interactive: Option<MessageRef>,
}

impl ConsoleChat {
    /// Spawns the stdin reader task; call from within a tokio runtime.
    pub fn new(user: UserId, channel: ChannelId) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if tx.send(line).is_err() {
                    break;
                }
            }
        });

        Self {
            user,
            channel,
            inner: Mutex::new(Inner {
                next_id: 0,
                interactive: None,
            }),
            lines: tokio::sync::Mutex::new(rx),
        }
    }

    fn alloc(&self, channel: ChannelId) -> MessageRef {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        MessageRef {
            channel_id: channel,
            message_id: MessageId(inner.next_id),
        }
    }

    fn interactive_message(&self) -> Option<MessageRef> {
        self.inner.lock().unwrap().interactive
    }

    fn print(&self, msg: MessageRef, content: &OutboundContent) {
        match content {
            OutboundContent::Page(page) => {
                println!();
                println!("== {} ==", page.title);
                println!("{}", page.body);
                println!("-- {} --", page.footer);
            }
            OutboundContent::Text(text) => {
                println!("[msg {}] {}", msg.message_id.0, text);
            }
        }
    }

    /// Next typed line, against a fixed deadline. A closed stdin is treated
    /// the same as an exhausted budget: no matching event will ever arrive.
    async fn next_line(&self, deadline: Instant) -> Result<String> {
        let mut rx = self.lines.lock().await;
        match timeout_at(deadline, rx.recv()).await {
            Ok(Some(line)) => Ok(line),
            Ok(None) => Err(Error::TimedOut),
            Err(_) => Err(Error::TimedOut),
        }
    }
}

#[async_trait]
impl MessagingPort for ConsoleChat {
    async fn send(&self, channel: ChannelId, content: &OutboundContent) -> Result<MessageRef> {
        let msg = self.alloc(channel);
        self.print(msg, content);
        Ok(msg)
    }

    async fn edit(&self, msg: MessageRef, content: &OutboundContent) -> Result<()> {
        self.print(msg, content);
        Ok(())
    }

    async fn delete(&self, msg: MessageRef) -> Result<()> {
        println!("(message {} deleted)", msg.message_id.0);
        Ok(())
    }

    async fn attach_control(&self, msg: MessageRef, symbol: &str) -> Result<()> {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.interactive = Some(msg);
        }
        println!("control: {symbol}");
        Ok(())
    }

    async fn retract_control(&self, _msg: MessageRef, _symbol: &str, _user: UserId) -> Result<()> {
        // Nothing to retract on a terminal.
        Ok(())
    }
}

#[async_trait]
impl EventWait for ConsoleChat {
    async fn next_control(
        &self,
        predicate: &(dyn for<'a> Fn(&'a ControlEvent) -> bool + Send + Sync),
        budget: Duration,
    ) -> Result<ControlEvent> {
        // Fixed deadline: skipped lines do not reset the clock.
        let deadline = Instant::now() + budget;
        loop {
            let line = self.next_line(deadline).await?;
            let Some(symbol) = control_symbol_for(&line) else {
                debug!(input = %line.trim(), "not a control, ignoring");
                continue;
            };
            let Some(message) = self.interactive_message() else {
                continue;
            };

            let event = ControlEvent {
                user: self.user,
                message,
                symbol: symbol.to_string(),
            };
            if predicate(&event) {
                return Ok(event);
            }
        }
    }

    async fn next_reply(
        &self,
        predicate: &(dyn for<'a> Fn(&'a ReplyEvent) -> bool + Send + Sync),
        budget: Duration,
    ) -> Result<ReplyEvent> {
        let deadline = Instant::now() + budget;
        loop {
            let line = self.next_line(deadline).await?;
            let event = ReplyEvent {
                user: self.user,
                channel: self.channel,
                text: line.trim().to_string(),
            };
            if predicate(&event) {
                return Ok(event);
            }
        }
    }
}
