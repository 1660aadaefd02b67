//! The top-level pagination state machine.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
    config::Config,
    controls::{ControlMap, NavAction},
    domain::{ChannelId, MessageRef, UserId},
    jump::JumpDialog,
    nav,
    pages::PageSet,
    ports::{ContentSource, ControlEvent, EventWait, MessagingPort},
    render::PageRenderer,
    Error, Result,
};

/// Everything a caller supplies to start one paginated view.
#[derive(Clone, Debug)]
pub struct PaginateRequest {
    /// The single user authorized to drive navigation for this session.
    pub owner: UserId,
    pub channel: ChannelId,
    pub title: String,
    pub footer: Option<String>,
    /// Content kind forwarded to the content source on backfill.
    pub content_kind: String,
    /// Search filter. When set, `entries` is already the full content set
    /// and no backfill happens.
    pub filter: Option<String>,
    /// Total item count across all pages.
    pub total_items: usize,
    /// Raw entries known at invocation time (at least the first page).
    pub entries: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Setup,
    Active,
    /// Terminal; no re-entry.
    Stopped,
}

/// Cooperative stop flag for a running session.
///
/// Stopping never interrupts an in-flight wait: the flag is checked at the
/// top of the loop, so a pending wait ends only via a matching signal or its
/// own timeout.
#[derive(Clone)]
pub struct StopHandle {
    cancel: CancellationToken,
}

impl StopHandle {
    /// Idempotent.
    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

/// One paginated view bound to one message and one owner.
///
/// A session processes one control signal at a time; the session loop and the
/// jump sub-dialog it spawns are mutually exclusive. Sessions over different
/// messages are fully independent and share no mutable state.
pub struct PaginationSession {
    cfg: Arc<Config>,
    messenger: Arc<dyn MessagingPort>,
    events: Arc<dyn EventWait>,
    source: Arc<dyn ContentSource>,
    renderer: Arc<dyn PageRenderer>,

    req: PaginateRequest,
    controls: ControlMap,
    pages: PageSet,
    current: usize,
    message: Option<MessageRef>,
    state: SessionState,
    cancel: CancellationToken,
}

impl PaginationSession {
    pub fn new(
        cfg: Arc<Config>,
        messenger: Arc<dyn MessagingPort>,
        events: Arc<dyn EventWait>,
        source: Arc<dyn ContentSource>,
        renderer: Arc<dyn PageRenderer>,
        req: PaginateRequest,
    ) -> Self {
        let pages = PageSet::build(
            renderer.as_ref(),
            req.entries.clone(),
            req.title.clone(),
            req.footer.clone(),
            req.total_items,
            cfg.items_per_page,
            req.filter.is_some(),
        );

        Self {
            cfg,
            messenger,
            events,
            source,
            renderer,
            req,
            controls: ControlMap::standard(),
            pages,
            current: 0,
            message: None,
            state: SessionState::Setup,
            cancel: CancellationToken::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active && !self.cancel.is_cancelled()
    }

    pub fn current_page_index(&self) -> usize {
        self.current
    }

    pub fn max_page_index(&self) -> usize {
        self.pages.max_page_index()
    }

    /// The message this session renders into, once setup has run.
    pub fn message(&self) -> Option<MessageRef> {
        self.message
    }

    /// A handle for requesting a cooperative stop from outside the loop.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            cancel: self.cancel.clone(),
        }
    }

    /// Drive the session to completion: setup, then dispatch control signals
    /// until an idle timeout or an explicit stop.
    pub async fn run(&mut self) -> Result<()> {
        if self.state == SessionState::Stopped {
            return Ok(());
        }

        let Some(msg) = self.setup().await? else {
            // Static, non-interactive display.
            self.state = SessionState::Stopped;
            return Ok(());
        };
        self.state = SessionState::Active;

        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            let owner = self.req.owner;
            let map = self.controls.clone();
            let matches = move |signal: &ControlEvent| {
                signal.user == owner
                    && signal.message == msg
                    && map.resolve(&signal.symbol).is_some()
            };

            let signal = match self
                .events
                .next_control(&matches, self.cfg.wait_timeout)
                .await
            {
                Ok(signal) => signal,
                Err(Error::TimedOut) => {
                    debug!("no control signal within budget, stopping session");
                    break;
                }
                Err(err) => return Err(err),
            };

            // Retraction is best-effort: missing permissions must not end the
            // session, so the error is deliberately discarded here.
            if let Err(err) = self
                .messenger
                .retract_control(msg, &signal.symbol, signal.user)
                .await
            {
                debug!(error = %err, "control retraction failed");
            }

            let Some(action) = self.controls.resolve(&signal.symbol) else {
                continue;
            };

            let max = self.pages.max_page_index();
            match action {
                NavAction::First => {
                    self.current = nav::first();
                    self.render(msg, self.current).await?;
                }
                NavAction::Backward => {
                    self.current = nav::backward(self.current, max);
                    self.render(msg, self.current).await?;
                }
                NavAction::Forward => {
                    self.current = nav::forward(self.current, max);
                    self.render(msg, self.current).await?;
                }
                NavAction::Last => {
                    self.current = nav::last(max);
                    self.render(msg, self.current).await?;
                }
                NavAction::Jump => {
                    let dialog = JumpDialog {
                        owner: self.req.owner,
                        channel: self.req.channel,
                        message: msg,
                        budget: self.cfg.wait_timeout,
                    };
                    let picked = dialog
                        .run(self.messenger.as_ref(), self.events.as_ref(), &self.pages)
                        .await?;
                    if let Some(index) = picked {
                        self.current = index;
                    }
                }
            }
        }

        self.state = SessionState::Stopped;
        Ok(())
    }

    /// Render page 0 into a new message, then either leave it as a static
    /// display (at or below the single-page threshold) or attach the controls
    /// and eagerly backfill the full content set when no filter is active.
    ///
    /// Returns the active message for the loop, or `None` for static views.
    async fn setup(&mut self) -> Result<Option<MessageRef>> {
        let msg = self
            .messenger
            .send(self.req.channel, &self.pages.outbound(0))
            .await?;
        self.message = Some(msg);

        if self.req.total_items <= self.cfg.single_page_threshold {
            return Ok(None);
        }

        for symbol in self.controls.symbols() {
            self.messenger.attach_control(msg, symbol).await?;
        }

        if self.req.filter.is_none() {
            // Eager backfill so later navigation never fetches mid-session.
            let entries = self
                .source
                .fetch(self.req.owner, &self.req.content_kind, None)
                .await?;
            self.pages.backfill(self.renderer.as_ref(), entries);
        }

        Ok(Some(msg))
    }

    async fn render(&self, msg: MessageRef, index: usize) -> Result<()> {
        self.messenger.edit(msg, &self.pages.outbound(index)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MessageId;
    use crate::ports::{OutboundContent, ReplyEvent};
    use crate::render::TextRenderer;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    const FORWARD: &str = "\u{25B6}";
    const JUMP: &str = "\u{1F522}";

    #[derive(Default)]
    struct FakeMessenger {
        next_id: Mutex<i32>,
        sends: Mutex<Vec<(ChannelId, OutboundContent)>>,
        edits: Mutex<Vec<(MessageRef, OutboundContent)>>,
        deletes: Mutex<Vec<MessageRef>>,
        attached: Mutex<Vec<String>>,
        retracts: AtomicUsize,
        deny_retraction: bool,
    }

    impl FakeMessenger {
        fn denying_retraction() -> Self {
            Self {
                deny_retraction: true,
                ..Self::default()
            }
        }

        fn alloc(&self, channel: ChannelId) -> MessageRef {
            let mut guard = self.next_id.lock().unwrap();
            *guard += 1;
            MessageRef {
                channel_id: channel,
                message_id: MessageId(*guard),
            }
        }

        fn sent_texts(&self) -> Vec<String> {
            self.sends
                .lock()
                .unwrap()
                .iter()
                .filter_map(|(_, content)| match content {
                    OutboundContent::Text(text) => Some(text.clone()),
                    OutboundContent::Page(_) => None,
                })
                .collect()
        }

        fn attached_symbols(&self) -> Vec<String> {
            self.attached.lock().unwrap().clone()
        }

        fn edit_count(&self) -> usize {
            self.edits.lock().unwrap().len()
        }

        fn last_edit_footer(&self) -> Option<String> {
            self.edits
                .lock()
                .unwrap()
                .last()
                .and_then(|(_, content)| match content {
                    OutboundContent::Page(page) => Some(page.footer.clone()),
                    OutboundContent::Text(_) => None,
                })
        }

        fn delete_count(&self) -> usize {
            self.deletes.lock().unwrap().len()
        }

        fn retract_attempts(&self) -> usize {
            self.retracts.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MessagingPort for FakeMessenger {
        async fn send(
            &self,
            channel: ChannelId,
            content: &OutboundContent,
        ) -> Result<MessageRef> {
            self.sends.lock().unwrap().push((channel, content.clone()));
            Ok(self.alloc(channel))
        }

        async fn edit(&self, msg: MessageRef, content: &OutboundContent) -> Result<()> {
            self.edits.lock().unwrap().push((msg, content.clone()));
            Ok(())
        }

        async fn delete(&self, msg: MessageRef) -> Result<()> {
            self.deletes.lock().unwrap().push(msg);
            Ok(())
        }

        async fn attach_control(&self, _msg: MessageRef, symbol: &str) -> Result<()> {
            self.attached.lock().unwrap().push(symbol.to_string());
            Ok(())
        }

        async fn retract_control(
            &self,
            _msg: MessageRef,
            _symbol: &str,
            _user: UserId,
        ) -> Result<()> {
            self.retracts.fetch_add(1, Ordering::SeqCst);
            if self.deny_retraction {
                return Err(Error::PermissionDenied("manage messages".to_string()));
            }
            Ok(())
        }
    }

    /// Pops queued events until one matches; an exhausted queue stands in for
    /// an elapsed wait budget.
    #[derive(Default)]
    struct FakeEvents {
        controls: Mutex<VecDeque<ControlEvent>>,
        replies: Mutex<VecDeque<ReplyEvent>>,
    }

    impl FakeEvents {
        fn queue_control(&self, user: UserId, message: MessageRef, symbol: &str) {
            self.controls.lock().unwrap().push_back(ControlEvent {
                user,
                message,
                symbol: symbol.to_string(),
            });
        }

        fn queue_reply(&self, user: UserId, channel: ChannelId, text: &str) {
            self.replies.lock().unwrap().push_back(ReplyEvent {
                user,
                channel,
                text: text.to_string(),
            });
        }

        fn pending_controls(&self) -> usize {
            self.controls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl EventWait for FakeEvents {
        async fn next_control(
            &self,
            predicate: &(dyn for<'a> Fn(&'a ControlEvent) -> bool + Send + Sync),
            _budget: Duration,
        ) -> Result<ControlEvent> {
            let mut queue = self.controls.lock().unwrap();
            while let Some(signal) = queue.pop_front() {
                if predicate(&signal) {
                    return Ok(signal);
                }
            }
            Err(Error::TimedOut)
        }

        async fn next_reply(
            &self,
            predicate: &(dyn for<'a> Fn(&'a ReplyEvent) -> bool + Send + Sync),
            _budget: Duration,
        ) -> Result<ReplyEvent> {
            let mut queue = self.replies.lock().unwrap();
            while let Some(reply) = queue.pop_front() {
                if predicate(&reply) {
                    return Ok(reply);
                }
            }
            Err(Error::TimedOut)
        }
    }

    struct FakeSource {
        entries: Vec<String>,
        calls: AtomicUsize,
    }

    impl FakeSource {
        fn with_entries(n: usize) -> Self {
            Self {
                entries: (0..n).map(|i| format!("entry {i}")).collect(),
                calls: AtomicUsize::new(0),
            }
        }

        fn fetch_calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ContentSource for FakeSource {
        async fn fetch(
            &self,
            _owner: UserId,
            _kind: &str,
            _filter: Option<&str>,
        ) -> Result<Vec<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.entries.clone())
        }
    }

    const OWNER: UserId = UserId(1);
    const CHANNEL: ChannelId = ChannelId(7);

    fn request(total_items: usize, entries: usize, filter: Option<&str>) -> PaginateRequest {
        PaginateRequest {
            owner: OWNER,
            channel: CHANNEL,
            title: "Queue".to_string(),
            footer: None,
            content_kind: "queue".to_string(),
            filter: filter.map(str::to_string),
            total_items,
            entries: (0..entries).map(|i| format!("entry {i}")).collect(),
        }
    }

    fn session(
        messenger: Arc<FakeMessenger>,
        events: Arc<FakeEvents>,
        source: Arc<FakeSource>,
        req: PaginateRequest,
    ) -> PaginationSession {
        PaginationSession::new(
            Arc::new(Config::default()),
            messenger,
            events,
            source,
            Arc::new(TextRenderer),
            req,
        )
    }

    /// The message allocated for the session's first send.
    fn active_message() -> MessageRef {
        MessageRef {
            channel_id: CHANNEL,
            message_id: MessageId(1),
        }
    }

    #[tokio::test]
    async fn small_lists_render_one_static_page_without_controls() {
        let messenger = Arc::new(FakeMessenger::default());
        let events = Arc::new(FakeEvents::default());
        let source = Arc::new(FakeSource::with_entries(0));
        let mut s = session(
            messenger.clone(),
            events,
            source.clone(),
            request(8, 1, None),
        );

        s.run().await.unwrap();

        assert_eq!(s.state(), SessionState::Stopped);
        assert_eq!(messenger.sends.lock().unwrap().len(), 1);
        assert!(messenger.attached_symbols().is_empty());
        assert_eq!(source.fetch_calls(), 0);
    }

    #[tokio::test]
    async fn idle_timeout_stops_the_session_without_error() {
        let messenger = Arc::new(FakeMessenger::default());
        let events = Arc::new(FakeEvents::default());
        let source = Arc::new(FakeSource::with_entries(3));
        let mut s = session(
            messenger.clone(),
            events,
            source.clone(),
            request(25, 1, None),
        );

        s.run().await.unwrap();

        assert_eq!(s.state(), SessionState::Stopped);
        assert_eq!(
            messenger.attached_symbols(),
            vec!["\u{23EE}", "\u{25C0}", "\u{25B6}", "\u{23ED}", "\u{1F522}"]
        );
        // Unfiltered sessions backfill exactly once.
        assert_eq!(source.fetch_calls(), 1);
        assert_eq!(s.max_page_index(), 2);
    }

    #[tokio::test]
    async fn forward_navigation_wraps_back_to_the_first_page() {
        let messenger = Arc::new(FakeMessenger::default());
        let events = Arc::new(FakeEvents::default());
        let source = Arc::new(FakeSource::with_entries(3));

        let msg = active_message();
        for _ in 0..3 {
            events.queue_control(OWNER, msg, FORWARD);
        }

        let mut s = session(
            messenger.clone(),
            events,
            source,
            request(25, 1, None),
        );
        s.run().await.unwrap();

        // 0 -> 1 -> 2 -> wrap to 0.
        assert_eq!(s.current_page_index(), 0);
        assert_eq!(messenger.edit_count(), 3);
        assert_eq!(messenger.last_edit_footer().as_deref(), Some("Page 1 of 3"));
        assert_eq!(messenger.retract_attempts(), 3);
    }

    #[tokio::test]
    async fn retraction_permission_failures_are_swallowed() {
        let messenger = Arc::new(FakeMessenger::denying_retraction());
        let events = Arc::new(FakeEvents::default());
        let source = Arc::new(FakeSource::with_entries(3));

        events.queue_control(OWNER, active_message(), FORWARD);

        let mut s = session(
            messenger.clone(),
            events,
            source,
            request(25, 1, None),
        );
        s.run().await.unwrap();

        assert_eq!(s.current_page_index(), 1);
        assert_eq!(messenger.retract_attempts(), 1);
        assert_eq!(messenger.edit_count(), 1);
    }

    #[tokio::test]
    async fn signals_from_other_users_are_skipped_silently() {
        let messenger = Arc::new(FakeMessenger::default());
        let events = Arc::new(FakeEvents::default());
        let source = Arc::new(FakeSource::with_entries(3));

        events.queue_control(UserId(99), active_message(), FORWARD);

        let mut s = session(
            messenger.clone(),
            events,
            source,
            request(25, 1, None),
        );
        s.run().await.unwrap();

        assert_eq!(s.current_page_index(), 0);
        assert_eq!(messenger.retract_attempts(), 0);
        assert_eq!(messenger.edit_count(), 0);
    }

    #[tokio::test]
    async fn jump_ignores_malformed_replies_and_applies_the_valid_one() {
        let messenger = Arc::new(FakeMessenger::default());
        let events = Arc::new(FakeEvents::default());
        let source = Arc::new(FakeSource::with_entries(0));

        events.queue_control(OWNER, active_message(), JUMP);
        events.queue_reply(OWNER, CHANNEL, "abc");
        events.queue_reply(OWNER, CHANNEL, "4");

        // Filtered: six entries fully known up front, max index 5.
        let mut s = session(
            messenger.clone(),
            events,
            source.clone(),
            request(60, 6, Some("alpha")),
        );
        s.run().await.unwrap();

        assert_eq!(s.max_page_index(), 5);
        assert_eq!(s.current_page_index(), 3);
        assert_eq!(messenger.last_edit_footer().as_deref(), Some("Page 4 of 6"));
        // The prompt was cleaned up.
        assert_eq!(messenger.delete_count(), 1);
        // Filters skip the eager refetch.
        assert_eq!(source.fetch_calls(), 0);
    }

    #[tokio::test]
    async fn jump_timeout_notifies_and_leaves_the_loop_running() {
        let messenger = Arc::new(FakeMessenger::default());
        let events = Arc::new(FakeEvents::default());
        let source = Arc::new(FakeSource::with_entries(0));

        let msg = active_message();
        events.queue_control(OWNER, msg, JUMP);
        events.queue_control(OWNER, msg, FORWARD);

        let mut s = session(
            messenger.clone(),
            events,
            source,
            request(60, 6, Some("alpha")),
        );
        s.run().await.unwrap();

        assert!(messenger
            .sent_texts()
            .iter()
            .any(|text| text == "You ran out of time."));
        // The forward signal queued after the aborted jump still lands.
        assert_eq!(s.current_page_index(), 1);
        assert_eq!(messenger.delete_count(), 0);
        assert_eq!(s.state(), SessionState::Stopped);
    }

    #[tokio::test]
    async fn stop_handle_ends_the_loop_before_the_next_wait() {
        let messenger = Arc::new(FakeMessenger::default());
        let events = Arc::new(FakeEvents::default());
        let source = Arc::new(FakeSource::with_entries(3));

        events.queue_control(OWNER, active_message(), FORWARD);

        let mut s = session(
            messenger.clone(),
            events.clone(),
            source,
            request(25, 1, None),
        );
        s.stop_handle().stop();
        s.run().await.unwrap();

        assert_eq!(s.state(), SessionState::Stopped);
        assert_eq!(s.current_page_index(), 0);
        // The queued signal was never consumed.
        assert_eq!(events.pending_controls(), 1);
    }
}
