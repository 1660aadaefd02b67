use std::sync::Arc;

use async_trait::async_trait;

use pageflow_console::ConsoleChat;
use pageflow_core::{
    config::Config,
    domain::{ChannelId, UserId},
    ports::{ContentSource, EventWait, MessagingPort},
    render::TextRenderer,
    session::{PaginateRequest, PaginationSession},
    Result,
};

/// Demo content source: a fixed item list, paged into entry chunks.
struct DemoSource {
    chunks: Vec<String>,
}

#[async_trait]
impl ContentSource for DemoSource {
    async fn fetch(&self, _owner: UserId, _kind: &str, _filter: Option<&str>) -> Result<Vec<String>> {
        Ok(self.chunks.clone())
    }
}

/// Join `items` into page-sized newline-separated entries.
fn chunk_entries(items: &[String], per_page: usize) -> Vec<String> {
    items
        .chunks(per_page.max(1))
        .map(|chunk| chunk.join("\n"))
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pageflow_core::logging::init("pageflow");

    let cfg = Arc::new(Config::load()?);

    let item_count = std::env::var("PAGEFLOW_DEMO_ITEMS")
        .ok()
        .and_then(|s| s.trim().parse::<usize>().ok())
        .unwrap_or(25);
    let items: Vec<String> = (1..=item_count).map(|i| format!("item {i}")).collect();
    let chunks = chunk_entries(&items, cfg.items_per_page);

    let owner = UserId(1);
    let channel = ChannelId(1);

    let chat = Arc::new(ConsoleChat::new(owner, channel));
    let messenger: Arc<dyn MessagingPort> = chat.clone();
    let events: Arc<dyn EventWait> = chat;
    let source = Arc::new(DemoSource {
        chunks: chunks.clone(),
    });

    let req = PaginateRequest {
        owner,
        channel,
        title: "Demo queue".to_string(),
        footer: None,
        content_kind: "demo".to_string(),
        filter: None,
        total_items: items.len(),
        entries: chunks.first().cloned().into_iter().collect(),
    };

    let mut session = PaginationSession::new(
        cfg,
        messenger,
        events,
        source,
        Arc::new(TextRenderer),
        req,
    );
    session.run().await?;

    println!("(session ended)");
    Ok(())
}
