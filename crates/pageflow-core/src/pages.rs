//! The ordered page sequence behind one paginated view.

use crate::ports::OutboundContent;
use crate::render::{Page, PageRenderer};

/// What a message should display for a given index.
#[derive(Debug, PartialEq, Eq)]
pub enum PageView<'a> {
    Structured(&'a Page),
    /// Raw-content degrade path for an index beyond the rendered range.
    Fallback(&'a str),
}

/// Ordered sequence of rendered pages plus the raw entries they came from.
///
/// Invariant: with a filter active the content is fully known up front, so
/// `max_page_index == len - 1`. Without one the page count is derived from
/// the total item count, and the true content is backfilled after the first
/// render.
#[derive(Debug)]
pub struct PageSet {
    raws: Vec<String>,
    pages: Vec<Page>,
    max_page_index: usize,
    filter_active: bool,
    title: String,
    footer: Option<String>,
}

impl PageSet {
    /// Build from the raw entries available at invocation time.
    pub fn build(
        renderer: &dyn PageRenderer,
        entries: Vec<String>,
        title: String,
        footer: Option<String>,
        total_items: usize,
        items_per_page: usize,
        filter_active: bool,
    ) -> Self {
        // An empty list still renders as one blank page.
        let raws = if entries.is_empty() {
            vec![String::new()]
        } else {
            entries
        };

        let max_page_index = if filter_active {
            raws.len() - 1
        } else {
            page_count(total_items, items_per_page) - 1
        };

        let pages = render_all(renderer, &raws, &title, footer.as_deref(), max_page_index + 1);

        Self {
            raws,
            pages,
            max_page_index,
            filter_active,
            title,
            footer,
        }
    }

    pub fn max_page_index(&self) -> usize {
        self.max_page_index
    }

    pub fn filter_active(&self) -> bool {
        self.filter_active
    }

    /// Number of rendered pages. May be below `max_page_index + 1` until the
    /// backfill has run.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Replace the content with the full entry list from the content source
    /// and re-render. The page count becomes the entry count.
    pub fn backfill(&mut self, renderer: &dyn PageRenderer, entries: Vec<String>) {
        if entries.is_empty() {
            return;
        }
        self.raws = entries;
        self.max_page_index = self.raws.len() - 1;
        self.pages = render_all(
            renderer,
            &self.raws,
            &self.title,
            self.footer.as_deref(),
            self.max_page_index + 1,
        );
    }

    /// Content to display for `index`.
    ///
    /// An index beyond the rendered range falls back to the raw entry at
    /// `index - 1` (the backfill can leave fewer rendered pages than the
    /// derived page count). This is a documented degrade path, not an error.
    pub fn view(&self, index: usize) -> PageView<'_> {
        if let Some(page) = self.pages.get(index) {
            return PageView::Structured(page);
        }

        let raw = index
            .checked_sub(1)
            .and_then(|i| self.raws.get(i))
            .map(String::as_str)
            .unwrap_or("");
        PageView::Fallback(raw)
    }

    /// The outbound payload for `index`.
    pub fn outbound(&self, index: usize) -> OutboundContent {
        match self.view(index) {
            PageView::Structured(page) => OutboundContent::Page(page.clone()),
            PageView::Fallback(raw) => OutboundContent::Text(raw.to_string()),
        }
    }
}

/// Number of pages needed for `total_items`, never less than one.
pub fn page_count(total_items: usize, items_per_page: usize) -> usize {
    total_items.div_ceil(items_per_page.max(1)).max(1)
}

fn render_all(
    renderer: &dyn PageRenderer,
    raws: &[String],
    title: &str,
    footer: Option<&str>,
    total_pages: usize,
) -> Vec<Page> {
    raws.iter()
        .enumerate()
        .map(|(position, raw)| renderer.render(raw, title, footer, position, total_pages))
        .collect()
}
