//! Page rendering: turning raw content into displayable pages.

/// One renderable unit of paginated content, addressed by 0-based position.
///
/// Immutable once built; the counter embedded in the footer is computed from
/// position + total at render time, not stored separately.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    pub title: String,
    pub body: String,
    pub footer: String,
}

/// Port for formatting raw content into a displayable page.
pub trait PageRenderer: Send + Sync {
    fn render(
        &self,
        raw: &str,
        title: &str,
        footer: Option<&str>,
        position: usize,
        total_pages: usize,
    ) -> Page;
}

/// Default renderer following the title/footer/page-counter convention.
///
/// A custom footer, when present, is stacked above the counter line.
#[derive(Clone, Copy, Debug, Default)]
pub struct TextRenderer;

impl PageRenderer for TextRenderer {
    fn render(
        &self,
        raw: &str,
        title: &str,
        footer: Option<&str>,
        position: usize,
        total_pages: usize,
    ) -> Page {
        let counter = format!("Page {} of {}", position + 1, total_pages);
        let footer = match footer {
            Some(note) => format!("{note}\n{counter}"),
            None => counter,
        };

        Page {
            title: title.to_string(),
            body: raw.to_string(),
            footer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn footer_is_the_counter_when_no_note_is_set() {
        let page = TextRenderer.render("body", "Queue", None, 0, 3);
        assert_eq!(page.title, "Queue");
        assert_eq!(page.body, "body");
        assert_eq!(page.footer, "Page 1 of 3");
    }

    #[test]
    fn footer_note_stacks_above_the_counter() {
        let page = TextRenderer.render("body", "Queue", Some("sorted by date"), 2, 3);
        assert_eq!(page.footer, "sorted by date\nPage 3 of 3");
    }
}
