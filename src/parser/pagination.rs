//! Pagination policy.
//!
//! Headings can force a page break; callouts, figures and code blocks only
//! reserve vertical space so they move to the next page instead of being
//! split right below a page edge.

use crate::model::{Block, Heading};

/// When to break pages around emitted blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationPolicy {
    /// Level-1 headings start a new page
    pub top_level_starts_new_page: bool,

    /// Headings containing any of these (case-insensitive) start a new page
    pub break_keywords: Vec<String>,

    /// Space reserved before a callout, in points
    pub min_space_callout: f32,

    /// Space reserved before a figure, in points
    pub min_space_figure: f32,

    /// Space reserved before a code block, in points
    pub min_space_code: f32,
}

impl PaginationPolicy {
    /// Create the default policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Policy that never forces breaks or reserves space.
    pub fn continuous() -> Self {
        Self {
            top_level_starts_new_page: false,
            break_keywords: Vec::new(),
            min_space_callout: 0.0,
            min_space_figure: 0.0,
            min_space_code: 0.0,
        }
    }

    /// Enable or disable page breaks before level-1 headings.
    pub fn with_top_level_breaks(mut self, enabled: bool) -> Self {
        self.top_level_starts_new_page = enabled;
        self
    }

    /// Set the keywords that force a break before a heading.
    pub fn with_break_keywords<S: Into<String>>(
        mut self,
        keywords: impl IntoIterator<Item = S>,
    ) -> Self {
        self.break_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Set the reserved space before callouts, figures and code blocks.
    pub fn with_min_space(mut self, callout: f32, figure: f32, code: f32) -> Self {
        self.min_space_callout = callout;
        self.min_space_figure = figure;
        self.min_space_code = code;
        self
    }

    /// Check if a heading must start on a new page.
    pub fn breaks_before_heading(&self, level: u8, text: &str) -> bool {
        if self.top_level_starts_new_page && level == 1 {
            return true;
        }
        let lowered = text.to_lowercase();
        self.break_keywords
            .iter()
            .filter(|k| !k.is_empty())
            .any(|k| lowered.contains(&k.to_lowercase()))
    }
}

impl Default for PaginationPolicy {
    fn default() -> Self {
        Self {
            top_level_starts_new_page: true,
            break_keywords: vec!["exercise".to_string()],
            min_space_callout: 180.0,
            min_space_figure: 260.0,
            min_space_code: 140.0,
        }
    }
}

/// Output block list of one scan, with pagination-aware appends.
#[derive(Debug, Default)]
pub struct Story {
    blocks: Vec<Block>,
}

impl Story {
    /// Create an empty story.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a block.
    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Check if nothing was emitted yet.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Last emitted block.
    pub fn last(&self) -> Option<&Block> {
        self.blocks.last()
    }

    /// Append a page break unless the story is empty or already ends in one.
    pub fn page_break(&mut self) {
        if self.blocks.last().is_some_and(|b| !b.is_page_break()) {
            self.blocks.push(Block::PageBreak);
        }
    }

    /// Reserve vertical space for the next block.
    ///
    /// A trailing heading is moved after the reservation so it stays with
    /// the block that follows it.
    pub fn reserve_space(&mut self, points: f32) {
        if points <= 0.0 {
            return;
        }
        if self.blocks.last().is_some_and(Block::is_heading) {
            if let Some(heading) = self.blocks.pop() {
                self.blocks.push(Block::ReserveSpace { points });
                self.blocks.push(heading);
            }
        } else {
            self.blocks.push(Block::ReserveSpace { points });
        }
    }

    /// Append a heading, breaking the page first when the policy asks for
    /// it. Headings inside callouts never break.
    pub fn heading(&mut self, heading: Heading, policy: &PaginationPolicy, in_callout: bool) {
        if !in_callout && policy.breaks_before_heading(heading.level, &heading.text) {
            self.page_break();
        }
        self.blocks.push(Block::Heading(heading));
    }

    /// Finish the story.
    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Anchor, Paragraph};

    fn heading(text: &str, level: u8) -> Heading {
        Heading {
            text: text.to_string(),
            content: Paragraph::with_text(text),
            level,
            anchor: Anchor::new(text.to_lowercase()),
        }
    }

    #[test]
    fn test_breaks_before_heading() {
        let policy = PaginationPolicy::default();
        assert!(policy.breaks_before_heading(1, "1. Intro"));
        assert!(!policy.breaks_before_heading(2, "1.1. Scope"));
        assert!(policy.breaks_before_heading(3, "1.1.1. EXERCISE three"));

        let policy = PaginationPolicy::continuous();
        assert!(!policy.breaks_before_heading(1, "1. Intro"));
    }

    #[test]
    fn test_page_break_dedup() {
        let mut story = Story::new();
        story.page_break();
        assert!(story.is_empty());

        story.push(Block::HorizontalRule);
        story.page_break();
        story.page_break();
        assert_eq!(story.into_blocks(), vec![Block::HorizontalRule, Block::PageBreak]);
    }

    #[test]
    fn test_reserve_moves_before_heading() {
        let mut story = Story::new();
        story.push(Block::HorizontalRule);
        story.push(Block::Heading(heading("2.1. Code", 2)));
        story.reserve_space(140.0);

        let blocks = story.into_blocks();
        assert_eq!(blocks[1], Block::ReserveSpace { points: 140.0 });
        assert!(blocks[2].is_heading());
    }

    #[test]
    fn test_heading_in_callout_never_breaks() {
        let policy = PaginationPolicy::default();
        let mut story = Story::new();
        story.push(Block::HorizontalRule);
        story.heading(heading("1. Inner", 1), &policy, true);
        assert_eq!(story.into_blocks().len(), 2);

        let mut story = Story::new();
        story.push(Block::HorizontalRule);
        story.heading(heading("1. Outer", 1), &policy, false);
        let blocks = story.into_blocks();
        assert_eq!(blocks.len(), 3);
        assert!(blocks[1].is_page_break());
    }

    #[test]
    fn test_zero_reserve_is_skipped() {
        let mut story = Story::new();
        story.reserve_space(0.0);
        assert!(story.is_empty());
    }
}
