//! Anchor key registry.
//!
//! One registry lives for a whole document build and is shared by every
//! nested scan, so headings inside callouts never reuse an outer key.

use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use crate::inline::normalize_unicode;

/// Slug used when the text has no word characters left.
pub const FALLBACK_SLUG: &str = "sec";

static NON_WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s.-]").unwrap());
static SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s.]+").unwrap());
static HYPHENS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-{2,}").unwrap());

/// Derive an anchor-safe slug from display text.
pub fn slugify(text: &str) -> String {
    let lowered = normalize_unicode(text).to_lowercase();
    let stripped = NON_WORD_RE.replace_all(lowered.trim(), "");
    let hyphenated = SEPARATOR_RE.replace_all(&stripped, "-");
    let collapsed = HYPHENS_RE.replace_all(&hyphenated, "-");
    let slug = collapsed.trim_matches('-');

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug.to_string()
    }
}

/// Hands out unique anchor keys.
#[derive(Debug, Clone, Default)]
pub struct AnchorRegistry {
    counters: HashMap<String, usize>,
    issued: HashSet<String>,
}

impl AnchorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `base` and return its key.
    ///
    /// The first use of a slug gets the bare slug, later ones `-2`, `-3`...
    /// A suffixed candidate that is already taken (say a heading literally
    /// titled `a 2`) is skipped.
    pub fn register(&mut self, base: &str) -> String {
        let slug = slugify(base);
        let mut n = self.counters.get(&slug).copied().unwrap_or(0);

        let key = loop {
            let candidate = if n == 0 {
                slug.clone()
            } else {
                format!("{}-{}", slug, n + 1)
            };
            n += 1;
            if !self.issued.contains(&candidate) {
                break candidate;
            }
        };

        self.counters.insert(slug, n);
        self.issued.insert(key.clone());
        log::debug!("anchor {:?} -> {}", base, key);
        key
    }

    /// Mark a fixed key as taken so no heading can claim it.
    pub fn reserve(&mut self, key: impl Into<String>) {
        self.issued.insert(key.into());
    }

    /// Check if a key has been issued or reserved.
    pub fn contains(&self, key: &str) -> bool {
        self.issued.contains(key)
    }

    /// Number of issued or reserved keys.
    pub fn len(&self) -> usize {
        self.issued.len()
    }

    /// Check if nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.issued.is_empty()
    }
}
