//! Assembly of the select query from its config-file fragments.
//!
//! A `<query-select>` element may contain `<collated>` and
//! `<critical-data-required>` sub-elements. The rendered query keeps plain
//! text always, collated fragments only for a collating model, and critical
//! fragments only when the page is not in editing mode. Sub-element markup
//! never survives into the query text.

/// One fragment of the select query, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Plain(String),
    Collated(String),
    Critical(String),
}

impl Segment {
    fn text(&self) -> &str {
        match self {
            Self::Plain(t) | Self::Collated(t) | Self::Critical(t) => t,
        }
    }
}

/// The select query as parsed: an ordered list of fragments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectQuery {
    segments: Vec<Segment>,
}

impl SelectQuery {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// True when every fragment is whitespace.
    pub fn is_blank(&self) -> bool {
        self.segments.iter().all(|s| s.text().trim().is_empty())
    }

    /// Render the query text for one model configuration.
    ///
    /// Whitespace runs collapse to single spaces so that dropped fragments
    /// leave no gaps behind.
    pub fn assemble(&self, collated: bool, include_critical: bool) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Plain(t) => out.push_str(t),
                Segment::Collated(t) if collated => out.push_str(t),
                Segment::Critical(t) if include_critical => out.push_str(t),
                Segment::Collated(_) | Segment::Critical(_) => {}
            }
        }
        collapse_whitespace(&out)
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
