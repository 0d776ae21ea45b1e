//! Per-line diff classification consumed from the upstream differ

use serde::{Deserialize, Serialize};

/// Background classification of a rendered line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineDiffType {
    Added,
    Removed,
    Modified,
    #[default]
    Unchanged,
}

impl LineDiffType {
    /// Whether lines of this type get a visual background at all
    pub fn is_visible(self) -> bool {
        self != LineDiffType::Unchanged
    }
}

/// Kind of a character-level segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InlineKind {
    Added,
    Removed,
}

/// Character range inside a single line, relative to the line start.
///
/// Offsets count Unicode scalar values. Upstream data is not trusted:
/// out-of-range or inverted segments are clipped or dropped when compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineDiffSegment {
    pub from: i64,
    pub to: i64,
    #[serde(rename = "type")]
    pub kind: InlineKind,
}

impl InlineDiffSegment {
    pub fn new(from: i64, to: i64, kind: InlineKind) -> Self {
        Self { from, to, kind }
    }
}

/// Diff metadata for one row of a pane
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffLineInfo {
    /// Target row in the rendered document (0-indexed). Negative rows are
    /// skipped; rows past the last real line become trailing placeholders.
    pub editor_line: i64,
    /// Ignored for placeholders
    #[serde(rename = "type", default)]
    pub kind: LineDiffType,
    pub is_placeholder: bool,
    /// Ignored for placeholders
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_diffs: Option<Vec<InlineDiffSegment>>,
}

impl DiffLineInfo {
    /// A real line with a background type
    pub fn line(editor_line: i64, kind: LineDiffType) -> Self {
        Self {
            editor_line,
            kind,
            is_placeholder: false,
            inline_diffs: None,
        }
    }

    /// A padding row inserted before `editor_line`
    pub fn placeholder(editor_line: i64) -> Self {
        Self {
            editor_line,
            kind: LineDiffType::Unchanged,
            is_placeholder: true,
            inline_diffs: None,
        }
    }

    pub fn with_inline(mut self, segments: Vec<InlineDiffSegment>) -> Self {
        self.inline_diffs = Some(segments);
        self
    }
}

/// Parse an upstream `DiffLineInfo[]` JSON payload
pub fn parse_lines(json: &str) -> Result<Vec<DiffLineInfo>, serde_json::Error> {
    serde_json::from_str(json)
}
