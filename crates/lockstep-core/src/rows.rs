//! Side-by-side diff rows and their projection onto one pane

use serde::{Deserialize, Serialize};

use crate::line::{DiffLineInfo, InlineDiffSegment, InlineKind, LineDiffType};

/// What one side of an aligned row shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SideKind {
    Unchanged,
    Added,
    Removed,
    Modified,
    /// No line on this side; the row is padding
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SideLine {
    #[serde(rename = "type")]
    pub kind: SideKind,
    pub content: String,
    /// 1-based line number in the side's text; absent for placeholders
    #[serde(default)]
    pub line_number: Option<usize>,
    /// Opposite side's text, set for modified lines
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pair_content: Option<String>,
}

impl SideLine {
    pub fn new(kind: SideKind, content: impl Into<String>, line_number: usize) -> Self {
        Self {
            kind,
            content: content.into(),
            line_number: Some(line_number),
            pair_content: None,
        }
    }

    pub fn placeholder() -> Self {
        Self {
            kind: SideKind::Placeholder,
            content: String::new(),
            line_number: None,
            pair_content: None,
        }
    }

    pub fn with_pair(mut self, pair: impl Into<String>) -> Self {
        self.pair_content = Some(pair.into());
        self
    }

    pub fn is_placeholder(&self) -> bool {
        self.kind == SideKind::Placeholder
    }
}

/// One visual row of the aligned diff
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffRow {
    pub left: SideLine,
    pub right: SideLine,
}

impl DiffRow {
    pub fn new(left: SideLine, right: SideLine) -> Self {
        Self { left, right }
    }

    pub fn side(&self, side: PaneSide) -> &SideLine {
        match side {
            PaneSide::Left => &self.left,
            PaneSide::Right => &self.right,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartKind {
    Equal,
    Added,
    Removed,
}

/// One run of a character-level diff between two strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharPart {
    pub text: String,
    pub kind: PartKind,
}

impl CharPart {
    pub fn new(text: impl Into<String>, kind: PartKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaneSide {
    Left,
    Right,
}

impl PaneSide {
    pub fn other(self) -> Self {
        match self {
            PaneSide::Left => PaneSide::Right,
            PaneSide::Right => PaneSide::Left,
        }
    }
}

/// Produces aligned rows for two texts. Left is the old side.
pub trait DiffSource {
    fn diff_rows(&self, left: &str, right: &str) -> Vec<DiffRow>;
}

/// Character-level diff of two single lines
pub trait CharDiff {
    fn diff_chars(&self, old: &str, new: &str) -> Vec<CharPart>;
}

/// Per-pane diff metadata for `rows`.
///
/// Real lines are numbered in order; a placeholder takes the index of the
/// next real line so it lands before it, or past the end when none follows.
pub fn project(rows: &[DiffRow], side: PaneSide, chars: &dyn CharDiff) -> Vec<DiffLineInfo> {
    let mut out = Vec::with_capacity(rows.len());
    let mut editor_line: i64 = 0;

    for row in rows {
        let line = row.side(side);
        if line.is_placeholder() {
            out.push(DiffLineInfo::placeholder(editor_line));
            continue;
        }

        let kind = match line.kind {
            SideKind::Added => LineDiffType::Added,
            SideKind::Removed => LineDiffType::Removed,
            SideKind::Modified => LineDiffType::Modified,
            SideKind::Unchanged | SideKind::Placeholder => LineDiffType::Unchanged,
        };
        let mut info = DiffLineInfo::line(editor_line, kind);
        if let (SideKind::Modified, Some(pair)) = (line.kind, line.pair_content.as_deref()) {
            let parts = match side {
                PaneSide::Left => chars.diff_chars(&line.content, pair),
                PaneSide::Right => chars.diff_chars(pair, &line.content),
            };
            info = info.with_inline(inline_segments(&parts, side));
        }
        out.push(info);
        editor_line += 1;
    }
    out
}

/// Segments one side shows for a char diff: removed runs on the left,
/// added runs on the right. Offsets count chars within that side's line.
pub fn inline_segments(parts: &[CharPart], side: PaneSide) -> Vec<InlineDiffSegment> {
    let (shown, hidden, kind) = match side {
        PaneSide::Left => (PartKind::Removed, PartKind::Added, InlineKind::Removed),
        PaneSide::Right => (PartKind::Added, PartKind::Removed, InlineKind::Added),
    };

    let mut segments = Vec::new();
    let mut position: i64 = 0;
    for part in parts {
        if part.kind == hidden {
            continue;
        }
        let len = part.text.chars().count() as i64;
        if part.kind == shown && len > 0 {
            segments.push(InlineDiffSegment::new(position, position + len, kind));
        }
        position += len;
    }
    segments
}
