//! Text model behind a pane: line index, changes and position mapping
//!
//! Positions are character offsets (Unicode scalar values) from the start of
//! the document. Lines are separated by `\n`; a document always has at least
//! one line, and a trailing newline produces a final empty line.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("change range {from}..{to} is inverted")]
    InvertedRange { from: usize, to: usize },
    #[error("change range {from}..{to} exceeds document length {len}")]
    OutOfBounds { from: usize, to: usize, len: usize },
}

/// One real line of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    /// 0-based line index
    pub index: usize,
    /// Offset of the first character
    pub from: usize,
    /// Offset just past the last character, excluding the line break
    pub to: usize,
}

impl Line {
    pub fn len(&self) -> usize {
        self.to - self.from
    }

    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }
}

/// Replace `[from, to)` with `insert`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSpec {
    pub from: usize,
    pub to: usize,
    pub insert: String,
}

impl ChangeSpec {
    pub fn insert(pos: usize, text: impl Into<String>) -> Self {
        Self {
            from: pos,
            to: pos,
            insert: text.into(),
        }
    }

    pub fn delete(from: usize, to: usize) -> Self {
        Self {
            from,
            to,
            insert: String::new(),
        }
    }

    pub fn replace(from: usize, to: usize, text: impl Into<String>) -> Self {
        Self {
            from,
            to,
            insert: text.into(),
        }
    }
}

/// Which side of an insertion a position sticks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    /// Stay in front of text inserted exactly at the position
    Before,
    /// Move past text inserted exactly at the position
    After,
}

/// What happens to a position whose surroundings were deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapMode {
    /// Never dropped; a position inside a deletion moves to the edge of the
    /// replacement picked by its `Assoc`
    Simple,
    /// Dropped when the deletion spans across the position
    TrackDel,
    /// Dropped when the character before the position is deleted
    TrackBefore,
    /// Dropped when the character after the position is deleted
    TrackAfter,
}

/// An applied change, reduced to what position mapping needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edit {
    pub from: usize,
    pub to: usize,
    /// Length of the inserted text in characters
    pub inserted: usize,
}

impl Edit {
    /// Length change of the document
    pub fn delta(&self) -> isize {
        self.inserted as isize - (self.to - self.from) as isize
    }

    /// Map a pre-edit position into the post-edit document.
    ///
    /// Returns `None` when the position fell strictly inside the deleted span.
    pub fn map_pos(&self, pos: usize, assoc: Assoc) -> Option<usize> {
        self.map_with(pos, assoc, MapMode::TrackDel)
    }

    /// Map a pre-edit position, dropping it as `mode` dictates.
    ///
    /// The start of a replaced span stays put whatever the `Assoc`; only a
    /// pure insertion at the position consults it.
    pub fn map_with(&self, pos: usize, assoc: Assoc, mode: MapMode) -> Option<usize> {
        let deleted = self.to > self.from;
        let dropped = deleted
            && match mode {
                MapMode::Simple => false,
                MapMode::TrackDel => self.from < pos && pos < self.to,
                MapMode::TrackBefore => self.from < pos && pos <= self.to,
                MapMode::TrackAfter => self.from <= pos && pos < self.to,
            };
        if dropped {
            return None;
        }
        if pos < self.from {
            return Some(pos);
        }
        if pos >= self.to && (deleted || pos > self.from) {
            return Some(pos - (self.to - self.from) + self.inserted);
        }
        // At a pure insertion point, or strictly inside a replaced span
        if pos == self.from && deleted {
            return Some(self.from);
        }
        Some(match assoc {
            Assoc::Before => self.from,
            Assoc::After => self.from + self.inserted,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    text: String,
    /// Offset of the first character of every line
    line_starts: Vec<usize>,
    len: usize,
}

impl Default for Document {
    fn default() -> Self {
        Self::new("")
    }
}

impl Document {
    pub fn new(text: &str) -> Self {
        let (line_starts, len) = index_lines(text);
        Self {
            text: text.to_string(),
            line_starts,
            len,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Line by 0-based index
    pub fn line(&self, index: usize) -> Option<Line> {
        let from = *self.line_starts.get(index)?;
        let to = match self.line_starts.get(index + 1) {
            Some(next) => next - 1,
            None => self.len,
        };
        Some(Line { index, from, to })
    }

    /// Line containing `pos`; positions past the end resolve to the last line
    pub fn line_at(&self, pos: usize) -> Line {
        let pos = pos.min(self.len);
        let index = match self.line_starts.binary_search(&pos) {
            Ok(index) => index,
            Err(index) => index - 1,
        };
        Line {
            index,
            from: self.line_starts[index],
            to: match self.line_starts.get(index + 1) {
                Some(next) => next - 1,
                None => self.len,
            },
        }
    }

    /// Text between two character offsets (clamped to the document)
    pub fn slice(&self, from: usize, to: usize) -> &str {
        let to = to.min(self.len);
        let from = from.min(to);
        &self.text[self.byte_offset(from)..self.byte_offset(to)]
    }

    /// Validate a change without applying it
    pub fn check(&self, change: &ChangeSpec) -> Result<(), DocumentError> {
        if change.from > change.to {
            return Err(DocumentError::InvertedRange {
                from: change.from,
                to: change.to,
            });
        }
        if change.to > self.len {
            return Err(DocumentError::OutOfBounds {
                from: change.from,
                to: change.to,
                len: self.len,
            });
        }
        Ok(())
    }

    /// Apply a change. The document is untouched if the change is invalid.
    pub fn apply(&mut self, change: &ChangeSpec) -> Result<Edit, DocumentError> {
        self.check(change)?;
        let start = self.byte_offset(change.from);
        let end = self.byte_offset(change.to);
        self.text.replace_range(start..end, &change.insert);
        let (line_starts, len) = index_lines(&self.text);
        self.line_starts = line_starts;
        self.len = len;
        Ok(Edit {
            from: change.from,
            to: change.to,
            inserted: change.insert.chars().count(),
        })
    }

    fn byte_offset(&self, pos: usize) -> usize {
        if pos >= self.len {
            return self.text.len();
        }
        self.text
            .char_indices()
            .nth(pos)
            .map(|(byte, _)| byte)
            .unwrap_or(self.text.len())
    }
}

fn index_lines(text: &str) -> (Vec<usize>, usize) {
    let mut starts = vec![0];
    let mut len = 0;
    for ch in text.chars() {
        len += 1;
        if ch == '\n' {
            starts.push(len);
        }
    }
    (starts, len)
}
