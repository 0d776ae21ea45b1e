//! Per-pane document plus decorations, updated one transaction at a time

use crate::compile::DiffDecorationConfig;
use crate::decoration::DecorationSet;
use crate::document::{ChangeSpec, Document, DocumentError, Edit};
use crate::placeholder::PlaceholderPalette;
use crate::store::DecorationStore;

/// Side effect carried alongside (or instead of) a document change
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Replace the decoration set with a fresh compile
    SetDiffDecorations(DiffDecorationConfig),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transaction {
    pub changes: Option<ChangeSpec>,
    pub effects: Vec<Effect>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn change(change: ChangeSpec) -> Self {
        Self {
            changes: Some(change),
            effects: Vec::new(),
        }
    }

    pub fn effect(effect: Effect) -> Self {
        Self {
            changes: None,
            effects: vec![effect],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_none() && self.effects.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct EditorState {
    doc: Document,
    store: DecorationStore,
    read_only: bool,
}

impl EditorState {
    pub fn new(text: &str, read_only: bool) -> Self {
        Self {
            doc: Document::new(text),
            store: DecorationStore::new(),
            read_only,
        }
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn decorations(&self) -> &DecorationSet {
        self.store.decorations()
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Apply a transaction atomically. The change goes first so effects
    /// compile against the new document; on error nothing is touched.
    pub fn apply(&mut self, tx: Transaction) -> Result<Option<Edit>, DocumentError> {
        let edit = match &tx.changes {
            Some(change) => Some(self.doc.apply(change)?),
            None => None,
        };
        self.store.update(&tx.effects, edit.as_ref(), &self.doc);
        Ok(edit)
    }

    /// Recolor compiled placeholders without recomputing. Returns how many
    /// changed.
    pub fn repaint_placeholders(&mut self, palette: PlaceholderPalette) -> usize {
        self.store.repaint(palette)
    }

    /// Drop decorations; the document stays
    pub fn clear_decorations(&mut self) {
        self.store.clear();
    }
}
