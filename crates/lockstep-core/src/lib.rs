//! Lockstep Core - diff overlay engine for side-by-side editing
//!
//! Turns per-line diff metadata into decorations on two editable panes,
//! pads them with placeholder rows so they stay row-aligned, remaps the
//! decorations through live edits and keeps horizontal scroll in step.

pub mod color;
pub mod compile;
pub mod decoration;
pub mod document;
pub mod handle;
pub mod line;
pub mod pair;
pub mod placeholder;
pub mod render;
pub mod rows;
pub mod scroll;
pub mod state;
pub mod store;
pub mod theme;

pub use color::{ColorError, Rgba};
pub use compile::{compile, DiffDecorationConfig};
pub use decoration::{Decoration, DecorationClass, DecorationSet, PositionedDecoration, WidgetSide};
pub use document::{Assoc, ChangeSpec, Document, DocumentError, Edit, Line, MapMode};
pub use handle::{DiffEditor, EditorHandle, EditorOptions};
pub use line::{parse_lines, DiffLineInfo, InlineDiffSegment, InlineKind, LineDiffType};
pub use pair::{DiffPair, PairOptions};
pub use placeholder::{PlaceholderPalette, PlaceholderWidget, StripeCache, StripeCell};
pub use render::{layout, LineMark, VisualRow};
pub use rows::{
    project, CharDiff, CharPart, DiffRow, DiffSource, PaneSide, PartKind, SideKind, SideLine,
};
pub use scroll::{ScrollGuard, ScrollPane, ScrollSynchronizer};
pub use state::{Effect, EditorState, Transaction};
pub use store::DecorationStore;
pub use theme::{ClassStyle, DiffPalette, EditorTheme, PaletteOverrides, ThemeBinding};
