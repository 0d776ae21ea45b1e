//! View rendering modules

mod split;

pub use split::render_split;
