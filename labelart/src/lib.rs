#![deny(clippy::dbg_macro)]
pub mod cluster;
pub mod extract;
pub mod graphics;
pub mod import;
pub mod object;
pub mod parser;
pub mod path;
pub mod text;

pub use cluster::{merge_by_style_and_proximity, DEFAULT_PROXIMITY_THRESHOLD_MM};
pub use extract::{extract_painted_objects, PaintedObject};
pub use import::{
    import_page, load_content, ExtractOption, ExtractOptionBuilder, ImportError, ImportedPage,
};
