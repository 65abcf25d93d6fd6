//! Typst rendering for generated report sections
//!
//! Generated section text is parsed into a small block model (paragraphs,
//! subheadings and pipe-delimited tables), handed to a fixed Typst template
//! through `sys.inputs` and compiled entirely in memory to PDF bytes.

pub mod error;
pub mod markup;
pub mod render;
pub mod template;
pub mod world;

pub use error::RenderError;
pub use markup::{parse_blocks, strip_emphasis, Block};
pub use render::{compile_pdf, TypstSectionRenderer};
