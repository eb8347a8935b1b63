//! Lineage renderers
//!
//! Pure consumers of a populated graph. Root/leaf/cycle membership is
//! computed once (`GraphAnalysis`) and projected into every output, so
//! DOT, SVG, and HTML always agree on node and edge classification.

mod dot;
mod html;
mod svg;

pub use dot::to_dot;
pub use html::to_html;
pub use svg::{render_svg, RenderError};
