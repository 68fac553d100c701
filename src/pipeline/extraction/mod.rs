//! Spatial label-value extraction of body-composition metrics.
//!
//! Pipeline: flatten OCR lines, cluster words into visual rows, match label
//! phrases per metric, then locate the nearest number to the right of each
//! label. Pure and infallible: unresolved metrics are simply absent.

pub mod types;
pub mod normalize;
pub mod rows;
pub mod labels;
pub mod locator;
pub mod text_fallback;
pub mod orchestrator;

pub use types::*;
pub use normalize::*;
pub use rows::*;
pub use labels::*;
pub use locator::*;
pub use text_fallback::*;
pub use orchestrator::*;
