pub mod analyze;
pub mod model;

// Re-export commonly used types/functions for consumers
pub use analyze::{analyze, Analysis, Block, Edge, EdgeKind};
pub use model::{load_raw_image, Image};
