pub mod classifier;
pub mod print;

pub use classifier::{BlockKind, LessonBlock, classify};
