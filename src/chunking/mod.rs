//! Document chunking system
//!
//! Features:
//! - Sentence segmentation for CJK and Latin text
//! - Token-budgeted packing with whole-sentence overlap
//! - Hard splitting of sentences that cannot fit any chunk
//! - Swappable token counting (exact subword tokenizer or length/4 heuristic)

mod packer;
mod segmenter;
mod splitter;
mod tokenizer;

pub use packer::*;
pub use segmenter::*;
pub use splitter::*;
pub use tokenizer::*;
