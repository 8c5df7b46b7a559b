//! The huffman module builds the prefix codes for hzip.
//!
//! hzip uses a single static Huffman table per stream, derived from order-0 byte frequencies of
//! the whole input. The tree is built by repeatedly merging the two lightest nodes (huffman),
//! then the codes are read off the tree in both directions (code_table).
//!
//! Equal weights are merged in a fixed order, so the same input always produces the same codes.
//!

pub mod code_table;
pub mod huffman;
