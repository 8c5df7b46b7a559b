//! The compression module manages both directions of hzip.
//!
//! Compression happens in the following steps:
//! - Buffer the whole input and count the frequency of every byte value.
//! - Build a Huffman tree from those counts and read the codes off the tree.
//! - Write the header: original length, alphabet size and each symbol's code.
//! - Write the code of every input byte, packed into as few bytes as possible.
//!
//! Decompression reads the header back into a code table, then matches the packed bits against
//! that table one bit at a time until the declared number of bytes has been produced.
//!

pub mod compress;
pub mod decompress;
