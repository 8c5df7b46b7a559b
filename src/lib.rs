//! Rust implementation of hzip, a static Huffman coding compressor.
//!
//! Version 0.1.0
//!
//! Every byte of the input is replaced by a prefix code derived from the byte frequencies of the
//! whole input. The code table travels at the front of the compressed stream, so the stream is
//! self describing. There is one table per stream and no blocks, which means the compressor
//! must see all of its input before it writes anything.
//!
//! Basic usage to compress a file is as follows:
//!
//! `$> hzip test.txt`
//!
//! This will compress the file and create the file test.txt.hz.
//! The original file will be deleted unless -k is given.
//!
//! The library side is an io::Write / io::Read pair:
//!
//! ```
//! use std::io::{Read, Write};
//! use hzip::compression::compress::Encoder;
//! use hzip::compression::decompress::Decoder;
//!
//! let mut encoder = Encoder::new(Vec::new());
//! encoder.write_all(b"Hello World").unwrap();
//! encoder.finish().unwrap();
//! let packed = encoder.into_inner();
//!
//! let mut out = String::new();
//! Decoder::new(packed.as_slice()).unwrap().read_to_string(&mut out).unwrap();
//! assert_eq!(out, "Hello World");
//! ```
//!
pub mod bitstream;
pub mod compression;
pub mod huffman_coding;
pub mod tools;
