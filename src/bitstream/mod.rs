//! The bitstream module forms the I/O subsystem for hzip.
//!
//! Huffman codes are not byte aligned, so the encoder and decoder work a bit at a time. The
//! header fields (lengths and symbols) are whole bytes. Both the writer and the reader therefore
//! offer bit and raw byte access, and refuse raw access while a partial byte is pending.
//!
pub mod bitreader;
pub mod bitwriter;
