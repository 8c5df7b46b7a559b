use std::io::{self, BufWriter, Read, Write};

use log::{debug, error, info};

use crate::bitstream::bitwriter::BitWriter;
use crate::huffman_coding::code_table::CodeTable;
use crate::tools::cli::HzOpts;
use crate::tools::data_io::{compressed_name, discard_output, finish_input, open_input, open_output};
use crate::tools::freq_count::FreqTable;

/*
    File Format: Header followed by compressed data

    Header:
     - 4 bytes (u32): the number of bytes in the original data
     - 4 bytes (u32): the size of the alphabet
     - For each symbol in the alphabet, in ascending symbol order:
        - 1 byte: the symbol itself
        - 1 byte: the number of bits in its code
        - 0 or more bytes: the code, padded on the right with 0 bits
    Compressed data:
     - 0 or more bytes: the code of every input byte, packed, padded on the right with 0 bits

    All multi-byte values are little endian.

    Codes are only known once every input byte has been counted, so the encoder holds the whole
    input in memory and writes nothing until finish() is called.
*/

/// Compresses everything written to it into the underlying writer.
///
/// Nothing reaches the underlying writer until finish() is called. If finish() fails after it
/// has started writing, the underlying writer holds a partial stream and the encoder refuses
/// any further use.
#[derive(Debug)]
pub struct Encoder<W: Write> {
    bw: BitWriter<W>,
    /// Every byte written so far, in order.
    data: Vec<u8>,
    freqs: FreqTable,
    finished: bool,
    /// Set when finish() failed part way through writing.
    failed: bool,
}

impl<W: Write> Encoder<W> {
    pub fn new(writer: W) -> Self {
        Self {
            bw: BitWriter::new(writer),
            data: Vec::new(),
            freqs: FreqTable::new(),
            finished: false,
            failed: false,
        }
    }

    /// Build the code table and write the header and compressed data. Calling it again after
    /// it succeeded does nothing. Calling it again after it failed while writing returns an
    /// error, since the output already holds part of a stream.
    pub fn finish(&mut self) -> io::Result<()> {
        if self.finished {
            return Ok(());
        }
        if self.failed {
            return Err(incomplete_stream());
        }
        let original_len = u32::try_from(self.data.len()).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "input of {} bytes is too large, the limit is {} bytes",
                    self.data.len(),
                    u32::MAX
                ),
            )
        })?;
        let codes = CodeTable::from_freqs(&self.freqs);
        info!(
            "Compressing {} bytes with an alphabet of {} symbols.",
            original_len,
            codes.len()
        );

        if let Err(e) = self.write_stream(original_len, &codes) {
            error!("Writing the compressed stream failed: {}", e);
            self.failed = true;
            return Err(e);
        }

        self.finished = true;
        // The input is no longer needed
        self.data = Vec::new();
        Ok(())
    }

    fn write_stream(&mut self, original_len: u32, codes: &CodeTable) -> io::Result<()> {
        self.write_header(original_len, codes)?;
        self.write_data(codes)?;
        self.bw.close()
    }

    fn write_header(&mut self, original_len: u32, codes: &CodeTable) -> io::Result<()> {
        // The number of bytes in the original data
        self.bw.write_raw(&original_len.to_le_bytes())?;
        // The size of the alphabet
        self.bw.write_raw(&(codes.len() as u32).to_le_bytes())?;

        let mut header_bits = 64;
        for (symbol, code) in codes.iter() {
            let code_len = u8::try_from(code.len()).map_err(|_| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("code for symbol {} is longer than 255 bits", symbol),
                )
            })?;
            // The symbol and the number of bits in its code
            self.bw.write_raw(&[symbol, code_len])?;
            // The code, padded on the right with 0 bits. An empty code only happens when the
            // alphabet has a single symbol.
            self.bw.write_all_bits(code.bits())?;
            self.bw.flush()?;
            header_bits += 16 + (code.len() + 7) / 8 * 8;
        }
        debug!("Header is {} bytes.", header_bits / 8);
        Ok(())
    }

    fn write_data(&mut self, codes: &CodeTable) -> io::Result<()> {
        let mut payload_bits: u64 = 0;
        for &symbol in &self.data {
            let code = codes.code(symbol).ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::Other,
                    format!("no code for symbol {}", symbol),
                )
            })?;
            self.bw.write_all_bits(code.bits())?;
            payload_bits += code.len() as u64;
        }
        debug!(
            "Payload is {} bits ({} bytes).",
            payload_bits,
            (payload_bits + 7) / 8
        );
        Ok(())
    }

    /// True once finish() has succeeded.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// True once finish() has failed after writing part of the stream.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    pub fn get_ref(&self) -> &W {
        self.bw.get_ref()
    }

    pub fn get_mut(&mut self) -> &mut W {
        self.bw.get_mut()
    }

    /// Return the underlying writer. This does not call finish().
    pub fn into_inner(self) -> W {
        self.bw.into_inner()
    }
}

impl<W: Write> Write for Encoder<W> {
    /// Buffer the bytes and count them. Fails only once finish() has been called and has either
    /// succeeded or failed while writing.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.failed {
            return Err(incomplete_stream());
        }
        if self.finished {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "hzip: write after the compressed stream was finished",
            ));
        }
        self.data.extend_from_slice(buf);
        self.freqs.add(buf);
        Ok(buf.len())
    }

    /// Nothing can be written before finish(), so there is nothing to flush.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn incomplete_stream() -> io::Error {
    io::Error::new(
        io::ErrorKind::Other,
        "hzip: an earlier finish failed and left an incomplete compressed stream",
    )
}

/// Compress a byte slice in memory.
pub fn compress_bytes(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = Encoder::new(Vec::new());
    encoder.write_all(data)?;
    encoder.finish()?;
    Ok(encoder.into_inner())
}

/// Compress everything from input into output. Returns the number of bytes read.
pub fn compress_stream<R: Read, W: Write>(mut input: R, output: W) -> io::Result<u64> {
    let mut encoder = Encoder::new(output);
    let read = io::copy(&mut input, &mut encoder)?;
    encoder.finish()?;
    Ok(read)
}

/// Compress the files named in opts, or stdin to stdout when there are none.
pub fn compress(opts: &HzOpts) -> io::Result<()> {
    if opts.files.is_empty() {
        info!("Compressing standard input.");
        let stdout = io::stdout();
        let read = compress_stream(io::stdin().lock(), BufWriter::new(stdout.lock()))?;
        info!("Compressed {} bytes.", read);
        return Ok(());
    }
    for path in &opts.files {
        compress_file(opts, path)?;
    }
    Ok(())
}

fn compress_file(opts: &HzOpts, path: &str) -> io::Result<()> {
    let input = open_input(path)?;
    let out_path = compressed_name(path);
    let output = open_output(opts, &out_path)?;
    match compress_stream(input, output) {
        Ok(read) => info!("{}: compressed {} bytes into {}.", path, read, out_path),
        Err(e) => {
            error!("{}: compression failed: {}", path, e);
            discard_output(opts, &out_path);
            return Err(e);
        }
    }
    finish_input(opts, path)
}

#[cfg(test)]
mod test {
    use super::{compress_bytes, Encoder};
    use std::io::{self, Write};

    /// Accepts `room` bytes, then fails every write.
    struct Limited {
        out: Vec<u8>,
        room: usize,
    }

    impl Write for Limited {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.room == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "sink full"));
            }
            let n = buf.len().min(self.room);
            self.out.extend_from_slice(&buf[..n]);
            self.room -= n;
            Ok(n)
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn empty_test() {
        let out = compress_bytes(&[]).unwrap();
        // Length of the original data, then the size of the alphabet
        assert_eq!(out, vec![0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn single_symbol_test() {
        let out = compress_bytes(b"XXXXXXXXXX").unwrap();
        assert_eq!(out[..4], [0x0a, 0, 0, 0]);
        assert_eq!(out[4..8], [0x01, 0, 0, 0]);
        // The symbol and a zero bit code length. A single symbol alphabet needs no data.
        assert_eq!(out[8..], [b'X', 0x00]);
    }

    #[test]
    fn hello_world_test() {
        let out = compress_bytes(b"Hello World").unwrap();
        assert_eq!(out[..4], [0x0b, 0, 0, 0]);
        assert_eq!(out[4..8], [0x08, 0, 0, 0]);
        // Every code here is at most 8 bits, so each descriptor is exactly three bytes.
        let alphabet = b" HWdelor";
        for (i, &sym) in alphabet.iter().enumerate() {
            let at = 8 + 3 * i;
            assert_eq!(out[at], sym);
            assert!(out[at + 1] >= 1 && out[at + 1] <= 8);
        }
    }

    #[test]
    fn known_layout_test() {
        // a:2 b:1 -> b is merged first and becomes the left child: b = "0", a = "1"
        let out = compress_bytes(b"aba").unwrap();
        assert_eq!(
            out,
            vec![
                3, 0, 0, 0, // original length
                2, 0, 0, 0, // alphabet size
                b'a', 1, 0b1000_0000, // a = 1
                b'b', 1, 0b0000_0000, // b = 0
                0b1010_0000, // payload 1 0 1, padded
            ]
        );
    }

    #[test]
    fn nothing_written_before_finish_test() {
        let mut encoder = Encoder::new(Vec::new());
        encoder.write_all(b"some data").unwrap();
        encoder.flush().unwrap();
        assert!(encoder.get_ref().is_empty());
        encoder.finish().unwrap();
        assert!(!encoder.get_ref().is_empty());
    }

    #[test]
    fn finish_twice_test() {
        let mut encoder = Encoder::new(Vec::new());
        encoder.write_all(b"abracadabra").unwrap();
        encoder.finish().unwrap();
        let len = encoder.get_ref().len();
        encoder.finish().unwrap();
        assert_eq!(encoder.get_ref().len(), len);
        assert!(encoder.is_finished());
        assert!(encoder.write(b"more").is_err());
    }

    #[test]
    fn deterministic_test() {
        let data = b"the quick brown fox jumps over the lazy dog";
        assert_eq!(compress_bytes(data).unwrap(), compress_bytes(data).unwrap());
    }

    #[test]
    fn failed_finish_test() {
        // The sink fills up in the middle of the header
        let mut encoder = Encoder::new(Limited {
            out: vec![],
            room: 6,
        });
        encoder.write_all(b"Hello World").unwrap();
        assert!(encoder.finish().is_err());
        assert!(encoder.is_failed());
        assert!(!encoder.is_finished());
        assert_eq!(encoder.get_ref().out.len(), 6);

        // A retry must not write a second header after the partial one
        encoder.get_mut().room = 1024;
        assert!(encoder.finish().is_err());
        assert!(encoder.write(b"more").is_err());
        assert_eq!(encoder.get_ref().out.len(), 6);
    }
}
