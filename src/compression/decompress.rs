use log::{debug, error, info, trace, warn};

use crate::bitstream::bitreader::BitReader;
use crate::huffman_coding::code_table::{Code, CodeTable};
use crate::tools::cli::HzOpts;
use crate::tools::data_io::{decompressed_name, discard_output, finish_input, open_input, open_output};

use std::io::{self, BufWriter, Read, Write};

const EOF_MESSAGE: &str = "Unexpected End Of File";

fn unexpected_eof() -> io::Error {
    io::Error::new(io::ErrorKind::UnexpectedEof, EOF_MESSAGE)
}

/// Where a decoder is in its stream. The header is parsed by Decoder::new(), so there is no
/// unopened state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Symbols are still owed to the caller.
    Reading,
    /// Every symbol has been produced and the source has been read to its end.
    Drained,
}

/// Decompresses an hzip stream read from the underlying reader.
#[derive(Debug)]
pub struct Decoder<R> {
    br: BitReader<R>,
    /// Symbols produced so far
    emitted: u32,
    /// Size of the original data, from the header
    original_len: u32,
    codes: CodeTable,
    /// Longest code in the table. A candidate longer than this can never match.
    max_code_len: usize,
    /// Bits of the code currently being matched. Kept across calls to read().
    code: Code,
    state: State,
}

impl<R: Read> Decoder<R> {
    /// Read the header from the source and prepare to decode. A source that ends before the
    /// header is complete gives an UnexpectedEof error.
    pub fn new(source: R) -> io::Result<Self> {
        let mut br = BitReader::new(source);
        let (original_len, codes) = read_header(&mut br).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                error!("The compressed header is incomplete.");
            }
            e
        })?;
        let max_code_len = codes.iter().map(|(_, c)| c.len()).max().unwrap_or(0);
        info!(
            "Found a stream of {} bytes encoded with {} symbols.",
            original_len,
            codes.len()
        );
        Ok(Self {
            br,
            emitted: 0,
            original_len,
            codes,
            max_code_len,
            code: Code::new(),
            state: State::Reading,
        })
    }

    /// Size of the original data, as declared by the header.
    pub fn original_len(&self) -> u32 {
        self.original_len
    }

    /// Number of symbols in the header's code table.
    pub fn alphabet_len(&self) -> usize {
        self.codes.len()
    }

    pub fn code_table(&self) -> &CodeTable {
        &self.codes
    }

    pub fn get_ref(&self) -> &R {
        self.br.get_ref()
    }

    pub fn into_inner(self) -> R {
        self.br.into_inner()
    }

    /// Read one bit at a time until the bits read form a code in the table.
    ///
    /// The empty candidate is tried before any bit is read, which is how a single symbol
    /// alphabet decodes without any data. Once the candidate is longer than every code no match
    /// is possible; the rest of the source is skipped so the error is the same end of file
    /// error a short stream gives.
    fn next_symbol(&mut self) -> io::Result<u8> {
        loop {
            if self.code.len() <= self.max_code_len {
                if let Some(symbol) = self.codes.lookup(&self.code) {
                    self.code.clear();
                    return Ok(symbol);
                }
            }
            match self.br.read_bit()? {
                Some(bit) => {
                    if self.code.len() <= self.max_code_len {
                        self.code.push(bit);
                        if self.code.len() > self.max_code_len {
                            warn!(
                                "No code matches the bits at symbol {}. The data is corrupt.",
                                self.emitted
                            );
                        }
                    }
                }
                None => return Err(unexpected_eof()),
            }
        }
    }

    /// All symbols are out. Skip the padding left in the current byte and read the source to
    /// its end.
    fn drain(&mut self) -> io::Result<()> {
        self.br.reset_alignment();
        let extra = io::copy(self.br.get_mut(), &mut io::sink())?;
        if extra > 0 {
            warn!("Ignored {} bytes after the end of the compressed data.", extra);
        }
        self.state = State::Drained;
        debug!("Decoded all {} bytes.", self.emitted);
        Ok(())
    }
}

impl<R: Read> Read for Decoder<R> {
    /// Fill buf with decoded bytes. Returns 0 once every byte declared in the header has been
    /// produced. A stream that ends early gives an UnexpectedEof error, and a failing source
    /// gives its own error. Either is reported on the next call when this call already decoded
    /// some bytes.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut n = 0;
        for slot in buf.iter_mut() {
            if self.state == State::Drained {
                break;
            }
            if self.emitted == self.original_len {
                match self.drain() {
                    Ok(()) => break,
                    // Still Reading, so the next call drains again and reports the error
                    Err(e) if n > 0 => {
                        trace!("Returning {} bytes before reporting: {}", n, e);
                        return Ok(n);
                    }
                    Err(e) => return Err(e),
                }
            }
            match self.next_symbol() {
                Ok(symbol) => {
                    *slot = symbol;
                    self.emitted += 1;
                    n += 1;
                }
                Err(e) if n > 0 => {
                    trace!("Returning {} bytes before reporting: {}", n, e);
                    return Ok(n);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(n)
    }
}

/// Read the original length, the alphabet size and each symbol's code. Any end of file in here
/// is unexpected.
fn read_header<R: Read>(br: &mut BitReader<R>) -> io::Result<(u32, CodeTable)> {
    let mut word = [0_u8; 4];
    // Original length
    br.read_raw(&mut word)?;
    let original_len = u32::from_le_bytes(word);
    // Alphabet size
    br.read_raw(&mut word)?;
    let alphabet_len = u32::from_le_bytes(word);
    debug!(
        "Header declares {} bytes and {} symbols.",
        original_len, alphabet_len
    );

    let mut codes = CodeTable::new();
    let mut descriptor = [0_u8; 2];
    for _ in 0..alphabet_len {
        // Symbol and the number of bits in its code
        br.read_raw(&mut descriptor)?;
        let [symbol, code_len] = descriptor;
        // The code itself
        let mut code = Code::new();
        for _ in 0..code_len {
            code.push(br.read_bit()?.ok_or_else(unexpected_eof)?);
        }
        trace!("symbol {:#04x} has code '{}'", symbol, code);
        codes.insert(symbol, code);
        // Get rid of the padding after the code, if any
        br.reset_alignment();
    }
    Ok((original_len, codes))
}

/// Decompress a byte slice in memory.
pub fn decompress_bytes(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut decoder = Decoder::new(data)?;
    // The declared length comes from untrusted data, so it is not used to reserve space
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

/// Decompress everything from input into output. Returns the number of bytes written.
pub fn decompress_stream<R: Read, W: Write>(input: R, mut output: W) -> io::Result<u64> {
    let mut decoder = Decoder::new(input)?;
    let written = io::copy(&mut decoder, &mut output)?;
    output.flush()?;
    Ok(written)
}

/// Decompress the files named in opts, or stdin to stdout when there are none.
pub fn decompress(opts: &HzOpts) -> io::Result<()> {
    if opts.files.is_empty() {
        info!("Decompressing standard input.");
        let stdout = io::stdout();
        let written = decompress_stream(io::stdin().lock(), BufWriter::new(stdout.lock()))?;
        info!("Decompressed {} bytes.", written);
        return Ok(());
    }
    for path in &opts.files {
        decompress_file(opts, path)?;
    }
    Ok(())
}

fn decompress_file(opts: &HzOpts, path: &str) -> io::Result<()> {
    let input = open_input(path)?;
    let out_path = decompressed_name(path);
    let output = open_output(opts, &out_path)?;
    match decompress_stream(input, output) {
        Ok(written) => info!("{}: decompressed {} bytes into {}.", path, written, out_path),
        Err(e) => {
            error!("{}: decompression failed: {}", path, e);
            discard_output(opts, &out_path);
            return Err(e);
        }
    }
    finish_input(opts, path)
}

/// Decode the files named in opts (or stdin) without writing anything, to check their
/// integrity.
pub fn test_integrity(opts: &HzOpts) -> io::Result<()> {
    if opts.files.is_empty() {
        let written = decompress_stream(io::stdin().lock(), io::sink())?;
        info!("(stdin): ok, {} bytes.", written);
        return Ok(());
    }
    for path in &opts.files {
        match decompress_stream(open_input(path)?, io::sink()) {
            Ok(written) => info!("{}: ok, {} bytes.", path, written),
            Err(e) => {
                error!("{}: data integrity error: {}", path, e);
                return Err(e);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::{decompress_bytes, Decoder};
    use crate::compression::compress::compress_bytes;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};
    use std::io::{ErrorKind, Read};

    fn try_decompress(data: &[u8]) -> ErrorKind {
        decompress_bytes(data).unwrap_err().kind()
    }

    #[test]
    fn hello_world_test() {
        let packed = compress_bytes(b"Hello World").unwrap();
        let decoder = Decoder::new(packed.as_slice()).unwrap();
        assert_eq!(decoder.original_len(), 11);
        assert_eq!(decoder.alphabet_len(), 8);
        assert_eq!(decompress_bytes(&packed).unwrap(), b"Hello World");
    }

    #[test]
    fn known_layout_test() {
        let packed = [
            3, 0, 0, 0, 2, 0, 0, 0, b'a', 1, 0b1000_0000, b'b', 1, 0, 0b1010_0000,
        ];
        assert_eq!(decompress_bytes(&packed).unwrap(), b"aba");
    }

    #[test]
    fn empty_test() {
        assert_eq!(decompress_bytes(&[0; 8]).unwrap(), b"");
    }

    #[test]
    fn single_symbol_test() {
        let packed = [10, 0, 0, 0, 1, 0, 0, 0, b'X', 0];
        assert_eq!(decompress_bytes(&packed).unwrap(), b"XXXXXXXXXX");
    }

    #[test]
    fn malformed_header_test() {
        let packed = compress_bytes(b"Hello World").unwrap();

        // Say the original size is larger than it actually is
        let mut mangled = packed.clone();
        mangled[0] = 0xff;
        assert_eq!(try_decompress(&mangled), ErrorKind::UnexpectedEof);

        // Say the alphabet size is larger than it actually is
        let mut mangled = packed.clone();
        mangled[4] = 0xff;
        assert_eq!(try_decompress(&mangled), ErrorKind::UnexpectedEof);

        // Say the alphabet size is smaller than it actually is
        let mut mangled = packed.clone();
        mangled[4] = 0x00;
        assert_eq!(try_decompress(&mangled), ErrorKind::UnexpectedEof);

        // Empty file
        assert_eq!(try_decompress(&[]), ErrorKind::UnexpectedEof);

        // Has length but no alphabet size
        assert_eq!(try_decompress(&[0x0a, 0, 0, 0]), ErrorKind::UnexpectedEof);

        // Cut off in the middle of a descriptor
        assert_eq!(try_decompress(&packed[..9]), ErrorKind::UnexpectedEof);

        // Cut off after a code length, before the code bits
        assert_eq!(packed[8], b' ');
        assert!(packed[9] > 0);
        assert_eq!(try_decompress(&packed[..10]), ErrorKind::UnexpectedEof);
    }

    #[test]
    fn truncated_payload_test() {
        let data = b"It was the best of times, it was the worst of times";
        let packed = compress_bytes(data).unwrap();
        assert_eq!(
            try_decompress(&packed[..packed.len() - 1]),
            ErrorKind::UnexpectedEof
        );

        // The bytes decoded before the end are still handed out first
        let mut decoder = Decoder::new(&packed[..packed.len() - 1]).unwrap();
        let mut buf = vec![0_u8; data.len()];
        let n = decoder.read(&mut buf).unwrap();
        assert!(n > 0 && n < data.len());
        assert_eq!(buf[..n], data[..n]);
        assert_eq!(decoder.read(&mut buf).unwrap_err().kind(), ErrorKind::UnexpectedEof);
    }

    #[test]
    fn end_of_stream_test() {
        let packed = compress_bytes(b"abcabcabc").unwrap();
        let mut decoder = Decoder::new(packed.as_slice()).unwrap();
        let mut buf = [0_u8; 4];
        assert_eq!(decoder.read(&mut buf).unwrap(), 4);
        assert_eq!(decoder.read(&mut buf).unwrap(), 4);
        assert_eq!(decoder.read(&mut buf).unwrap(), 1);
        assert_eq!(decoder.read(&mut buf).unwrap(), 0);
        // Drained is final
        assert_eq!(decoder.read(&mut buf).unwrap(), 0);
        assert!(decoder.get_ref().is_empty());
    }

    /// Hands out its data, then fails instead of reporting the end.
    struct Broken<'a> {
        data: &'a [u8],
    }

    impl Read for Broken<'_> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.data.is_empty() {
                return Err(std::io::Error::new(ErrorKind::Other, "source broke"));
            }
            self.data.read(buf)
        }
    }

    #[test]
    fn source_error_after_last_symbol_test() {
        let packed = compress_bytes(b"abcabcabc").unwrap();
        let mut decoder = Decoder::new(Broken { data: &packed }).unwrap();
        let mut buf = [0_u8; 64];
        // The decoded bytes come first, the source error after
        assert_eq!(decoder.read(&mut buf).unwrap(), 9);
        assert_eq!(buf[..9], *b"abcabcabc");
        assert_eq!(decoder.read(&mut buf).unwrap_err().kind(), ErrorKind::Other);
    }

    #[test]
    fn trailing_data_is_drained_test() {
        let mut packed = compress_bytes(b"abcabcabc").unwrap();
        packed.extend_from_slice(&[0xde, 0xad]);
        assert_eq!(decompress_bytes(&packed).unwrap(), b"abcabcabc");
    }

    #[test]
    fn random_round_trip_test() {
        let mut rng = StdRng::seed_from_u64(0x687a_6970);
        for len in 0..400 {
            let data = (0..len).map(|_| rng.gen::<u8>()).collect::<Vec<u8>>();
            let packed = compress_bytes(&data).unwrap();
            assert_eq!(decompress_bytes(&packed).unwrap(), data, "length {}", len);
        }
    }

    #[test]
    fn skewed_round_trip_test() {
        // Few symbols with very uneven counts give long codes
        let mut rng = StdRng::seed_from_u64(7);
        let mut data = vec![];
        for sym in 0..20_u8 {
            let count = 1 << (sym % 12);
            data.extend(std::iter::repeat(sym).take(count));
        }
        data.shuffle(&mut rng);
        let packed = compress_bytes(&data).unwrap();
        assert!(packed.len() < data.len());
        assert_eq!(decompress_bytes(&packed).unwrap(), data);
    }

    #[test]
    fn all_symbols_round_trip_test() {
        let data = (0..=255_u8).cycle().take(4096).collect::<Vec<u8>>();
        let packed = compress_bytes(&data).unwrap();
        assert_eq!(decompress_bytes(&packed).unwrap(), data);
    }

    #[test]
    fn small_reads_test() {
        let data = b"mississippi river";
        let packed = compress_bytes(data).unwrap();
        let mut decoder = Decoder::new(packed.as_slice()).unwrap();
        let mut out = vec![];
        let mut one = [0_u8; 1];
        while decoder.read(&mut one).unwrap() == 1 {
            out.push(one[0]);
        }
        assert_eq!(out, data);
    }

    mod props {
        use crate::compression::compress::compress_bytes;
        use crate::compression::decompress::decompress_bytes;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn round_trip_prop(data in proptest::collection::vec(any::<u8>(), 0..600)) {
                let packed = compress_bytes(&data).unwrap();
                prop_assert_eq!(decompress_bytes(&packed).unwrap(), data);
            }
        }
    }
}
