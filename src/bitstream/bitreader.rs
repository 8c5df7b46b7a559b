//! BitReader: A module for reading hzip compressed streams a bit at a time.
//!
//! Reads from any I/O source that supports the read() call. Data is pulled from the source one
//! byte at a time, so the reader never consumes more of the source than it has handed out.
//!
use std::io::{self, Read};

/// Reads a packed bitstream, most significant bit first.
#[derive(Debug)]
pub struct BitReader<R> {
    source: R,
    /// The byte currently being read.
    byte: u8,
    /// Mask selecting the next bit of `byte`. Zero when no bits are left.
    mask: u8,
}

impl<R: Read> BitReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            byte: 0,
            mask: 0,
        }
    }

    /// True when no partially read byte is pending.
    pub fn is_aligned(&self) -> bool {
        self.mask == 0
    }

    /// Pull one byte from the source. Ok(None) means the source is exhausted.
    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        let mut buf = [0_u8; 1];
        loop {
            match self.source.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Return the next bit (1 or 0), or None if there is no more data to read.
    pub fn read_bit(&mut self) -> io::Result<Option<u8>> {
        if self.mask == 0 {
            match self.next_byte()? {
                Some(byte) => {
                    self.byte = byte;
                    self.mask = 0x80;
                }
                None => return Ok(None),
            }
        }
        let bit = (self.byte & self.mask != 0) as u8;
        self.mask >>= 1;
        Ok(Some(bit))
    }

    /// Fill buf with whole bytes from the source. Panics if a partial byte is pending; call
    /// reset_alignment() first. A source that runs dry returns UnexpectedEof.
    pub fn read_raw(&mut self, buf: &mut [u8]) -> io::Result<()> {
        if !self.is_aligned() {
            panic!("hzip: invalid read call - bit buffer not empty");
        }
        self.source.read_exact(buf)
    }

    /// Throw away any bits left in the current byte so the next read starts on a byte boundary.
    pub fn reset_alignment(&mut self) {
        self.byte = 0;
        self.mask = 0;
    }

    pub fn get_ref(&self) -> &R {
        &self.source
    }

    /// Direct access to the source. Only safe to read from while aligned.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.source
    }

    pub fn into_inner(self) -> R {
        self.source
    }
}
