//! BitWriter: writes individual bits, most significant bit first, to any sink that supports
//! the write() call.
//!
//! Bits are packed into a one byte queue. As soon as the queue holds eight bits the byte is
//! written to the sink. Whole bytes (the header integers, symbols and code lengths) may be
//! written with write_raw(), but only while the queue is empty. Mixing the two mid-byte would
//! silently corrupt the stream, so it panics instead.
//!
use std::io::{self, Write};

/// Number of bits in the byte queue when it is empty.
const BYTE_BITS: u8 = 8;

/// Writes a bitstream to the underlying sink.
#[derive(Debug)]
pub struct BitWriter<W> {
    /// Handle to the output stream
    writer: W,
    /// Private queue holding bits that are waiting to be written as a byte.
    queue: u8,
    /// Count of valid bits in the queue (0-7).
    q_bits: u8,
    /// Set once close() has run.
    closed: bool,
}

impl<W: Write> BitWriter<W> {
    /// Create a new BitWriter around the sink. Nothing is written until eight bits are queued,
    /// flush() is called or write_raw() is used.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            queue: 0,
            q_bits: 0,
            closed: false,
        }
    }

    /// True when no partial byte is waiting in the queue.
    pub fn is_aligned(&self) -> bool {
        self.q_bits == 0
    }

    /// Put a single bit (0 or 1) on the stream. Panics on any other value.
    ///
    /// If the bit completes a byte, the byte is written to the sink. Should that write fail, the
    /// bit is taken back out of the queue so the writer is exactly as it was before the call.
    pub fn write_bit(&mut self, bit: u8) -> io::Result<()> {
        if bit > 1 {
            panic!("hzip: invalid bit {}", bit);
        }
        let saved = self.queue;
        self.queue |= bit << (BYTE_BITS - 1 - self.q_bits);
        self.q_bits += 1;
        if self.q_bits == BYTE_BITS {
            if let Err(e) = self.writer.write_all(&[self.queue]) {
                self.queue = saved;
                self.q_bits -= 1;
                return Err(e);
            }
            self.queue = 0;
            self.q_bits = 0;
        }
        Ok(())
    }

    /// Calls write_bit() on each bit in the slice, stopping at the first failure.
    ///
    /// Like io::Write::write, a failure after some bits were accepted is reported as a short
    /// count. The error itself is only returned when not even the first bit could be written.
    pub fn write_bits(&mut self, bits: &[u8]) -> io::Result<usize> {
        for (written, &bit) in bits.iter().enumerate() {
            if let Err(e) = self.write_bit(bit) {
                if written == 0 {
                    return Err(e);
                }
                return Ok(written);
            }
        }
        Ok(bits.len())
    }

    /// Write every bit in the slice, retrying short writes until done or an error occurs.
    pub fn write_all_bits(&mut self, mut bits: &[u8]) -> io::Result<()> {
        while !bits.is_empty() {
            match self.write_bits(bits) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "failed to write whole bit sequence",
                    ))
                }
                Ok(n) => bits = &bits[n..],
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Pass whole bytes straight to the sink. Panics if a partial byte is queued; call flush()
    /// first.
    pub fn write_raw(&mut self, buf: &[u8]) -> io::Result<()> {
        if !self.is_aligned() {
            panic!("hzip: invalid write call - bit buffer not empty");
        }
        self.writer.write_all(buf)
    }

    /// Ends the current byte, padding it with 0s in the least significant bits, and writes it
    /// to the sink. Does nothing when the queue is empty.
    pub fn flush(&mut self) -> io::Result<()> {
        if self.q_bits > 0 {
            self.writer.write_all(&[self.queue])?;
            self.queue = 0;
            self.q_bits = 0;
        }
        Ok(())
    }

    /// Flush any partial byte and then the sink itself. Calling it again is harmless.
    pub fn close(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.flush()?;
        self.writer.flush()?;
        self.closed = true;
        Ok(())
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Return the sink. Any queued partial byte is discarded, so flush() first.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
