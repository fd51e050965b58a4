//! Most-significant-bit-first bit packing, the order canonical codes are compared in.

use serde::{Serialize, Deserialize};

use crate::error::{Error, Result};

#[derive(Serialize)]
pub struct BinaryWriter {
    pub os: Box<[u8]>,
}

pub struct BinaryWriterBuilder {
    os: Vec<u8>,
    pub written_bits: usize,
    pub current: u64,
    pub free: usize,
}

impl Default for BinaryWriterBuilder {
    fn default() -> Self {
        BinaryWriterBuilder {
            os: Vec::default(),
            written_bits: 0,
            current: 0,
            free: 8,
        }
    }
}

impl BinaryWriterBuilder {
    /// Flushes the partial last byte, padded with zero bits.
    pub fn build(mut self) -> BinaryWriter {
        if self.free != 8 {
            self.write(self.current);
        }

        BinaryWriter {
            os: self.os.into_boxed_slice()
        }
    }

    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    fn write(&mut self, b: u64) {
        self.os.push(b as u8);
    }

    #[inline(always)]
    fn write_in_current(&mut self, b: u64, len: u64) {
        self.free -= len as usize;
        self.current |= (b & ((1 << len) - 1)) << self.free;

        if self.free == 0 {
            self.write(self.current);
            self.free = 8;
            self.current = 0;
        }

        self.written_bits += len as usize;
    }

    /// Appends the low `len` bits of `x`, most significant first.
    #[inline(always)]
    pub fn push_bits(&mut self, x: u64, len: u64) -> u64 {
        assert!(len <= 64, "Cannot write {} bits from an integer", len);

        let mut remaining = len;
        while remaining != 0 {
            let chunk = remaining.min(self.free as u64);
            self.write_in_current(x >> (remaining - chunk), chunk);
            remaining -= chunk;
        }

        len
    }
}

#[derive(Clone, Eq, PartialEq, Serialize, Deserialize, Debug)]
pub struct BinaryReader {
    is: Box<[u8]>,
    pub read_bits: usize,
}

impl BinaryReader {
    pub fn new(input_stream: Box<[u8]>) -> Self {
        BinaryReader {
            is: input_stream,
            read_bits: 0,
        }
    }

    pub fn remaining_bits(&self) -> usize {
        (self.is.len() << 3) - self.read_bits
    }

    #[inline(always)]
    pub fn read_bit(&mut self) -> Result<u64> {
        let byte = self.is
            .get(self.read_bits >> 3)
            .ok_or(Error::UnexpectedEof { bits_read: self.read_bits })?;

        let bit = (byte >> (7 - (self.read_bits & 7))) & 1;
        self.read_bits += 1;
        Ok(bit as u64)
    }

    #[inline(always)]
    pub fn read_int(&mut self, len: u64) -> Result<u64> {
        assert!(len <= 64, "Cannot read {} bits into an integer", len);

        if len as usize > self.remaining_bits() {
            return Err(Error::UnexpectedEof { bits_read: self.read_bits });
        }

        let mut x = 0;
        for _ in 0..len {
            x = (x << 1) | self.read_bit()?;
        }
        Ok(x)
    }
}
