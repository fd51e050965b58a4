use num_traits::{PrimInt, Unsigned};

use crate::{bitstreams::BinaryReader, error::{Error, Result}};

use super::{CodeTable, MAX_SUPPORTED_BITS};

/// Decodes canonical Huffman codes one bit at a time.
///
/// Only the per-length counts and the symbols sorted by (length, index) are
/// kept: within a tier the codes are consecutive, so the offset of a code from
/// the first code of its tier is the offset into that tier's symbols.
#[derive(Clone, Debug)]
pub struct CanonicalDecoder {
    max_bits: usize,
    count: Vec<u64>,
    symbols: Vec<usize>,
}

impl CanonicalDecoder {
    pub fn from_lengths<L: PrimInt + Unsigned>(lengths: &[L], max_bits: usize) -> Result<Self> {
        if max_bits > MAX_SUPPORTED_BITS {
            return Err(Error::MaxBitsTooLarge { max_bits, supported: MAX_SUPPORTED_BITS });
        }

        let mut count = vec![0u64; max_bits + 1];
        let mut sorted = Vec::with_capacity(lengths.len());

        for (symbol, &length) in lengths.iter().enumerate() {
            let len = match length.to_usize() {
                Some(len) if len <= max_bits => len,
                len => return Err(Error::LengthExceedsMaxBits { symbol, length: len.unwrap_or(usize::MAX), max_bits }),
            };
            if len != 0 {
                count[len] += 1;
                sorted.push((len, symbol));
            }
        }

        sorted.sort_unstable();

        Ok(Self { max_bits, count, symbols: sorted.into_iter().map(|(_, s)| s).collect() })
    }

    pub fn from_table(table: &CodeTable) -> Result<Self> {
        Self::from_lengths(table.lengths(), table.max_bits())
    }

    /// Reads one code from `reader` and returns its symbol.
    pub fn decode(&self, reader: &mut BinaryReader) -> Result<usize> {
        let mut code = 0u64;
        let mut first = 0u64;
        let mut index = 0usize;

        for len in 1..=self.max_bits {
            code |= reader.read_bit()?;
            let count = self.count[len];
            if code < first + count {
                return Ok(self.symbols[index + (code - first) as usize]);
            }
            index += count as usize;
            first = (first + count) << 1;
            code <<= 1;
        }

        Err(Error::InvalidCode { bits: self.max_bits })
    }
}
