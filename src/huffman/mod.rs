//! Canonical Huffman code assignment (RFC 1951, section 3.2.2).

pub mod decoder;

use num_traits::{PrimInt, Unsigned};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{bitstreams::BinaryWriterBuilder, error::{Error, Result}};

/// Codes are stored as `u32`, so no tier may be deeper than this.
pub const MAX_SUPPORTED_BITS: usize = 31;

/// Maximum code length used by deflate literal/length and distance trees.
pub const DEFLATE_MAX_BITS: usize = 15;

/// Validates one entry of a length array and widens it to `usize`.
#[inline(always)]
fn code_length<L: PrimInt + Unsigned>(symbol: usize, length: L, max_bits: usize) -> Result<usize> {
    match length.to_usize() {
        Some(len) if len <= max_bits => Ok(len),
        len => Err(Error::LengthExceedsMaxBits { symbol, length: len.unwrap_or(usize::MAX), max_bits }),
    }
}

/// Reserves a zeroed table indexed by bit length, `0..=max_bits`.
fn tier_table(max_bits: usize) -> Result<Vec<u64>> {
    let mut table = Vec::new();
    table
        .try_reserve_exact(max_bits + 1)
        .map_err(|_| Error::AllocationFailed { requested_bytes: (max_bits + 1) * std::mem::size_of::<u64>() })?;
    table.resize(max_bits + 1, 0);
    Ok(table)
}

/// Fills `symbols` with the canonical code of every symbol whose length is non-zero.
///
/// Entries of `symbols` whose length is 0 are left untouched. Every length is
/// validated before anything is written, so on error `symbols` is unchanged.
pub fn lengths_to_symbols_into<L: PrimInt + Unsigned>(lengths: &[L], max_bits: usize, symbols: &mut [u32]) -> Result<()> {
    if symbols.len() != lengths.len() {
        return Err(Error::LengthMismatch { input: lengths.len(), output: symbols.len() });
    }
    if max_bits > MAX_SUPPORTED_BITS {
        return Err(Error::MaxBitsTooLarge { max_bits, supported: MAX_SUPPORTED_BITS });
    }

    let mut bl_count = tier_table(max_bits)?;
    let mut next_code = tier_table(max_bits)?;

    // Count the number of codes for each code length.
    for (symbol, &length) in lengths.iter().enumerate() {
        bl_count[code_length(symbol, length, max_bits)?] += 1;
    }

    // Find the numerical value of the smallest code for each code length.
    let mut code = 0u64;
    bl_count[0] = 0;
    for bits in 1..=max_bits {
        code = (code + bl_count[bits - 1]) << 1;
        next_code[bits] = code;
        trace!(bits, code, count = bl_count[bits], "tier base code");
    }

    for bits in 1..=max_bits {
        if bl_count[bits] != 0 && next_code[bits] + bl_count[bits] - 1 > u32::MAX as u64 {
            let symbol = lengths
                .iter()
                .rposition(|l| l.to_usize() == Some(bits))
                .unwrap_or_default();
            return Err(Error::CodeOverflow { symbol, length: bits });
        }
    }

    // Consecutive values within a tier, in symbol order.
    let mut used = 0;
    for (symbol, &length) in lengths.iter().enumerate() {
        // Already validated by the tally above.
        let len = length.to_usize().unwrap_or_default();
        if len != 0 {
            symbols[symbol] = next_code[len] as u32;
            next_code[len] += 1;
            used += 1;
        }
    }

    debug!(alphabet = lengths.len(), used, max_bits, "assigned canonical codes");
    Ok(())
}

/// Allocating variant of [`lengths_to_symbols_into`]; unused symbols get code 0.
pub fn lengths_to_symbols<L: PrimInt + Unsigned>(lengths: &[L], max_bits: usize) -> Result<Vec<u32>> {
    let mut symbols = vec![0; lengths.len()];
    lengths_to_symbols_into(lengths, max_bits, &mut symbols)?;
    Ok(symbols)
}

/// Reverses the low `len` bits of `code`.
///
/// Deflate packs bits starting from the least significant one but sends
/// Huffman codes starting from their most significant bit.
#[inline(always)]
pub fn reverse_bits(code: u32, len: u32) -> u32 {
    if len == 0 {
        return 0;
    }
    code.reverse_bits() >> (32 - len)
}

/// Code lengths together with their canonical codes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeTable {
    max_bits: usize,
    lengths: Vec<u32>,
    codes: Vec<u32>,
}

impl CodeTable {
    pub fn from_lengths<L: PrimInt + Unsigned>(lengths: &[L], max_bits: usize) -> Result<Self> {
        let codes = lengths_to_symbols(lengths, max_bits)?;
        let lengths = lengths
            .iter()
            .enumerate()
            .map(|(symbol, &len)| code_length(symbol, len, max_bits).map(|len| len as u32))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { max_bits, lengths, codes })
    }

    pub fn max_bits(&self) -> usize {
        self.max_bits
    }

    pub fn lengths(&self) -> &[u32] {
        &self.lengths
    }

    pub fn codes(&self) -> &[u32] {
        &self.codes
    }

    /// Alphabet size, including unused symbols.
    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    /// Number of symbols with a non-zero length.
    pub fn used_symbols(&self) -> usize {
        self.lengths.iter().filter(|&&len| len != 0).count()
    }

    /// Returns `(code, length)` for a symbol that has a code.
    pub fn code(&self, symbol: usize) -> Option<(u32, u32)> {
        match self.lengths.get(symbol) {
            Some(&len) if len != 0 => Some((self.codes[symbol], len)),
            _ => None,
        }
    }

    /// Writes the code of `symbol`, most significant bit first, and returns the number of bits written.
    pub fn write_symbol(&self, symbol: usize, writer: &mut BinaryWriterBuilder) -> Result<u64> {
        let (code, len) = self.code(symbol).ok_or(Error::UnknownSymbol { symbol })?;
        Ok(writer.push_bits(code as u64, len as u64))
    }
}

#[cfg(test)]
mod tests;
