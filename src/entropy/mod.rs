//! Shannon cost estimation of symbols from their observed counts.

use num_traits::ToPrimitive;
use tracing::debug;

use crate::error::{Error, Result};

/// Negative costs above this are floating-point residue and become 0.
pub const COST_EPSILON: f32 = 1e-5;

#[inline(always)]
fn frequency<C: ToPrimitive>(symbol: usize, count: &C) -> Result<u64> {
    count.to_u64().ok_or(Error::InvalidCount { symbol })
}

/// Writes into `bitlengths` the estimated number of bits of one occurrence of each symbol.
///
/// A symbol that was never seen is priced as if it occurred once, so that
/// symbols the code structurally needs keep a finite cost. When every count
/// is zero all symbols cost `ln(n)`: the natural logarithm, not `log2(n)`,
/// which existing cost models are tuned against.
pub fn calculate_entropy_into<C: ToPrimitive>(counts: &[C], bitlengths: &mut [f32]) -> Result<()> {
    if counts.is_empty() {
        return Err(Error::EmptyAlphabet);
    }
    if bitlengths.len() != counts.len() {
        return Err(Error::LengthMismatch { input: counts.len(), output: bitlengths.len() });
    }

    // Exact for any slice of u64 counts short of 2^64 entries.
    let mut sum = 0u128;
    for (symbol, count) in counts.iter().enumerate() {
        sum += frequency(symbol, count)? as u128;
    }

    let log2sum = if sum == 0 {
        debug!(alphabet = counts.len(), "no occurrences, pricing every symbol at ln(n)");
        (counts.len() as f64).ln() as f32
    } else {
        (sum as f64).log2() as f32
    };

    for (symbol, (count, cost)) in counts.iter().zip(bitlengths.iter_mut()).enumerate() {
        let count = frequency(symbol, count)?;

        let mut bits = if count == 0 { log2sum } else { log2sum - (count as f32).log2() };

        // Subtracting two close logarithms may leave a tiny negative value.
        if bits < 0.0 && bits > -COST_EPSILON {
            bits = 0.0;
        }
        if !bits.is_finite() || bits < 0.0 {
            return Err(Error::InvalidCost { symbol, cost: bits });
        }

        *cost = bits;
    }

    Ok(())
}

/// Allocating variant of [`calculate_entropy_into`].
pub fn calculate_entropy<C: ToPrimitive>(counts: &[C]) -> Result<Vec<f32>> {
    let mut bitlengths = vec![0.0; counts.len()];
    calculate_entropy_into(counts, &mut bitlengths)?;
    Ok(bitlengths)
}

/// Estimated size in bits of a histogram encoded with the given per-symbol costs.
pub fn total_cost<C: ToPrimitive>(counts: &[C], bitlengths: &[f32]) -> Result<f64> {
    if bitlengths.len() != counts.len() {
        return Err(Error::LengthMismatch { input: counts.len(), output: bitlengths.len() });
    }

    counts
        .iter()
        .zip(bitlengths.iter())
        .enumerate()
        .map(|(symbol, (count, &bits))| -> Result<f64> { Ok(frequency(symbol, count)? as f64 * bits as f64) })
        .sum()
}
