//! Literal/length and distance histograms and the symbol costs derived from them.
//!
//! A block-splitting or iterative cost model keeps one [`SymbolStats`] per
//! candidate, blends or perturbs the frequencies between passes and re-derives
//! the per-symbol costs with [`SymbolStats::calculate`].

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{entropy::calculate_entropy_into, error::{Error, Result}};

/// Literal/length alphabet size, including the two reserved symbols.
pub const NUM_LL: usize = 288;
/// Distance alphabet size, including the two reserved symbols.
pub const NUM_D: usize = 32;
/// End-of-block symbol, present exactly once per block.
pub const END_SYMBOL: usize = 256;

/// Base lengths for length symbols 257..=285.
const LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99, 115, 131,
    163, 195, 227, 258,
];

/// Base distances for distance symbols 0..=29.
const DISTANCE_BASE: [u16; 30] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537,
    2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577,
];

pub const MIN_MATCH: usize = 3;
pub const MAX_MATCH: usize = 258;
pub const WINDOW_SIZE: usize = 32768;

/// Literal/length symbol of a match length in `3..=258`.
pub fn length_symbol(length: usize) -> Option<usize> {
    if !(MIN_MATCH..=MAX_MATCH).contains(&length) {
        return None;
    }
    Some(256 + LENGTH_BASE.partition_point(|&base| base as usize <= length))
}

/// Distance symbol of a match distance in `1..=32768`.
pub fn dist_symbol(dist: usize) -> Option<usize> {
    if !(1..=WINDOW_SIZE).contains(&dist) {
        return None;
    }
    Some(DISTANCE_BASE.partition_point(|&base| base as usize <= dist) - 1)
}

/// Each count has a one in three chance of taking the value of a random
/// count of the same histogram.
pub fn randomize_counts<R: Rng + ?Sized>(freqs: &mut [usize], rng: &mut R) {
    let n = freqs.len();
    for i in 0..n {
        if rng.gen_ratio(1, 3) {
            freqs[i] = freqs[rng.gen_range(0..n)];
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSymbolStats")]
pub struct SymbolStats {
    litlens: Vec<usize>,
    dists: Vec<usize>,
    ll_symbols: Vec<f32>,
    d_symbols: Vec<f32>,
}

/// Deserialized form, checked against the alphabet sizes before use.
#[derive(Deserialize)]
struct RawSymbolStats {
    litlens: Vec<usize>,
    dists: Vec<usize>,
    ll_symbols: Vec<f32>,
    d_symbols: Vec<f32>,
}

fn check_size(len: usize, expected: usize) -> Result<()> {
    if len != expected {
        return Err(Error::LengthMismatch { input: len, output: expected });
    }
    Ok(())
}

impl TryFrom<RawSymbolStats> for SymbolStats {
    type Error = Error;

    fn try_from(raw: RawSymbolStats) -> Result<Self> {
        check_size(raw.litlens.len(), NUM_LL)?;
        check_size(raw.dists.len(), NUM_D)?;
        check_size(raw.ll_symbols.len(), NUM_LL)?;
        check_size(raw.d_symbols.len(), NUM_D)?;

        Ok(Self { litlens: raw.litlens, dists: raw.dists, ll_symbols: raw.ll_symbols, d_symbols: raw.d_symbols })
    }
}

impl Default for SymbolStats {
    fn default() -> Self {
        Self {
            litlens: vec![0; NUM_LL],
            dists: vec![0; NUM_D],
            ll_symbols: vec![0.0; NUM_LL],
            d_symbols: vec![0.0; NUM_D],
        }
    }
}

impl SymbolStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds stats from existing histograms; costs start at zero.
    pub fn from_freqs(litlens: Vec<usize>, dists: Vec<usize>) -> Result<Self> {
        check_size(litlens.len(), NUM_LL)?;
        check_size(dists.len(), NUM_D)?;

        Ok(Self { litlens, dists, ..Default::default() })
    }

    /// Literal/length frequencies.
    pub fn litlens(&self) -> &[usize] {
        &self.litlens
    }

    /// Distance frequencies.
    pub fn dists(&self) -> &[usize] {
        &self.dists
    }

    pub fn litlens_mut(&mut self) -> &mut [usize] {
        &mut self.litlens
    }

    pub fn dists_mut(&mut self) -> &mut [usize] {
        &mut self.dists
    }

    /// Cost in bits of each literal/length symbol.
    pub fn ll_symbols(&self) -> &[f32] {
        &self.ll_symbols
    }

    /// Cost in bits of each distance symbol.
    pub fn d_symbols(&self) -> &[f32] {
        &self.d_symbols
    }

    /// Resets the frequencies; costs are kept until the next [`calculate`](Self::calculate).
    pub fn clear_freqs(&mut self) {
        self.litlens.fill(0);
        self.dists.fill(0);
    }

    /// Tallies a literal (`dist == 0`, `litlen` is the byte) or a length/distance pair.
    pub fn record(&mut self, litlen: usize, dist: usize) -> Result<()> {
        if dist == 0 {
            if litlen > u8::MAX as usize {
                return Err(Error::InvalidMatch { length: litlen, dist });
            }
            self.litlens[litlen] += 1;
            return Ok(());
        }

        match (length_symbol(litlen), dist_symbol(dist)) {
            (Some(ll), Some(d)) => {
                self.litlens[ll] += 1;
                self.dists[d] += 1;
                Ok(())
            }
            _ => Err(Error::InvalidMatch { length: litlen, dist }),
        }
    }

    /// Marks the end of a block, which always occurs exactly once.
    pub fn end_block(&mut self) {
        self.litlens[END_SYMBOL] = 1;
    }

    /// Recomputes both cost vectors from the current frequencies.
    pub fn calculate(&mut self) -> Result<()> {
        calculate_entropy_into(&self.litlens, &mut self.ll_symbols)?;
        calculate_entropy_into(&self.dists, &mut self.d_symbols)?;
        Ok(())
    }

    /// Frequencies of `a` scaled by `wa` plus those of `b` scaled by `wb`, truncated.
    ///
    /// Costs are left at zero; the end symbol is forced to a count of one.
    pub fn add_weighted(a: &SymbolStats, wa: f64, b: &SymbolStats, wb: f64) -> SymbolStats {
        let blend = |x: &[usize], y: &[usize]| -> Vec<usize> {
            x.iter().zip(y.iter()).map(|(&x, &y)| (x as f64 * wa + y as f64 * wb) as usize).collect()
        };

        let mut result = SymbolStats {
            litlens: blend(&a.litlens[..], &b.litlens[..]),
            dists: blend(&a.dists[..], &b.dists[..]),
            ..Default::default()
        };
        result.end_block();
        result
    }

    /// Perturbs the frequencies so an iterative search can escape a local optimum.
    pub fn randomize_freqs<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        randomize_counts(&mut self.litlens, &mut *rng);
        randomize_counts(&mut self.dists, rng);
        self.end_block();
        debug!("randomized symbol frequencies");
    }

    #[inline(always)]
    pub fn ll_cost(&self, symbol: usize) -> Result<f32> {
        self.ll_symbols.get(symbol).copied().ok_or(Error::UnknownSymbol { symbol })
    }

    #[inline(always)]
    pub fn d_cost(&self, symbol: usize) -> Result<f32> {
        self.d_symbols.get(symbol).copied().ok_or(Error::UnknownSymbol { symbol })
    }

    /// Cost of a literal (`dist == 0`) or of a length/distance pair, symbols only.
    pub fn cost(&self, litlen: usize, dist: usize) -> Result<f32> {
        if dist == 0 {
            if litlen > u8::MAX as usize {
                return Err(Error::InvalidMatch { length: litlen, dist });
            }
            return self.ll_cost(litlen);
        }

        match (length_symbol(litlen), dist_symbol(dist)) {
            (Some(ll), Some(d)) => Ok(self.ll_cost(ll)? + self.d_cost(d)?),
            _ => Err(Error::InvalidMatch { length: litlen, dist }),
        }
    }
}
