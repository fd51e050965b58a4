//! Error types for code assignment and cost estimation.

use thiserror::Error;

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A symbol was given a code length above the allowed maximum.
    #[error("symbol {symbol} has code length {length}, maximum is {max_bits}")]
    LengthExceedsMaxBits { symbol: usize, length: usize, max_bits: usize },

    /// The maximum code length does not fit in a `u32` code.
    #[error("maximum code length {max_bits} exceeds the supported {supported} bits")]
    MaxBitsTooLarge { max_bits: usize, supported: usize },

    /// An over-subscribed set of lengths produced a code that does not fit in `u32`.
    #[error("code for symbol {symbol} (length {length}) overflows 32 bits")]
    CodeOverflow { symbol: usize, length: usize },

    /// Input and output buffers are not aligned on the same alphabet.
    #[error("alphabet size mismatch: {input} inputs, {output} outputs")]
    LengthMismatch { input: usize, output: usize },

    /// Cost estimation needs at least one symbol.
    #[error("empty alphabet")]
    EmptyAlphabet,

    /// A count could not be represented as a 64-bit frequency.
    #[error("count of symbol {symbol} is not a valid frequency")]
    InvalidCount { symbol: usize },

    /// A computed cost is negative beyond the clamp epsilon, or not finite.
    #[error("invalid cost {cost} for symbol {symbol}")]
    InvalidCost { symbol: usize, cost: f32 },

    /// Scratch space could not be reserved.
    #[error("allocation failed: could not allocate {requested_bytes} bytes")]
    AllocationFailed { requested_bytes: usize },

    /// The symbol has no code in the table.
    #[error("symbol {symbol} has no code")]
    UnknownSymbol { symbol: usize },

    /// A length/distance pair outside the deflate ranges.
    #[error("invalid match: length {length}, distance {dist}")]
    InvalidMatch { length: usize, dist: usize },

    /// No symbol matched after reading the longest code.
    #[error("invalid code after {bits} bits")]
    InvalidCode { bits: usize },

    /// The bit reader ran past the end of its input.
    #[error("unexpected EOF after {bits_read} bits")]
    UnexpectedEof { bits_read: usize },

    /// A configuration value could not be parsed.
    #[error("invalid property {key}={value}")]
    InvalidProperty { key: String, value: String },

    /// The properties file itself could not be read.
    #[error("properties error: {0}")]
    Properties(#[from] java_properties::PropertiesError),

    /// I/O error from the underlying file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
