pub mod bitstreams;
pub mod entropy;
pub mod error;
pub mod huffman;
pub mod properties;
pub mod stats;

pub use entropy::{calculate_entropy, calculate_entropy_into, total_cost};
pub use error::{Error, Result};
pub use huffman::{lengths_to_symbols, lengths_to_symbols_into, CodeTable};
pub use stats::SymbolStats;
