use std::{collections::HashMap, fs::File, io::BufReader, path::Path, str::FromStr};

use rand::{rngs::StdRng, SeedableRng};

use crate::{error::{Error, Result}, huffman::DEFLATE_MAX_BITS};

/// Settings read from a `.properties` file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoderProperties {
    /// Maximum code length handed to the code assigner.
    pub max_bits: usize,
    /// Seed of the frequency randomization of the cost model.
    pub seed: u64,
}

impl Default for CoderProperties {
    fn default() -> Self {
        Self {
            max_bits: DEFLATE_MAX_BITS,
            seed: 0,
        }
    }
}

fn parse<T: FromStr>(props: &HashMap<String, String>, key: &str, default: T) -> Result<T> {
    match props.get(key) {
        Some(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map_err(|_| Error::InvalidProperty { key: key.to_string(), value: value.clone() }),
        _ => Ok(default),
    }
}

impl CoderProperties {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let props = java_properties::read(BufReader::new(file))?;
        Self::try_from(props)
    }

    /// Generator for the frequency randomization, reproducible from `seed`.
    pub fn rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.seed)
    }
}

impl TryFrom<HashMap<String, String>> for CoderProperties {
    type Error = Error;

    fn try_from(value: HashMap<String, String>) -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            max_bits: parse(&value, "maxbits", defaults.max_bits)?,
            seed: parse(&value, "seed", defaults.seed)?,
        })
    }
}

impl From<CoderProperties> for String {
    fn from(val: CoderProperties) -> Self {
        let mut s = String::new();

        s.push_str("#huffcost properties\n");
        s.push_str(&format!("maxbits={}\n", val.max_bits));
        s.push_str(&format!("seed={}\n", val.seed));

        s
    }
}
