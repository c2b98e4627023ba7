use crate::Error;
use rand::Rng;

/// Policy for the content of filler bytes.
///
/// Alignment gaps, fixed-length string tails, and the trailing pad-to-target
/// blocks all emit filler; this controls what lands in those bytes. The games
/// never read them back, so any content round-trips, but a byte-exact
/// comparison against a real file needs the policy that produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PaddingMode {
    /// Every filler byte is zero
    #[default]
    Zeros,

    /// Non-deterministic filler, as some console builds emit
    Random,

    /// A caller-supplied pattern tiled across the gap: `filler[i % len]`
    Sequence(Vec<u8>),
}

impl PaddingMode {
    /// Append `len` filler bytes to `out`.
    ///
    /// An empty `Sequence` pattern is rejected: there is no byte to tile.
    pub(crate) fn fill(&self, out: &mut Vec<u8>, len: usize) -> Result<(), Error> {
        match self {
            PaddingMode::Zeros => out.resize(out.len() + len, 0),
            PaddingMode::Random => {
                let mut rng = rand::thread_rng();
                out.extend((0..len).map(|_| rng.gen::<u8>()));
            }
            PaddingMode::Sequence(pattern) => {
                if pattern.is_empty() {
                    return Err(Error::invalid("padding sequence must not be empty"));
                }
                out.extend((0..len).map(|i| pattern[i % pattern.len()]));
            }
        }
        Ok(())
    }
}

/// Validate an alignment word size: nonzero power of two
pub(crate) fn check_word_size(word: usize) -> Result<(), Error> {
    if word.is_power_of_two() {
        Ok(())
    } else {
        Err(Error::invalid(format!(
            "alignment word size must be a power of two, got {}",
            word
        )))
    }
}
