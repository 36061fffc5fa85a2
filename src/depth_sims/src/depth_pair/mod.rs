use std::{
    fmt::{self, Display, Formatter},
    num::NonZeroU32,
    str::FromStr,
};

mod error;
pub use error::DepthPairError;

/// A normalized pair of bulk sequencing depths `(depth_a, depth_b)`.
/// 
/// This is both the unit of simulation work and the key used to join simulated bounds back onto records.
/// Both depths are strictly positive: degenerate observations are normalized through [`DepthPair::normalize`].
/// Ordering is lexicographic on `(depth_a, depth_b)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DepthPair {
    depth_a: NonZeroU32,
    depth_b: NonZeroU32,
}

impl DepthPair {
    #[must_use]
    pub fn new(depth_a: NonZeroU32, depth_b: NonZeroU32) -> Self {
        Self { depth_a, depth_b }
    }

    /// Normalize a pair of raw observed depths.
    /// 
    /// - `(a, b)` both non-zero: kept as is.
    /// - `(0, x)` or `(x, 0)`: the non-zero side is substituted for both depths, yielding `(x, x)`.
    /// - `(0, 0)`: returns `None`. Such a pair carries no information and is never simulated.
    #[must_use]
    pub fn normalize(depth_a: u32, depth_b: u32) -> Option<Self> {
        match (NonZeroU32::new(depth_a), NonZeroU32::new(depth_b)) {
            (Some(depth_a), Some(depth_b))            => Some(Self::new(depth_a, depth_b)),
            (Some(depth), None) | (None, Some(depth)) => Some(Self::new(depth, depth)),
            (None, None)                              => None,
        }
    }

    #[must_use]
    pub fn depth_a(&self) -> NonZeroU32 {
        self.depth_a
    }

    #[must_use]
    pub fn depth_b(&self) -> NonZeroU32 {
        self.depth_b
    }
}

impl Display for DepthPair {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.depth_a, self.depth_b)
    }
}

impl FromStr for DepthPair {
    type Err = DepthPairError;

    /// Parse a `<depthA>_<depthB>` key. Both depths must be strictly positive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use DepthPairError::{MissingSeparator, InvalidDepth, NullDepth};
        let (a, b) = s.split_once('_').ok_or_else(|| MissingSeparator(s.to_string()))?;

        let parse = |value: &str| value.parse::<u32>().map_err(|source| InvalidDepth{
            key: s.to_string(), value: value.to_string(), source
        });

        let (depth_a, depth_b) = (parse(a)?, parse(b)?);
        match (NonZeroU32::new(depth_a), NonZeroU32::new(depth_b)) {
            (Some(depth_a), Some(depth_b)) => Ok(Self::new(depth_a, depth_b)),
            _ => Err(NullDepth(s.to_string()))
        }
    }
}
