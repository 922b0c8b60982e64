//! Error types for map construction and insertion.

use core::fmt;

/// Error returned when no free slot is reachable by the active insertion
/// policy. Contains the rejected key/value pair, allowing recovery.
///
/// This is capacity exhaustion, not bad input: the caller can rebuild into
/// a larger map and retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Full<T>(
    /// The payload that could not be inserted.
    pub T,
);

impl<T> Full<T> {
    /// Returns the payload that could not be inserted.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Display for Full<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "map is full")
    }
}

impl<T: fmt::Debug> std::error::Error for Full<T> {}

/// Error during map construction.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildError {
    /// Capacity is zero.
    ZeroCapacity,
    /// Capacity exceeds what the packed link words can index.
    CapacityOverflow {
        /// The requested capacity.
        capacity: usize,
        /// The largest supported capacity.
        max: usize,
    },
    /// Address factor outside `(0, 1]`.
    AddressFactorOutOfRange {
        /// The rejected factor.
        factor: f64,
    },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::ZeroCapacity => write!(f, "capacity cannot be zero"),
            BuildError::CapacityOverflow { capacity, max } => {
                write!(f, "capacity {capacity} exceeds supported maximum {max}")
            }
            BuildError::AddressFactorOutOfRange { factor } => {
                write!(f, "address factor {factor} outside (0, 1]")
            }
        }
    }
}

impl std::error::Error for BuildError {}
