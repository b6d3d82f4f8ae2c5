//! Error types for map generation and city growth.
//!
//! Fallible operations return [`GenerationError`] through the crate-wide
//! [`Result`] alias. Out-of-bounds grid access is not represented here: it is
//! a programming error and panics inside [`crate::tilemap::Tilemap`].

/// Errors that can occur while generating a map or growing its city.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The requested map size is too small to hold a river and a city, or
    /// too large for signed tile coordinates.
    #[error("invalid map size {size} (supported range is {min}..={max})")]
    InvalidMapSize {
        /// Requested edge length.
        size: usize,
        /// Smallest supported edge length.
        min: usize,
        /// Largest supported edge length.
        max: usize,
    },

    /// No acceptable river start tile was found on the expanded border.
    #[error("no river start tile found after {attempts} attempts")]
    RiverSeedNotFound {
        /// Number of candidates drawn before giving up.
        attempts: usize,
    },

    /// The placement search ran out of candidates. Not fatal: the growth
    /// engine turns it into an expansion band increment.
    #[error("block placement exhausted in band {band} after {candidates} candidates")]
    BlockPlacementExhausted {
        /// Expansion band the search was limited to.
        band: u32,
        /// Candidates examined.
        candidates: usize,
    },

    /// A configuration value is out of its supported range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Reading a config file or writing an export failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON config or export could not be (de)serialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// PNG export failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

impl GenerationError {
    /// True for conditions the growth engine recovers from locally.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, GenerationError::BlockPlacementExhausted { .. })
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, GenerationError>;
