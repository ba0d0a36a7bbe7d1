use std::io;
use thiserror::Error;

/// Error type for secret image sharing operations
#[derive(Error, Debug)]
pub enum ShadowError {
    /// Threshold outside the supported range (must be 3 <= k <= 8)
    #[error("Invalid threshold {0}, must be between 3 and 8")]
    InvalidThreshold(u8),

    /// Invalid shadow count (shadow indices must be distinct nonzero field elements)
    #[error("Invalid shadow count {0}, must be between 1 and 250")]
    InvalidShadowCount(u8),

    /// Threshold exceeds total shadows
    #[error("Threshold {threshold} exceeds total shadows {total_shadows}")]
    ThresholdTooLarge { threshold: u8, total_shadows: u8 },

    /// Not enough carrier or shadow images for the requested operation
    #[error("Need at least {needed} shadows, got {got}")]
    InsufficientShadows { needed: usize, got: usize },

    /// Carrier pixel buffer too small to hold the embedded sub-shares
    #[error("Carrier needs {needed} pixel bytes, has {available}")]
    InsufficientCapacity { needed: usize, available: usize },

    /// Secret length is not a multiple of the block size 2k-2
    #[error("Secret length {len} is not a multiple of block size {block_size}")]
    BlockMisaligned { len: usize, block_size: usize },

    /// Multiplicative inverse of zero requested in GF(251)
    #[error("Division by zero in GF(251)")]
    DivisionByZero,

    /// Duplicate x-coordinate passed to interpolation
    #[error("Duplicate x value {0} in interpolation points")]
    DuplicateXValue(u8),

    /// The interpolation system has no unique solution
    #[error("Interpolation system has no unique solution")]
    SingularSystem,

    /// The authentication relation failed for a block during reconstruction
    #[error("Forged or corrupted share detected at block {block}")]
    ForgedShare { block: usize },

    /// Shadows with mismatched dimensions cannot be combined
    #[error("Shadow dimensions {got_width}x{got_height} do not match {width}x{height}")]
    DimensionMismatch {
        width: u32,
        height: u32,
        got_width: u32,
        got_height: u32,
    },

    /// Shadows disagree on how many sub-shares they carry
    #[error("Shadows disagree on sub-share count")]
    InconsistentSubShareCount,

    /// Malformed or unrecognized image file
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// Only 8-bit-per-pixel images are supported
    #[error("Unsupported bit depth {0}, must be 8 bits per pixel")]
    UnsupportedBitDepth(u16),

    /// General I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, ShadowError>;
