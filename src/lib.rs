//! A Rust library for (k,n)-threshold secret image sharing with
//! steganographic shadows
//!
//! A secret image's pixel bytes are split into n innocuous-looking carrier
//! images ("shadows") such that any k of them reconstruct the secret exactly,
//! while fewer than k reveal nothing. Each block of the secret is tied to a
//! never-transmitted random scalar whose algebraic trace lets reconstruction
//! detect forged or corrupted shadows instead of silently emitting garbage.
//!
//! All share arithmetic happens in GF(251), the prime field just below the
//! byte range; shares travel inside the least-significant bits of ordinary
//! 8-bit BMP carrier pixels.
//!
//! # Quick Start
//!
//! ```
//! use shadow_share::{ShadowImage, ShadowShare};
//!
//! // A (3,5) scheme: 5 shadows, any 3 reconstruct
//! let mut scheme = ShadowShare::builder(5, 3).build().unwrap();
//!
//! // The secret: one 4-byte block (block size is 2k-2)
//! let secret = [10u8, 20, 30, 40];
//!
//! // Five carrier images with room for the embedded sub-shares
//! let carriers: Vec<ShadowImage> = (0..5)
//!     .map(|i| ShadowImage::from_pixels(2, 2, vec![0x80 + i; 4]))
//!     .collect();
//!
//! let shadows = scheme.distribute(&secret, carriers).unwrap();
//!
//! // Any 3 shadows recover the secret
//! let recovered = ShadowShare::reconstruct(&shadows[1..4], 3).unwrap();
//! assert_eq!(recovered, secret);
//! ```

mod bmp;
mod error;
mod gf251;
mod polynomial;
mod scheme;
mod stego;

pub use bmp::{ShadowImage, bmp_paths, find_matching_carriers, find_shadow_group};
pub use error::{Result, ShadowError};
pub use gf251::{Gf251, PRIME};
pub use polynomial::Polynomial;
pub use scheme::{MAX_THRESHOLD, MIN_THRESHOLD, ShadowShare, ShadowShareBuilder};
pub use stego::{SubShare, lsb_depth, parts_per_sub_share};

// Re-export common types for convenience
pub mod prelude {
    pub use super::{Result, ShadowError, ShadowImage, ShadowShare, SubShare};
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn noise_pixels(len: usize, seed: u8) -> Vec<u8> {
        (0..len)
            .map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed))
            .collect()
    }

    #[test]
    fn test_full_workflow_via_filesystem() -> Result<()> {
        let temp_dir = tempdir()?;
        let dir = temp_dir.path();

        // 6x4 secret, 24 bytes = six blocks of 4 for k=3
        let secret_pixels: Vec<u8> = (0..24u8).map(|i| i.wrapping_mul(10) % 251).collect();
        let secret = ShadowImage::from_pixels(6, 4, secret_pixels.clone());
        secret.write(dir.join("secret.bmp"))?;

        // Five same-sized carriers on disk, in their own directory
        let carrier_dir = dir.join("carriers");
        std::fs::create_dir(&carrier_dir)?;
        for i in 0..5u8 {
            let carrier = ShadowImage::from_pixels(6, 4, noise_pixels(24, i));
            carrier.write(carrier_dir.join(format!("carrier_{i}.bmp")))?;
        }

        let shadow_dir = dir.join("shadows");
        std::fs::create_dir(&shadow_dir)?;

        // Distribute across the discovered carriers
        let carriers = find_matching_carriers(&carrier_dir, 6, 4)?;
        let mut scheme = ShadowShare::builder(carriers.len() as u8, 3).build()?;
        let shadows = scheme.distribute(&secret_pixels, carriers)?;
        for (i, shadow) in shadows.iter().enumerate() {
            shadow.write(shadow_dir.join(format!("shadow_{i}.bmp")))?;
        }

        // Recover from any 3 shadows found on disk
        let found = find_shadow_group(&shadow_dir, 3)?;
        let recovered = ShadowShare::reconstruct(&found, 3)?;
        assert_eq!(recovered, secret_pixels);

        Ok(())
    }

    #[test]
    fn test_distribute_requires_enough_carriers() {
        let mut scheme = ShadowShare::builder(5, 3).build().unwrap();
        let carriers: Vec<ShadowImage> = (0..4)
            .map(|i| ShadowImage::from_pixels(2, 2, noise_pixels(4, i)))
            .collect();

        assert!(matches!(
            scheme.distribute(&[1, 2, 3, 4], carriers),
            Err(ShadowError::InsufficientShadows { needed: 5, got: 4 })
        ));
    }

    #[test]
    fn test_reconstruct_rejects_mismatched_dimensions() {
        let mut scheme = ShadowShare::builder(3, 3).build().unwrap();
        let carriers = vec![
            ShadowImage::from_pixels(2, 2, noise_pixels(4, 0)),
            ShadowImage::from_pixels(2, 2, noise_pixels(4, 1)),
            ShadowImage::from_pixels(2, 2, noise_pixels(4, 2)),
        ];
        let mut shadows = scheme.distribute(&[1, 2, 3, 4], carriers).unwrap();
        shadows[2] = ShadowImage::from_pixels(4, 1, noise_pixels(4, 3));
        shadows[2].set_shadow_index(3);

        assert!(matches!(
            ShadowShare::reconstruct(&shadows, 3),
            Err(ShadowError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_tampered_shadow_pixels_detected() {
        let mut scheme = ShadowShare::builder(5, 3).build().unwrap();
        let secret: Vec<u8> = (0..16).collect();
        let carriers: Vec<ShadowImage> = (0..5)
            .map(|i| ShadowImage::from_pixels(4, 4, noise_pixels(16, i)))
            .collect();
        let mut shadows = scheme.distribute(&secret, carriers).unwrap();

        // Flip a low bit inside an embedded sub-share
        shadows[1].pixels[0] ^= 0x01;

        assert!(matches!(
            ShadowShare::reconstruct(&shadows[0..3], 3),
            Err(ShadowError::ForgedShare { .. })
        ));
    }
}
