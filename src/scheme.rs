use rand::rngs::OsRng;
use rand_chacha::ChaCha20Rng;
use rand_chacha::rand_core::RngCore;
use rand_core::SeedableRng;
use rayon::prelude::*;

use crate::bmp::ShadowImage;
use crate::error::{Result, ShadowError};
use crate::gf251::Gf251;
use crate::polynomial::Polynomial;
use crate::stego::{self, SubShare};

/// The supported threshold range; the steganographic bit depth is defined
/// only for these values
pub const MIN_THRESHOLD: u8 = 3;
pub const MAX_THRESHOLD: u8 = 8;

/// A (k,n)-threshold secret image sharing scheme
///
/// A secret's pixel bytes are cut into blocks of `2k-2` bytes. Each block
/// yields two degree-(k-1) polynomials over GF(251): `f` built from the first
/// k bytes and `g` from the remaining `k-2` bytes plus two authentication
/// coefficients tied to `f` through a per-block secret randomizer. Evaluating
/// both at x = 1..n produces one (m, d) sub-share per block per shadow; any k
/// shadows recover both polynomials per block by interpolation, and the
/// randomizer relation exposes tampered shares before any output is produced.
///
/// # Example
/// ```
/// use shadow_share::ShadowShare;
///
/// let mut scheme = ShadowShare::builder(5, 3).build().unwrap();
/// let secret = [10u8, 20, 30, 40];
/// let groups = scheme.split(&secret).unwrap();
/// assert_eq!(groups.len(), 5);
///
/// let tagged: Vec<(u8, Vec<_>)> = (1..=3).map(|j| (j, groups[j as usize - 1].clone())).collect();
/// let recovered = ShadowShare::reconstruct_sub_shares(&tagged, 3).unwrap();
/// assert_eq!(recovered, secret);
/// ```
pub struct ShadowShare {
    /// Total number of shadows to generate (n)
    total_shadows: u8,
    /// Minimum number of shadows needed for reconstruction (k)
    threshold: u8,
    /// Source of the per-block authentication randomizers
    rng: ChaCha20Rng,
}

/// Builder for [`ShadowShare`] instances
#[derive(Debug)]
pub struct ShadowShareBuilder {
    total_shadows: u8,
    threshold: u8,
}

impl ShadowShareBuilder {
    pub fn new(total_shadows: u8, threshold: u8) -> Self {
        Self {
            total_shadows,
            threshold,
        }
    }

    /// Validates the parameters and builds the scheme
    ///
    /// # Errors
    /// - `InvalidThreshold` unless 3 <= k <= 8
    /// - `InvalidShadowCount` unless 1 <= n <= 250 (shadow indices are
    ///   nonzero field elements)
    /// - `ThresholdTooLarge` if k > n
    pub fn build(self) -> Result<ShadowShare> {
        if !(MIN_THRESHOLD..=MAX_THRESHOLD).contains(&self.threshold) {
            return Err(ShadowError::InvalidThreshold(self.threshold));
        }
        if self.total_shadows == 0 || self.total_shadows as u16 > 250 {
            return Err(ShadowError::InvalidShadowCount(self.total_shadows));
        }
        if self.threshold > self.total_shadows {
            return Err(ShadowError::ThresholdTooLarge {
                threshold: self.threshold,
                total_shadows: self.total_shadows,
            });
        }

        Ok(ShadowShare {
            total_shadows: self.total_shadows,
            threshold: self.threshold,
            rng: ChaCha20Rng::try_from_rng(&mut OsRng).unwrap(),
        })
    }
}

/// The second coefficient of the authentication pair: the `b` with
/// `a * r + b = 0` in GF(251), in closed form
fn authentication_coefficient(a: Gf251, r: Gf251) -> Gf251 {
    (a * r).negate()
}

/// Checks whether some randomizer r in [1,250] ties the two interpolated
/// polynomials together the way splitting did
fn authentication_holds(f: &Polynomial, g: &Polynomial) -> bool {
    let zero = Gf251::new(0);
    (1..=250u8).any(|r| {
        let r = Gf251::new(r);
        f.coefficient(0) * r + g.coefficient(0) == zero
            && f.coefficient(1) * r + g.coefficient(1) == zero
    })
}

impl ShadowShare {
    /// Creates a builder for a scheme with `total_shadows` shadows and
    /// reconstruction threshold `threshold`
    pub fn builder(total_shadows: u8, threshold: u8) -> ShadowShareBuilder {
        ShadowShareBuilder::new(total_shadows, threshold)
    }

    /// Block size in bytes: each block feeds one polynomial pair
    pub fn block_size(&self) -> usize {
        2 * self.threshold as usize - 2
    }

    /// Splits a secret byte sequence into n ordered sub-share groups
    ///
    /// The outer index is the shadow index minus one; each inner vector is
    /// ordered by block index. The secret length must be a multiple of the
    /// block size `2k-2`; an empty secret yields n empty groups.
    ///
    /// # Errors
    /// `BlockMisaligned` if the length is not a multiple of `2k-2`.
    pub fn split(&mut self, secret: &[u8]) -> Result<Vec<Vec<SubShare>>> {
        let k = self.threshold as usize;
        let block_size = self.block_size();
        if secret.len() % block_size != 0 {
            return Err(ShadowError::BlockMisaligned {
                len: secret.len(),
                block_size,
            });
        }

        // One fresh randomizer per block; never transmitted, only its
        // algebraic trace in g's first two coefficients survives.
        let pairs: Vec<(Polynomial, Polynomial)> = secret
            .chunks_exact(block_size)
            .map(|block| {
                let ri = Gf251::new((self.rng.next_u32() % 250 + 1) as u8);
                let f = Polynomial::from_bytes(&block[..k]);

                let mut g_coeffs = Vec::with_capacity(k);
                g_coeffs.push(authentication_coefficient(f.coefficient(0), ri));
                g_coeffs.push(authentication_coefficient(f.coefficient(1), ri));
                g_coeffs.extend(block[k..].iter().map(|&b| Gf251::new(b)));
                (f, Polynomial::new(g_coeffs))
            })
            .collect();

        // Per-shadow evaluation has no cross-shadow dependency
        let x_values: Vec<Gf251> = (1..=self.total_shadows).map(Gf251::new).collect();
        let groups: Vec<Vec<SubShare>> = x_values
            .into_par_iter()
            .map(|x| {
                pairs
                    .iter()
                    .map(|(f, g)| SubShare::new(f.evaluate(x).value(), g.evaluate(x).value()))
                    .collect()
            })
            .collect();

        Ok(groups)
    }

    /// Splits the secret and embeds each sub-share group into a carrier,
    /// producing the n stego shadows
    ///
    /// Carriers are consumed; the returned images own the mutated pixel
    /// buffers and carry their 1-based shadow index in the header. Carriers
    /// beyond the first n are left unused and dropped.
    ///
    /// # Errors
    /// - `InsufficientShadows` if fewer than n carriers are supplied
    /// - `InsufficientCapacity` if a carrier cannot hold all sub-shares
    pub fn distribute(
        &mut self,
        secret: &[u8],
        carriers: Vec<ShadowImage>,
    ) -> Result<Vec<ShadowImage>> {
        if carriers.len() < self.total_shadows as usize {
            return Err(ShadowError::InsufficientShadows {
                needed: self.total_shadows as usize,
                got: carriers.len(),
            });
        }

        let groups = self.split(secret)?;
        let k = self.threshold;

        carriers
            .into_iter()
            .zip(groups)
            .enumerate()
            .map(|(i, (mut carrier, group))| {
                stego::embed(&mut carrier.pixels, &group, k)?;
                carrier.set_shadow_index(i as u16 + 1);
                Ok(carrier)
            })
            .collect()
    }

    /// Reconstructs the secret bytes from k stego shadows
    ///
    /// The shadows must agree on dimensions and carry pairwise distinct
    /// shadow indices; only the first k supplied are used. Fails before any
    /// interpolation when fewer than k are given, and fails all-or-nothing
    /// with [`ShadowError::ForgedShare`] when any block's authentication
    /// relation cannot be satisfied.
    pub fn reconstruct(shadows: &[ShadowImage], threshold: u8) -> Result<Vec<u8>> {
        if !(MIN_THRESHOLD..=MAX_THRESHOLD).contains(&threshold) {
            return Err(ShadowError::InvalidThreshold(threshold));
        }
        if shadows.len() < threshold as usize {
            return Err(ShadowError::InsufficientShadows {
                needed: threshold as usize,
                got: shadows.len(),
            });
        }

        let shadows = &shadows[..threshold as usize];
        let first = &shadows[0];
        for shadow in &shadows[1..] {
            if shadow.width != first.width || shadow.height != first.height {
                return Err(ShadowError::DimensionMismatch {
                    width: first.width,
                    height: first.height,
                    got_width: shadow.width,
                    got_height: shadow.height,
                });
            }
        }

        let tagged: Vec<(u8, Vec<SubShare>)> = shadows
            .iter()
            .map(|shadow| {
                let index = shadow.shadow_index;
                if index == 0 || index > 250 {
                    return Err(ShadowError::InvalidImage(format!(
                        "shadow index {index} out of range"
                    )));
                }
                let sub_shares = stego::extract(&shadow.pixels, shadow.pixel_count(), threshold)?;
                Ok((index as u8, sub_shares))
            })
            .collect::<Result<_>>()?;

        Self::reconstruct_sub_shares(&tagged, threshold)
    }

    /// Reconstructs the secret bytes from already-extracted sub-share groups
    ///
    /// Each entry pairs a shadow index with that shadow's block-ordered
    /// sub-shares. Per block, `f` is interpolated from the (index, m) points
    /// and `g` from the (index, d) points; the block contributes `f`'s full
    /// coefficients followed by `g`'s from index 2 on (the first two are
    /// authentication artifacts, not secret bytes).
    pub fn reconstruct_sub_shares(
        tagged: &[(u8, Vec<SubShare>)],
        threshold: u8,
    ) -> Result<Vec<u8>> {
        if !(MIN_THRESHOLD..=MAX_THRESHOLD).contains(&threshold) {
            return Err(ShadowError::InvalidThreshold(threshold));
        }
        if tagged.len() < threshold as usize {
            return Err(ShadowError::InsufficientShadows {
                needed: threshold as usize,
                got: tagged.len(),
            });
        }

        let tagged = &tagged[..threshold as usize];
        for i in 0..tagged.len() {
            for j in (i + 1)..tagged.len() {
                if tagged[i].0 == tagged[j].0 {
                    return Err(ShadowError::DuplicateXValue(tagged[i].0));
                }
            }
        }

        let block_count = tagged[0].1.len();
        if tagged.iter().any(|(_, group)| group.len() != block_count) {
            return Err(ShadowError::InconsistentSubShareCount);
        }

        // Each block's interpolation and authentication touches only its own
        // sub-shares
        let blocks: Vec<Vec<u8>> = (0..block_count)
            .into_par_iter()
            .map(|i| {
                let m_points: Vec<(Gf251, Gf251)> = tagged
                    .iter()
                    .map(|&(j, ref group)| (Gf251::new(j), Gf251::new(group[i].m)))
                    .collect();
                let d_points: Vec<(Gf251, Gf251)> = tagged
                    .iter()
                    .map(|&(j, ref group)| (Gf251::new(j), Gf251::new(group[i].d)))
                    .collect();

                let f = Polynomial::interpolate(&m_points)?;
                let g = Polynomial::interpolate(&d_points)?;

                if !authentication_holds(&f, &g) {
                    return Err(ShadowError::ForgedShare { block: i });
                }

                let mut bytes = Vec::with_capacity(2 * threshold as usize - 2);
                bytes.extend(f.coefficients().iter().map(|c| c.value()));
                bytes.extend(g.coefficients()[2..].iter().map(|c| c.value()));
                Ok(bytes)
            })
            .collect::<Result<_>>()?;

        Ok(blocks.concat())
    }
}
