use crate::error::{Result, ShadowError};
use crate::gf251::Gf251;

/// One sub-share: the pair (m, d) = (f_i(j), g_i(j)) for a block i and
/// shadow index j
///
/// The positional tags (block index, shadow index) are carried alongside by
/// the engines rather than inside the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubShare {
    /// Evaluation of the block's first polynomial, f_i(j)
    pub m: u8,
    /// Evaluation of the block's second polynomial, g_i(j)
    pub d: u8,
}

impl SubShare {
    pub fn new(m: u8, d: u8) -> Self {
        Self { m, d }
    }
}

/// Number of least-significant bits used per carrier pixel byte
///
/// Smaller thresholds produce fewer sub-shares per pixel budget, so they can
/// afford a heavier 4-bit footprint; k >= 5 drops to 2 bits per pixel.
pub fn lsb_depth(k: u8) -> usize {
    if k < 5 { 4 } else { 2 }
}

/// Number of consecutive pixel bytes consumed by one (m, d) sub-share
///
/// m and d are 8 bits each, split into `16 / lsb` chunks.
pub fn parts_per_sub_share(k: u8) -> usize {
    16 / lsb_depth(k)
}

/// Embeds sub-shares into the low bits of a pixel buffer
///
/// Sub-share `s` occupies pixel bytes `[s*parts, (s+1)*parts)`. The first
/// half of the chunks carries `m` and the second half `d`, most-significant
/// chunk first. Only the low `lsb` bits of each target byte are touched; the
/// high bits keep their carrier value.
pub fn embed(pixels: &mut [u8], sub_shares: &[SubShare], k: u8) -> Result<()> {
    let lsb = lsb_depth(k);
    let parts = parts_per_sub_share(k);
    let mask = (1u8 << lsb) - 1;

    let needed = sub_shares.len() * parts;
    if pixels.len() < needed {
        return Err(ShadowError::InsufficientCapacity {
            needed,
            available: pixels.len(),
        });
    }

    for (s, sub_share) in sub_shares.iter().enumerate() {
        let value = (sub_share.m as u16) << 8 | sub_share.d as u16;
        for part in 0..parts {
            let shift = 16 - (part + 1) * lsb;
            let chunk = ((value >> shift) as u8) & mask;
            let pixel = &mut pixels[s * parts + part];
            *pixel = (*pixel & !mask) | chunk;
        }
    }

    Ok(())
}

/// Extracts sub-shares from the low bits of a pixel buffer
///
/// `pixel_count` is the logical width*height of the shadow; the number of
/// recovered sub-shares equals `pixel_count / (2k - 2)`, the block count of
/// the original secret as seen through this shadow's capacity. Extracted
/// values are normalized into the field range.
pub fn extract(pixels: &[u8], pixel_count: usize, k: u8) -> Result<Vec<SubShare>> {
    let lsb = lsb_depth(k);
    let parts = parts_per_sub_share(k);
    let mask = (1u8 << lsb) - 1;
    let block_size = 2 * k as usize - 2;

    let count = pixel_count / block_size;
    let needed = count * parts;
    if pixels.len() < needed {
        return Err(ShadowError::InsufficientCapacity {
            needed,
            available: pixels.len(),
        });
    }

    let mut sub_shares = Vec::with_capacity(count);
    for s in 0..count {
        let mut value: u16 = 0;
        for part in 0..parts {
            let chunk = pixels[s * parts + part] & mask;
            value = value << lsb | chunk as u16;
        }
        let m = Gf251::new((value >> 8) as u8).value();
        let d = Gf251::new(value as u8).value();
        sub_shares.push(SubShare::new(m, d));
    }

    Ok(sub_shares)
}
