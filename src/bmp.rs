use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{Result, ShadowError};

const SIGNATURE: &[u8] = b"BM";
const SHADOW_INDEX_OFFSET: usize = 6; // bfReserved1, repurposed for the shadow index
const PIXEL_OFFSET_FIELD: usize = 10;
const WIDTH_FIELD: usize = 18;
const HEIGHT_FIELD: usize = 22;
const BPP_FIELD: usize = 28;
const IMAGE_SIZE_FIELD: usize = 34;
const INFO_HEADER_LEN: usize = 54;

/// An uncompressed 8-bit BMP acting as a secret, carrier, or stego shadow
///
/// The raw header (everything before the pixel array, palette included) is
/// preserved verbatim so that writing a shadow back produces a byte-exact
/// container apart from the stamped shadow index and the pixel low bits.
#[derive(Debug, Clone)]
pub struct ShadowImage {
    pub width: u32,
    pub height: u32,
    /// 1-based shadow index stored in the header's reserved field; 0 for
    /// images that have not been through distribution
    pub shadow_index: u16,
    pub bits_per_pixel: u16,
    pub pixels: Vec<u8>,
    header: Vec<u8>,
}

fn read_le16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn read_le32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

impl ShadowImage {
    /// Reads and validates an 8-bit BMP file
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;

        if bytes.len() < INFO_HEADER_LEN || &bytes[0..2] != SIGNATURE {
            return Err(ShadowError::InvalidImage(format!(
                "{} is not a valid BMP file",
                path.display()
            )));
        }

        let pixel_offset = read_le32(&bytes, PIXEL_OFFSET_FIELD) as usize;
        if pixel_offset < INFO_HEADER_LEN || pixel_offset > bytes.len() {
            return Err(ShadowError::InvalidImage(format!(
                "{} has a corrupt pixel array offset",
                path.display()
            )));
        }

        let width = read_le32(&bytes, WIDTH_FIELD);
        let height = read_le32(&bytes, HEIGHT_FIELD);
        let bits_per_pixel = read_le16(&bytes, BPP_FIELD);
        let shadow_index = read_le16(&bytes, SHADOW_INDEX_OFFSET);

        if bits_per_pixel != 8 {
            return Err(ShadowError::UnsupportedBitDepth(bits_per_pixel));
        }

        let image_size = read_le32(&bytes, IMAGE_SIZE_FIELD) as usize;
        let pixel_end = if image_size == 0 {
            bytes.len()
        } else {
            (pixel_offset + image_size).min(bytes.len())
        };

        Ok(Self {
            width,
            height,
            shadow_index,
            bits_per_pixel,
            pixels: bytes[pixel_offset..pixel_end].to_vec(),
            header: bytes[..pixel_offset].to_vec(),
        })
    }

    /// Builds an image from bare pixels under a freshly generated grayscale
    /// 8-bit header
    ///
    /// `pixels` must hold at least `width * height` bytes.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        const PALETTE_LEN: usize = 256 * 4;
        let pixel_offset = (INFO_HEADER_LEN + PALETTE_LEN) as u32;
        let file_size = pixel_offset + pixels.len() as u32;

        let mut header = Vec::with_capacity(pixel_offset as usize);
        header.extend_from_slice(SIGNATURE);
        header.extend_from_slice(&file_size.to_le_bytes());
        header.extend_from_slice(&[0u8; 4]); // reserved fields, shadow index not yet set
        header.extend_from_slice(&pixel_offset.to_le_bytes());
        header.extend_from_slice(&40u32.to_le_bytes()); // BITMAPINFOHEADER
        header.extend_from_slice(&width.to_le_bytes());
        header.extend_from_slice(&height.to_le_bytes());
        header.extend_from_slice(&1u16.to_le_bytes()); // planes
        header.extend_from_slice(&8u16.to_le_bytes());
        header.extend_from_slice(&0u32.to_le_bytes()); // BI_RGB
        header.extend_from_slice(&(pixels.len() as u32).to_le_bytes());
        header.extend_from_slice(&0u32.to_le_bytes()); // x pixels per meter
        header.extend_from_slice(&0u32.to_le_bytes()); // y pixels per meter
        header.extend_from_slice(&256u32.to_le_bytes());
        header.extend_from_slice(&0u32.to_le_bytes());
        for v in 0..=255u8 {
            header.extend_from_slice(&[v, v, v, 0]);
        }

        Self {
            width,
            height,
            shadow_index: 0,
            bits_per_pixel: 8,
            pixels,
            header,
        }
    }

    /// Writes the image back out as header bytes followed by the pixel array
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(&self.header)?;
        writer.write_all(&self.pixels)?;
        writer.flush()?;
        Ok(())
    }

    /// Stamps the 1-based shadow index into the header's reserved field
    pub fn set_shadow_index(&mut self, index: u16) {
        self.header[SHADOW_INDEX_OFFSET..SHADOW_INDEX_OFFSET + 2]
            .copy_from_slice(&index.to_le_bytes());
        self.shadow_index = index;
    }

    /// Logical pixel count, the unit of steganographic capacity
    ///
    /// The raw buffer may carry BMP row padding beyond this; embedding and
    /// extraction both address the buffer linearly, so positions agree.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Scans `dir` for BMP files and returns the first set of `count` images
/// agreeing pairwise on width and height
///
/// Files are visited in name order so the selection is deterministic. Fails
/// with [`ShadowError::InsufficientShadows`] when no dimension group reaches
/// `count` members.
pub fn find_shadow_group<P: AsRef<Path>>(dir: P, count: usize) -> Result<Vec<ShadowImage>> {
    let mut groups: HashMap<(u32, u32), Vec<ShadowImage>> = HashMap::new();
    let mut largest = 0;

    for path in bmp_paths(dir.as_ref())? {
        let image = ShadowImage::read(&path)?;
        let key = (image.width, image.height);
        let group = groups.entry(key).or_default();
        group.push(image);
        largest = largest.max(group.len());
        if group.len() == count {
            return Ok(groups.remove(&key).unwrap());
        }
    }

    Err(ShadowError::InsufficientShadows {
        needed: count,
        got: largest,
    })
}

/// Loads every BMP in `dir` whose dimensions match (`width`, `height`),
/// in name order
pub fn find_matching_carriers<P: AsRef<Path>>(
    dir: P,
    width: u32,
    height: u32,
) -> Result<Vec<ShadowImage>> {
    let mut carriers = Vec::new();
    for path in bmp_paths(dir.as_ref())? {
        let image = ShadowImage::read(&path)?;
        if image.width == width && image.height == height {
            carriers.push(image);
        }
    }
    Ok(carriers)
}

/// BMP file paths under `dir`, sorted by name
pub fn bmp_paths(dir: &Path) -> Result<Vec<std::path::PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_bmp = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("bmp"));
        if is_bmp {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_read_write_roundtrip() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("image.bmp");

        let pixels: Vec<u8> = (0..24u8).collect();
        let image = ShadowImage::from_pixels(6, 4, pixels.clone());
        image.write(&path)?;

        let loaded = ShadowImage::read(&path)?;
        assert_eq!(loaded.width, 6);
        assert_eq!(loaded.height, 4);
        assert_eq!(loaded.bits_per_pixel, 8);
        assert_eq!(loaded.shadow_index, 0);
        assert_eq!(loaded.pixels, pixels);
        Ok(())
    }

    #[test]
    fn test_shadow_index_stamping() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("shadow.bmp");

        let mut image = ShadowImage::from_pixels(4, 4, vec![0u8; 16]);
        image.set_shadow_index(3);
        assert_eq!(image.shadow_index, 3);
        image.write(&path)?;

        let loaded = ShadowImage::read(&path)?;
        assert_eq!(loaded.shadow_index, 3);
        Ok(())
    }

    #[test]
    fn test_rejects_bad_signature() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("bogus.bmp");
        fs::write(&path, vec![0u8; 100])?;

        assert!(matches!(
            ShadowImage::read(&path),
            Err(ShadowError::InvalidImage(_))
        ));
        Ok(())
    }

    #[test]
    fn test_rejects_wrong_bit_depth() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("deep.bmp");

        let image = ShadowImage::from_pixels(4, 4, vec![0u8; 16]);
        image.write(&path)?;

        // Flip the bits-per-pixel field to 24
        let mut bytes = fs::read(&path)?;
        bytes[BPP_FIELD..BPP_FIELD + 2].copy_from_slice(&24u16.to_le_bytes());
        fs::write(&path, bytes)?;

        assert!(matches!(
            ShadowImage::read(&path),
            Err(ShadowError::UnsupportedBitDepth(24))
        ));
        Ok(())
    }

    #[test]
    fn test_find_shadow_group() -> Result<()> {
        let dir = tempdir()?;
        for (name, w, h) in [
            ("a.bmp", 4u32, 4u32),
            ("b.bmp", 8, 8),
            ("c.bmp", 4, 4),
            ("d.bmp", 4, 4),
        ] {
            ShadowImage::from_pixels(w, h, vec![0u8; (w * h) as usize])
                .write(dir.path().join(name))?;
        }

        let group = find_shadow_group(dir.path(), 3)?;
        assert_eq!(group.len(), 3);
        assert!(group.iter().all(|i| i.width == 4 && i.height == 4));
        Ok(())
    }

    #[test]
    fn test_find_shadow_group_too_few() -> Result<()> {
        let dir = tempdir()?;
        for (name, w) in [("a.bmp", 4u32), ("b.bmp", 8)] {
            ShadowImage::from_pixels(w, 4, vec![0u8; (w * 4) as usize])
                .write(dir.path().join(name))?;
        }

        assert!(matches!(
            find_shadow_group(dir.path(), 3),
            Err(ShadowError::InsufficientShadows { needed: 3, got: 1 })
        ));
        Ok(())
    }

    #[test]
    fn test_find_shadow_group_missing_dir() {
        let result = find_shadow_group("/nonexistent/shadow/dir", 3);
        assert!(matches!(result, Err(ShadowError::Io(_))));
    }

    #[test]
    fn test_find_matching_carriers() -> Result<()> {
        let dir = tempdir()?;
        for (name, w) in [("a.bmp", 6u32), ("b.bmp", 4), ("c.bmp", 6)] {
            ShadowImage::from_pixels(w, 2, vec![0u8; (w * 2) as usize])
                .write(dir.path().join(name))?;
        }

        let carriers = find_matching_carriers(dir.path(), 6, 2)?;
        assert_eq!(carriers.len(), 2);
        Ok(())
    }
}
