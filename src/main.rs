use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};

use shadow_share::{ShadowImage, ShadowShare, bmp_paths, find_shadow_group};

#[derive(Parser)]
#[command(
    name = "shadow_share",
    about = "Secret image sharing over steganographic BMP shadows"
)]
struct Cli {
    /// Operation to perform
    #[arg(value_enum)]
    operation: Operation,

    /// Secret image to split, or output path for the recovered image
    file: PathBuf,

    /// Threshold k of the (k,n) scheme
    #[arg(value_parser = clap::value_parser!(u8).range(3..=8))]
    k: u8,

    /// Directory holding the carrier or shadow images
    directory: PathBuf,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Operation {
    /// Split a secret image into stego shadows ('d' for distribute)
    #[value(alias = "d")]
    Split,
    /// Recover the secret image from stego shadows
    #[value(alias = "r")]
    Recover,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.operation {
        Operation::Split => split(&cli.file, cli.k, &cli.directory),
        Operation::Recover => recover(&cli.file, cli.k, &cli.directory),
    }
}

/// Splits the secret at `file` across every dimension-matched carrier in
/// `directory`, overwriting each carrier in place with its stego shadow
fn split(file: &Path, k: u8, directory: &Path) -> Result<()> {
    let secret = ShadowImage::read(file)
        .with_context(|| format!("failed to read secret image {}", file.display()))?;

    // Carriers must match the secret's dimensions so that extraction later
    // yields exactly the original block count
    let mut carrier_paths = Vec::new();
    let mut carriers = Vec::new();
    for path in bmp_paths(directory)? {
        if path.as_path() == file {
            continue;
        }
        let image = ShadowImage::read(&path)?;
        if image.width == secret.width && image.height == secret.height {
            carrier_paths.push(path);
            carriers.push(image);
        }
    }

    // Shadow indices are nonzero field elements, so at most 250 shadows
    carriers.truncate(250);
    carrier_paths.truncate(250);

    let n = carriers.len();
    if n < k as usize {
        bail!(
            "found {n} carriers matching {}x{} in {}, need at least {k}",
            secret.width,
            secret.height,
            directory.display()
        );
    }

    println!(
        "Splitting {} into {n} shadows with threshold {k}",
        file.display()
    );

    let mut scheme = ShadowShare::builder(n as u8, k).build()?;
    let secret_pixels = &secret.pixels[..secret.pixel_count().min(secret.pixels.len())];
    let shadows = scheme.distribute(secret_pixels, carriers)?;

    for (path, shadow) in carrier_paths.iter().zip(&shadows) {
        shadow
            .write(path)
            .with_context(|| format!("failed to write shadow {}", path.display()))?;
        println!("  wrote shadow {} -> {}", shadow.shadow_index, path.display());
    }

    Ok(())
}

/// Recovers the secret from `k` dimension-matched shadows found in
/// `directory` and writes it to `file`
fn recover(file: &Path, k: u8, directory: &Path) -> Result<()> {
    let shadows = find_shadow_group(directory, k as usize)
        .with_context(|| format!("failed to gather {k} shadows from {}", directory.display()))?;

    println!(
        "Recovering from {k} shadows of {}x{} in {}",
        shadows[0].width,
        shadows[0].height,
        directory.display()
    );

    let recovered = ShadowShare::reconstruct(&shadows, k)?;

    // Reuse the first shadow's container; its dimensions are the secret's
    let mut output = shadows.into_iter().next().unwrap();
    let len = recovered.len().min(output.pixels.len());
    output.pixels[..len].copy_from_slice(&recovered[..len]);
    output.set_shadow_index(0);
    output
        .write(file)
        .with_context(|| format!("failed to write recovered image {}", file.display()))?;

    println!("Recovered secret written to {}", file.display());
    Ok(())
}
