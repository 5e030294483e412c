use std::convert::TryFrom;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use qrstamp::helper::{print_symbol, save_png, to_svg_string};
use qrstamp::{encode_with_recorder, EccLevel, EncodeOptions, Mask, SizeMode, Snapshot, Version};
use tracing::Level;

#[derive(Parser)]
#[command(name = "qrstamp", about = "Encode text into a version 1 or 2 QR code")]
struct Cli {
    /// Text to encode (ISO-8859-1)
    text: String,
    /// Symbol version, 1 or 2
    #[arg(long = "version", value_parser = clap::value_parser!(u8).range(1..=2))]
    symbol_version: Option<u8>,
    /// Error correction level: L, M, Q or H
    #[arg(long)]
    ecc: Option<EccLevel>,
    /// Force a mask pattern instead of choosing by penalty
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=7))]
    mask: Option<u8>,
    /// Write an SVG to this path
    #[arg(long)]
    svg: Option<PathBuf>,
    /// Write a PNG to this path
    #[arg(long)]
    png: Option<PathBuf>,
    /// Pixels per module in the PNG
    #[arg(long, default_value_t = 8)]
    scale: u32,
    /// Print the penalty score of every mask
    #[arg(long)]
    report: bool,
    /// Print the grid after each construction stage
    #[arg(long)]
    steps: bool,
    /// Log pipeline stages to stderr
    #[arg(long, short)]
    verbose: bool,
}

impl Cli {
    fn options(&self) -> Result<EncodeOptions> {
        let mode = if self.symbol_version.is_some() || self.ecc.is_some() {
            let version = self.symbol_version.map(Version::try_from).transpose()?;
            SizeMode::Manual { version, ecc: self.ecc }
        } else {
            SizeMode::Automatic
        };
        let mut options = EncodeOptions::default().with_mode(mode);
        if let Some(mask) = self.mask {
            options = options.with_mask(Mask::try_from(mask)?);
        }
        Ok(options)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .init();

    let options = cli.options()?;
    let mut steps: Vec<Snapshot> = Vec::new();
    let symbol = encode_with_recorder(&cli.text, &options, &mut steps)
        .with_context(|| format!("failed to encode {:?}", cli.text))?;

    if cli.steps {
        for (i, step) in steps.iter().enumerate() {
            println!("Step {}: {}", i + 1, step.stage());
            println!("{}", step.stage().description());
            for y in 0..step.size() {
                let row: String = (0..step.size())
                    .map(|x| if step.get(x, y) { "██" } else { "  " })
                    .collect();
                println!("{}", row);
            }
            println!();
        }
    }

    print_symbol(&symbol);
    println!(
        "version {} ({}x{}), ECC level {}, mask {}, penalty {}",
        symbol.version(),
        symbol.size(),
        symbol.size(),
        symbol.ecc(),
        symbol.mask(),
        symbol.penalty().total()
    );

    if cli.report {
        match symbol.penalties() {
            Some(table) => print!("{}", table),
            None => println!("mask {} was forced; no candidates were scored", symbol.mask()),
        }
    }

    if let Some(path) = &cli.svg {
        fs::write(path, to_svg_string(&symbol, 4))
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    if let Some(path) = &cli.png {
        save_png(&symbol, path, 4, cli.scale)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    Ok(())
}
