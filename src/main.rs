use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

use airgap::{
    display_carousel, display_once, fits_in_terminal, render_terminal, Decoder, Encoder,
    RECOMMENDED_MAX_CHUNK_SIZE,
};

#[derive(Parser)]
#[command(name = "airgap")]
#[command(author, version, about = "One-way file transfer over QR codes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a file into QR code frames
    Encode {
        /// Input file to encode
        input: PathBuf,

        /// Output directory for PNG frames
        #[arg(short, long, default_value = "./qr_output")]
        output: PathBuf,

        /// Frame size in bytes, header included
        #[arg(short, long, default_value_t = RECOMMENDED_MAX_CHUNK_SIZE)]
        chunk_size: usize,

        /// Display frames in the terminal instead of saving PNGs
        #[arg(short, long)]
        terminal: bool,

        /// Interval in milliseconds for the terminal carousel
        #[arg(short, long, default_value = "1000")]
        interval: u64,

        /// Show all frames at once without the carousel (only with --terminal)
        #[arg(long)]
        no_carousel: bool,
    },

    /// Decode scanned QR strings (one per line) back into the original file
    Decode {
        /// Text file of scanned frame strings
        input: PathBuf,

        /// Output file for the reassembled payload
        #[arg(short, long, default_value = "./airgap_output.bin")]
        output: PathBuf,
    },
}

fn encode(
    input: &Path,
    output: &Path,
    chunk_size: usize,
    terminal: bool,
    interval: u64,
    no_carousel: bool,
) -> Result<()> {
    let data = fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let label = input
        .file_name()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow!("Invalid filename"))?
        .to_string();

    let encoder = Encoder::new(&data, chunk_size)
        .map_err(|e| anyhow!("Failed to create encoder: {}", e))?;

    println!(
        "Session {:08x}: {} byte(s) in {} frame(s)",
        encoder.session_id(),
        data.len(),
        encoder.chunk_count()
    );

    if terminal {
        let mut frames = Vec::with_capacity(encoder.chunk_count());
        for index in 0..encoder.chunk_count() {
            let qr = encoder.generate_qr_string(index)?;
            if index == 0 && !fits_in_terminal(&qr)? {
                bail!(
                    "Terminal too small for frames of {} bytes. \
                     Enlarge the terminal or lower --chunk-size.",
                    chunk_size
                );
            }
            frames.push(render_terminal(&qr)?);
        }

        if no_carousel || frames.len() == 1 {
            display_once(&label, &frames);
        } else {
            println!("Starting carousel mode ({}ms interval)...", interval);
            println!("Press Ctrl+C to exit");
            std::thread::sleep(std::time::Duration::from_secs(1));
            display_carousel(&label, &frames, interval);
        }
    } else {
        fs::create_dir_all(output)?;

        for index in 0..encoder.chunk_count() {
            let png = encoder.generate_png(index)?;
            let frame_name = format!("{}_{:04}.png", label.replace('.', "_"), index + 1);
            fs::write(output.join(&frame_name), png)?;
            println!(
                "  Generated frame {}/{}: {}",
                index + 1,
                encoder.chunk_count(),
                frame_name
            );
        }

        println!();
        println!(
            "Wrote {} frame(s) to {}",
            encoder.chunk_count(),
            output.display()
        );
    }

    Ok(())
}

fn decode(input: &Path, output: &Path) -> Result<()> {
    let text = fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let mut decoder = Decoder::new();

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match decoder.process_qr(line) {
            Ok((index, total)) => {
                println!(
                    "  Frame {}/{} accepted ({}/{} received)",
                    index + 1,
                    total,
                    decoder.received_chunks(),
                    decoder.total_chunks()
                );
            }
            Err(e) => {
                println!("  Skipping line {}: {}", line_no + 1, e);
            }
        }

        if decoder.is_complete() {
            println!("All {} frame(s) received. Stopping early.", decoder.total_chunks());
            break;
        }
    }

    if !decoder.is_complete() {
        bail!(
            "Transfer incomplete: {}/{} frame(s) received",
            decoder.received_chunks(),
            decoder.total_chunks()
        );
    }

    let data = decoder
        .data()
        .map_err(|e| anyhow!("Failed to reassemble payload: {}", e))?;
    fs::write(output, &data)?;

    println!();
    println!("Wrote {} byte(s) to {}", data.len(), output.display());

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Encode {
            input,
            output,
            chunk_size,
            terminal,
            interval,
            no_carousel,
        } => encode(&input, &output, chunk_size, terminal, interval, no_carousel),

        Commands::Decode { input, output } => decode(&input, &output),
    }
}
