use clap::{Parser, Subcommand};
use sectional::schema::FileVersionsDescription;
use sectional::section::FileSection;
use sectional::tags;
use sectional::FileReader;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sectional", about = "Inspect sectional binary container files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every section without validating against a format
    List {
        input: PathBuf,
        /// File tag: 0x-prefixed hex or 8 ASCII characters
        #[arg(long, value_parser = parse_tag)]
        file_tag: u64,
        /// End tag: 0x-prefixed hex or 8 ASCII characters
        #[arg(long, value_parser = parse_tag)]
        end_tag: u64,
        /// Print the section index as JSON
        #[arg(long)]
        json: bool,
    },
    /// Open a file and validate it against a JSON format description
    Check {
        input: PathBuf,
        #[arg(short, long)]
        format: PathBuf,
    },
    /// Hex-dump the payload of one section
    Dump {
        input: PathBuf,
        #[arg(long, value_parser = parse_tag)]
        file_tag: u64,
        #[arg(long, value_parser = parse_tag)]
        end_tag: u64,
        /// Zero-based position of the section in file order
        #[arg(short, long)]
        index: usize,
    },
    /// Compute tag values from text
    Tag {
        /// 8 characters for a plain tag, 3 characters for a PNG-style tag
        text: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    match Cli::parse().command {

        // ── List ─────────────────────────────────────────────────────────────
        Commands::List { input, file_tag, end_tag, json } => {
            let reader = FileReader::open_path(&input, file_tag, end_tag)?;
            if json {
                println!("{}", serde_json::to_string_pretty(reader.sections())?);
            } else {
                println!("File: {}  (version {})", input.display(), reader.version());
                print_sections(reader.sections().iter());
            }
            reader.close()?;
        }

        // ── Check ────────────────────────────────────────────────────────────
        Commands::Check { input, format } => {
            let family = FileVersionsDescription::from_json_file(&format)?;
            let reader = FileReader::open_path_checked(
                &input,
                family.file_tag(),
                family.end_tag(),
                &family,
            )?;
            let resolved = reader.description().map(|d| d.version().to_string());
            println!("File:    {}", input.display());
            println!("Version: {} (validated as {})",
                reader.version(),
                resolved.as_deref().unwrap_or("-"));
            print_sections(reader.sections().iter());
            reader.close()?;
            println!("OK");
        }

        // ── Dump ─────────────────────────────────────────────────────────────
        Commands::Dump { input, file_tag, end_tag, index } => {
            let mut reader = FileReader::open_path(&input, file_tag, end_tag)?;
            let section = reader.sections().iter().nth(index).copied().ok_or_else(|| {
                format!("no section at index {index} ({} present)", reader.sections().len())
            })?;
            let payload = reader.read_section(&section)?;
            let mut out = std::io::stdout().lock();
            for (row, chunk) in payload.chunks(16).enumerate() {
                writeln!(out, "{:08x}  {}", section.data_offset() + row as u64 * 16, hex::encode(chunk))?;
            }
            reader.close()?;
        }

        // ── Tag ──────────────────────────────────────────────────────────────
        Commands::Tag { text } => match text.as_bytes() {
            &[b0, b1, b2] => println!("{}", tags::to_hex(tags::png_style(b0, b1, b2))),
            _             => println!("{}", tags::to_hex(tags::from_text(&text)?)),
        },
    }

    Ok(())
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn parse_tag(s: &str) -> Result<u64, String> {
    tags::parse(s).map_err(|e| e.to_string())
}

fn print_sections<'a>(sections: impl Iterator<Item = &'a FileSection>) {
    println!("{:>18} {:>18} {:<16} {:>12}", "Offset", "Tag", "Tag bytes", "Size");
    for s in sections {
        let text = tags::to_text(s.tag).unwrap_or_default();
        println!("{:>18} {:>18} {:<16} {:>12}  {}",
            tags::to_hex(s.offset),
            tags::to_hex(s.tag),
            hex::encode(s.tag.to_be_bytes()),
            s.data_size,
            text);
    }
}
