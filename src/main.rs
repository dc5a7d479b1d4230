//! epubjson - EPUB chapters to JSON

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::{LevelFilter, warn};

use epubjson::{EpubExtractor, ExtractorConfig, TocPolicy};

#[derive(Parser)]
#[command(name = "epubjson")]
#[command(version, about = "Extract EPUB chapters as plain text JSON", long_about = None)]
#[command(after_help = "EXAMPLES:
    epubjson book.epub book.json                  Write chapters to JSON and the cover to book_cover.<ext>
    epubjson book.epub book.json --cover front    Write the cover to front.jpg, front.png, ...
    epubjson book.epub book.json --no-cover       Skip the cover
    epubjson --legacy-only book.epub book.json    Require an EPUB 2 NCX table of contents")]
struct Cli {
    /// Input EPUB file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output JSON file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Cover image path [default: OUTPUT's stem + "_cover"]; the extension
    /// is derived from the image's media type
    #[arg(long, value_name = "PATH", conflicts_with = "no_cover")]
    cover: Option<PathBuf>,

    /// Disable cover image export
    #[arg(long)]
    no_cover: bool,

    /// Prefer the cover named in the package metadata
    #[arg(long, conflicts_with = "no_cover")]
    declared_cover: bool,

    /// Only accept an NCX (EPUB 2) table of contents
    #[arg(long)]
    legacy_only: bool,

    /// Log progress details
    #[arg(short, long)]
    verbose: bool,

    /// Suppress output messages
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logger(cli: &Cli) {
    let level = if cli.quiet {
        LevelFilter::Off
    } else if cli.verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(cli: &Cli) -> epubjson::Result<()> {
    let policy = if cli.legacy_only {
        TocPolicy::LegacyOnly
    } else {
        TocPolicy::Auto
    };
    let config = ExtractorConfig::new()
        .with_toc_policy(policy)
        .with_cover_extraction(!cli.no_cover)
        .with_declared_cover(cli.declared_cover);

    let extractor = EpubExtractor::open_with_config(&cli.input, config)?;
    extractor.write_to_json(&cli.output)?;
    if !cli.quiet {
        println!("{} -> {}", cli.input.display(), cli.output.display());
    }

    if !cli.no_cover {
        let cover = cli.cover.clone().unwrap_or_else(|| default_cover_path(&cli.output));
        // A missing cover only fails the cover step
        match extractor.get_cover_image(&cover) {
            Ok(path) if !cli.quiet => println!("cover -> {}", path.display()),
            Ok(_) => {}
            Err(e) => warn!("no cover written: {e}"),
        }
    }

    Ok(())
}

/// `dir/book.json` -> `dir/book_cover`; the image extension is added later.
fn default_cover_path(output: &Path) -> PathBuf {
    let mut name = output.file_stem().map(|s| s.to_os_string()).unwrap_or_default();
    name.push("_cover");
    output.with_file_name(name)
}
