use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use pdf_compose::{
    DocumentOutput, ImageSequence, LayoutSettings, OutputMode, assemble, estimate_size,
    load_images,
};
use std::path::{Path, PathBuf};

mod logger;

use logger::CliLogger;

#[derive(Parser)]
#[command(name = "img2pdf", about = "Combine images into a PDF", version)]
struct Cli {
    /// More log output (repeat for more detail)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert images and zip archives into one PDF
    Convert {
        /// Image files or zip archives, added in the given order
        #[arg(required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,

        /// Directory the PDF is written to
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Move the image at position FROM to position TO (zero-based, repeatable)
        #[arg(long = "move", value_name = "FROM:TO", value_parser = parse_move)]
        moves: Vec<(usize, usize)>,

        /// Rotate the image at INDEX a quarter turn clockwise (repeatable)
        #[arg(long, value_name = "INDEX")]
        rotate: Vec<usize>,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Show the order images will be placed in
    List {
        #[arg(required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,
    },

    /// Estimate the size of the output without creating it
    Estimate {
        #[arg(required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,

        /// Re-encode quality (0.1 - 1.0)
        #[arg(long, default_value_t = pdf_compose::constants::DEFAULT_QUALITY)]
        quality: f32,
    },

    /// Write default layout settings to a JSON file
    InitConfig {
        path: PathBuf,
    },
}

/// Layout flags; each one overrides the value from `--config`
#[derive(Args)]
struct LayoutArgs {
    /// Settings file written by `init-config`
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use a standard page size instead of sizing pages to their images
    #[arg(long, conflicts_with = "preserve_size")]
    fixed_page: bool,

    /// Size each page to its image
    #[arg(long)]
    preserve_size: bool,

    #[arg(long, value_enum)]
    page_size: Option<PageSizeArg>,

    #[arg(long, value_enum)]
    orientation: Option<OrientationArg>,

    /// Scale images to fit inside the margins, keeping their aspect ratio
    #[arg(long, conflicts_with = "fill")]
    fit: bool,

    /// Stretch images to the margins
    #[arg(long)]
    fill: bool,

    /// Re-encode quality (0.1 - 1.0)
    #[arg(long)]
    quality: Option<f32>,

    /// Pixels per inch of the source images
    #[arg(long)]
    dpi: Option<u32>,

    /// Output file name without extension
    #[arg(long)]
    name: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum PageSizeArg {
    A4,
    A3,
    Letter,
    Legal,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrientationArg {
    Portrait,
    Landscape,
}

impl From<PageSizeArg> for pdf_compose::PageSize {
    fn from(arg: PageSizeArg) -> Self {
        match arg {
            PageSizeArg::A4 => Self::A4,
            PageSizeArg::A3 => Self::A3,
            PageSizeArg::Letter => Self::Letter,
            PageSizeArg::Legal => Self::Legal,
        }
    }
}

impl From<OrientationArg> for pdf_compose::Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Portrait => Self::Portrait,
            OrientationArg::Landscape => Self::Landscape,
        }
    }
}

impl LayoutArgs {
    async fn resolve(self) -> Result<LayoutSettings> {
        let mut settings = match &self.config {
            Some(path) => LayoutSettings::load(path)
                .await
                .with_context(|| format!("Failed to load {}", path.display()))?,
            None => LayoutSettings::default(),
        };

        if let Some(preserve_size) = flag_pair(self.preserve_size, self.fixed_page) {
            settings.preserve_size = preserve_size;
        }
        if let Some(page_size) = self.page_size {
            settings.page_size = page_size.into();
        }
        if let Some(orientation) = self.orientation {
            settings.orientation = orientation.into();
        }
        if let Some(fit) = flag_pair(self.fit, self.fill) {
            settings.fit_to_page = fit;
        }
        if let Some(quality) = self.quality {
            settings.quality = quality;
        }
        if let Some(dpi) = self.dpi {
            settings.dpi = dpi;
        }
        if let Some(name) = self.name {
            settings.filename_base = name;
        }

        settings.validate()?;
        Ok(settings)
    }
}

/// Value chosen by a pair of opposing switches, if either was given
fn flag_pair(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

fn parse_move(s: &str) -> Result<(usize, usize), String> {
    let (from, to) = s
        .split_once(':')
        .ok_or_else(|| format!("expected FROM:TO, got '{}'", s))?;
    let from = from
        .trim()
        .parse()
        .map_err(|_| format!("invalid position '{}'", from))?;
    let to = to
        .trim()
        .parse()
        .map_err(|_| format!("invalid position '{}'", to))?;
    Ok((from, to))
}

/// Ingest inputs into a sequence in natural order
async fn load_sequence(inputs: &[PathBuf]) -> ImageSequence {
    let report = load_images(inputs).await;
    for name in &report.skipped {
        println!("Skipped {}", name);
    }
    let mut sequence = ImageSequence::new();
    sequence.append_batch(report.assets);
    sequence
}

async fn convert(
    inputs: Vec<PathBuf>,
    output_dir: &Path,
    moves: Vec<(usize, usize)>,
    rotate: Vec<usize>,
    settings: LayoutSettings,
) -> Result<()> {
    let mut sequence = load_sequence(&inputs).await;

    for (from, to) in moves {
        sequence.reorder(from, to)?;
    }
    for index in rotate {
        let id = sequence
            .assets()
            .get(index)
            .map(|asset| asset.id())
            .ok_or_else(|| anyhow!("No image at position {}", index))?;
        sequence.rotate(id)?;
    }

    let snapshot = sequence.snapshot();
    let output = assemble(&snapshot, &settings, OutputMode::Persist, |progress| {
        println!("[{:>3}%] {}", progress.percent(), progress.phase);
    })
    .await?;

    match output {
        None => println!("No images to convert"),
        Some(DocumentOutput::File(file)) => {
            let path = file.save(output_dir).await?;
            println!("Converted {} images → {}", file.page_count, path.display());
        }
        Some(DocumentOutput::Preview(_)) => bail!("Expected a file, got a preview"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    CliLogger::new(CliLogger::level_for(cli.verbose, cli.quiet))
        .init()
        .context("Failed to install logger")?;

    match cli.command {
        Commands::Convert {
            inputs,
            output_dir,
            moves,
            rotate,
            layout,
        } => {
            let settings = layout.resolve().await?;
            convert(inputs, &output_dir, moves, rotate, settings).await?;
        }

        Commands::List { inputs } => {
            let sequence = load_sequence(&inputs).await;
            for (index, asset) in sequence.assets().iter().enumerate() {
                println!(
                    "{:>3}  {}  {}x{}",
                    index,
                    asset.display_name(),
                    asset.original_width(),
                    asset.original_height()
                );
            }
        }

        Commands::Estimate { inputs, quality } => {
            let sequence = load_sequence(&inputs).await;
            let estimate = estimate_size(sequence.assets(), quality);
            println!("Images: {}", estimate.pages);
            println!(
                "Source size: {}",
                pdf_compose::format_bytes(estimate.source_bytes)
            );
            println!("Estimated PDF size: ~{}", estimate.display());
        }

        Commands::InitConfig { path } => {
            LayoutSettings::default().save(&path).await?;
            println!("Wrote default settings → {}", path.display());
        }
    }

    Ok(())
}
