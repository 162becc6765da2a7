use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};

use pagesnap::{ColorNormalizer, ExportConfig, ExportRequest, StyleTree};

/// Export styled node tree snapshots as paginated documents.
#[derive(Parser, Debug)]
#[command(name = "pagesnap", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export a snapshot (JSON, or HTML with inline styles) to a document.
    Export(ExportArgs),

    /// Print the normalized sRGB form of each color.
    Normalize {
        #[arg(required = true)]
        colors: Vec<String>,
    },

    /// Print the page offsets for an image height.
    Paginate {
        #[arg(long)]
        image_height: f64,

        #[arg(long, default_value_t = 297.0)]
        page_height: f64,
    },
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Snapshot file
    snapshot: PathBuf,

    /// Element id of the capture root (default: whole tree)
    #[arg(long)]
    target: Option<String>,

    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    #[arg(long, default_value = "dashboard")]
    prefix: String,

    /// Output pixels per CSS pixel
    #[arg(long, default_value_t = 2.0)]
    scale: f32,

    /// Fill painted under the capture
    #[arg(long, default_value = "#ffffff")]
    background: String,

    /// Keep the snapshot's color scheme instead of forcing light
    #[arg(long)]
    no_force_light: bool,

    /// Also write the rasterized image as PNG
    #[arg(long)]
    png: Option<PathBuf>,
}

fn load_snapshot(path: &Path) -> anyhow::Result<StyleTree> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading snapshot {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    let tree = match ext.as_deref() {
        Some("html") | Some("htm") => load_html(&text)?,
        _ => StyleTree::from_json(&text)?,
    };
    Ok(tree)
}

#[cfg(feature = "html")]
fn load_html(text: &str) -> anyhow::Result<StyleTree> {
    Ok(StyleTree::from_html(text)?)
}

#[cfg(not(feature = "html"))]
fn load_html(_text: &str) -> anyhow::Result<StyleTree> {
    bail!("HTML snapshots require the `html` feature")
}

#[cfg(feature = "pdf")]
async fn export(args: ExportArgs) -> anyhow::Result<()> {
    let tree = load_snapshot(&args.snapshot)?;
    let mut config = ExportConfig {
        output_dir: args.out_dir,
        file_prefix: args.prefix,
        ..Default::default()
    };
    config.raster.scale = args.scale;
    config.raster.background = args.background;
    config.raster.force_light_scheme = !args.no_force_light;

    let request = ExportRequest {
        target: args.target,
    };
    let mut exporter = pagesnap::new_pdf_exporter(config)?;

    let outcome = exporter.export(&tree, &request).await?;
    if let Some(png) = &args.png {
        std::fs::write(png, outcome.image.to_png()?)
            .with_context(|| format!("writing {}", png.display()))?;
    }
    println!("{}", outcome.path.display());
    log::info!(
        "pages={} synced={} scrubbed={} mismatches={} digest={}",
        outcome.page_count,
        outcome.sync.nodes_synced,
        outcome.scrub.nodes_scrubbed,
        outcome.sync.mismatches.len(),
        outcome.digest
    );
    Ok(())
}

#[cfg(not(feature = "pdf"))]
async fn export(_args: ExportArgs) -> anyhow::Result<()> {
    bail!("exporting requires the `pdf` feature")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Command::Export(args) => export(args).await?,
        Command::Normalize { colors } => {
            let normalizer = ColorNormalizer::new();
            if !normalizer.is_available() {
                bail!("no color surface available");
            }
            for c in &colors {
                println!("{}", normalizer.normalize(c));
            }
        }
        Command::Paginate {
            image_height,
            page_height,
        } => {
            for page in pagesnap::paginate(image_height, page_height)? {
                println!("{} {}", page.index, page.offset);
            }
        }
    }
    Ok(())
}
