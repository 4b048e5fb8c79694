mod document;
pub mod script;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use document::LoadedPdf;
use pdf_engine::{default_engine, OpenSource, PdfEngine};
use placement_core::{DocumentRenderer, PlacementConfig, PlacementSession, PointerHub};
use placement_model::{
    ConfirmedPlacement, CursorHint, OverlayTransform, SignatureAsset, ViewportRect,
};
use script::{GestureScript, RecordingNavigator};
use serde::Serialize;
use std::cell::Cell;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use storage::{LocalStore, SignatureStore};

#[derive(Debug, Parser)]
#[command(name = "signplace-cli")]
#[command(about = "Place a captured signature on a PDF page")]
pub struct Cli {
    /// Directory holding the local key-value store.
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Store an image file as the captured signature.
    StoreSignature {
        #[arg(value_name = "IMAGE")]
        image: PathBuf,
    },
    /// Remove the captured signature.
    ClearSignature,
    /// Print the last confirmed placement.
    LastPlacement,
    /// Print machine-readable PDF metadata.
    Info {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Replay a gesture script against a placement session.
    Place {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(long, value_name = "JSON")]
        script: PathBuf,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        width: Option<u32>,
    },
    /// Render a page PNG at the configured width.
    RenderPage {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        width: Option<u32>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print CLI version.
    Version,
}

#[derive(Debug, Serialize)]
struct InfoOutput {
    path: String,
    page_count: u32,
    first_page_size_pt: PageSizeOutput,
}

#[derive(Debug, Serialize)]
struct PageSizeOutput {
    width: f32,
    height: f32,
}

#[derive(Debug, Serialize)]
struct PlaceOutput {
    has_overlay: bool,
    page_number: u32,
    page_count: Option<u32>,
    page_label: String,
    transform: OverlayTransform,
    mode: &'static str,
    cursor: CursorHint,
    confirmed: Option<ConfirmedPlacement>,
    routes: Vec<String>,
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    let mut config = PlacementConfig::from_env().context("invalid configuration")?;
    if let Some(dir) = &cli.data_dir {
        config = config.with_data_dir(dir);
    }

    match cli.command {
        Commands::StoreSignature { image } => run_store_signature(&config, &image),
        Commands::ClearSignature => run_clear_signature(&config),
        Commands::LastPlacement => run_last_placement(&config),
        Commands::Info { file } => run_info(&file),
        Commands::Place { file, script, page, width } => {
            if let Some(width) = width {
                config = config.with_render_width(width);
            }
            run_place(&config, &file, &script, page)
        }
        Commands::RenderPage { file, page, width, output } => {
            if let Some(width) = width {
                config = config.with_render_width(width);
            }
            run_render_page(&config, &file, page, output.as_deref())
        }
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn open_store(config: &PlacementConfig) -> Result<SignatureStore> {
    let store = match &config.data_dir {
        Some(dir) => LocalStore::with_root(dir),
        None => LocalStore::from_default_project().context("failed to locate data directory")?,
    };

    Ok(SignatureStore::new(store))
}

fn run_store_signature(config: &PlacementConfig, image: &Path) -> Result<()> {
    let bytes =
        fs::read(image).with_context(|| format!("failed to read image {}", image.display()))?;
    let format = image::guess_format(&bytes).context("unrecognized image format")?;
    let asset = SignatureAsset::new(format.to_mime_type(), bytes)?;

    let store = open_store(config)?;
    store.save_signature(&asset).context("failed to store signature")?;

    println!("stored {} signature ({} bytes)", asset.media_type(), asset.bytes().len());
    Ok(())
}

fn run_clear_signature(config: &PlacementConfig) -> Result<()> {
    let store = open_store(config)?;

    if store.clear_signature().context("failed to clear signature")? {
        println!("signature cleared");
    } else {
        println!("no signature stored");
    }

    Ok(())
}

fn run_last_placement(config: &PlacementConfig) -> Result<()> {
    let store = open_store(config)?;
    let placement = store.load_placement().context("failed to read placement")?;

    println!("{}", serde_json::to_string_pretty(&placement)?);
    Ok(())
}

fn run_info(file: &Path) -> Result<()> {
    ensure_pdf_exists(file)?;

    let mut engine = default_engine();
    let handle = engine.open(OpenSource::from(file)).context("failed to open PDF")?;

    let page_count = engine.page_count(handle)?;
    let size = engine.page_size(handle, 1)?;

    let payload = InfoOutput {
        path: file.display().to_string(),
        page_count,
        first_page_size_pt: PageSizeOutput { width: size.width_pt, height: size.height_pt },
    };

    println!("{}", serde_json::to_string_pretty(&payload)?);

    engine.close(handle)?;

    Ok(())
}

fn run_place(config: &PlacementConfig, file: &Path, script_path: &Path, page: u32) -> Result<()> {
    ensure_pdf_exists(file)?;

    let raw = fs::read_to_string(script_path)
        .with_context(|| format!("failed to read script {}", script_path.display()))?;
    let script: GestureScript = serde_json::from_str(&raw).context("invalid gesture script")?;

    let hub = PointerHub::new();
    let viewport = Rc::new(Cell::new(script.viewport));
    let mut session = PlacementSession::mount(
        &hub,
        viewport.clone(),
        open_store(config)?,
        RecordingNavigator::default(),
        config,
    );

    let mut pdf = LoadedPdf::new(file);
    session.load_document(&mut pdf);
    if !(1..=session.document().last_page()).contains(&page) {
        anyhow::bail!("page {page} is not in the document");
    }
    session.go_to_page(page);

    if script.viewport.is_none() {
        viewport.set(page_bounds(&pdf, session.document().page_number, config.render_width_px));
    }

    let confirmed = script::replay(&script.steps, &hub, &viewport, &mut session)
        .context("failed to hand off placement")?;

    let document = session.document();
    let payload = PlaceOutput {
        has_overlay: session.has_overlay(),
        page_number: document.page_number,
        page_count: document.page_count,
        page_label: session.page_label(),
        transform: session.transform(),
        mode: session.mode().name(),
        cursor: session.mode().cursor(),
        confirmed,
        routes: session.navigator().routes.clone(),
    };

    println!("{}", serde_json::to_string_pretty(&payload)?);

    Ok(())
}

/// Bounds of the rendered page, used as the container when a script names none.
fn page_bounds(pdf: &LoadedPdf, page_number: u32, width_px: u32) -> Option<ViewportRect> {
    let size = pdf.page_size(page_number)?;
    let height = size.height_at_width(width_px);

    Some(ViewportRect::new(0.0, 0.0, f64::from(width_px), f64::from(height)))
}

fn run_render_page(
    config: &PlacementConfig,
    file: &Path,
    page: u32,
    output: Option<&Path>,
) -> Result<()> {
    ensure_pdf_exists(file)?;

    if page == 0 {
        anyhow::bail!("--page is 1-based and must be >= 1");
    }

    let hub = PointerHub::new();
    let mut session = PlacementSession::mount(
        &hub,
        Rc::new(Cell::new(None::<ViewportRect>)),
        open_store(config)?,
        RecordingNavigator::default(),
        config,
    );

    let mut pdf = LoadedPdf::new(file);
    let page_count = pdf.load().context("failed to open PDF")?;
    session.on_document_loaded(page_count);
    if page > page_count {
        anyhow::bail!("page {page} is not in the document");
    }
    session.go_to_page(page);

    let image = session.render_current_page(&mut pdf).context("failed to render page")?;

    let output = output.map(ToOwned::to_owned).unwrap_or_else(|| default_page_output(file, page));

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }

    image
        .save(&output)
        .with_context(|| format!("failed to write image to {}", output.display()))?;

    println!("{}", output.display());

    Ok(())
}

fn ensure_pdf_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("file does not exist: {}", path.display());
    }

    if !path.is_file() {
        anyhow::bail!("path is not a file: {}", path.display());
    }

    Ok(())
}

fn default_page_output(file: &Path, page: u32) -> PathBuf {
    let stem = file.file_stem().and_then(|name| name.to_str()).unwrap_or("page");

    file.with_file_name(format!("{stem}-page-{page}.png"))
}
