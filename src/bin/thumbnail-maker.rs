use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use thumbnail_maker::{
    CpuBackend, FsImageLoader, LayoutConfig, MarkupBackend, RenderBackend, RenderOptions,
    TextKind, ThumbnailDocument, ThumbnailSpec, resolve_plan,
};

#[derive(Parser, Debug)]
#[command(name = "thumbnail-maker", version, about = "Render thumbnails from a JSON description")]
struct Cli {
    /// Log at DEBUG instead of WARN.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rasterize the thumbnail to a PNG.
    Render(RenderArgs),
    /// Describe the thumbnail as positioned HTML (or JSON) for a markup renderer.
    Markup(MarkupArgs),
}

#[derive(Args, Debug)]
struct DocumentArgs {
    /// Input thumbnail document.
    #[arg(default_value = "thumbnail.json")]
    document: PathBuf,

    /// Replace the content of every title layer.
    #[arg(long)]
    title: Option<String>,

    /// Replace the content of every subtitle layer.
    #[arg(long)]
    subtitle: Option<String>,

    /// Use this image as a cover-fitted background.
    #[arg(long = "bg-img")]
    bg_img: Option<String>,

    /// Canvas-edge margin in pixels.
    #[arg(long)]
    margin: Option<f64>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    doc: DocumentArgs,

    /// Output PNG path.
    #[arg(short, long, default_value = "thumbnail.png")]
    output: PathBuf,

    /// Extra directory of .ttf/.otf files to register (repeatable).
    #[arg(long = "font-dir")]
    font_dirs: Vec<PathBuf>,

    /// Print the draw ops as JSON to stdout.
    #[arg(long)]
    dump_ops: bool,
}

#[derive(Args, Debug)]
struct MarkupArgs {
    #[command(flatten)]
    doc: DocumentArgs,

    /// Output path (default: thumbnail.html, or thumbnail.markup.json with --format json).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = MarkupFormat::Html)]
    format: MarkupFormat,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MarkupFormat {
    Html,
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Markup(args) => cmd_markup(args),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Load the document and apply command-line overrides.
fn load_spec(args: &DocumentArgs) -> anyhow::Result<(ThumbnailSpec, LayoutConfig)> {
    let doc = ThumbnailDocument::from_path(&args.document)
        .with_context(|| format!("load document '{}'", args.document.display()))?;
    let mut spec = doc.thumbnail;

    if let Some(title) = &args.title {
        let n = spec.override_content(TextKind::Title, title);
        tracing::debug!(layers = n, "title override applied");
    }
    if let Some(subtitle) = &args.subtitle {
        let n = spec.override_content(TextKind::Subtitle, subtitle);
        tracing::debug!(layers = n, "subtitle override applied");
    }
    if let Some(bg) = &args.bg_img {
        spec.override_background_image(bg.clone());
    }

    let mut cfg = LayoutConfig::default();
    if let Some(margin) = args.margin {
        anyhow::ensure!(
            margin.is_finite() && margin >= 0.0,
            "--margin must be finite and >= 0"
        );
        cfg = cfg.with_margin(margin);
    }
    Ok((spec, cfg))
}

fn document_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let (spec, cfg) = load_spec(&args.doc)?;
    let loader = FsImageLoader::for_document(&args.doc.document);
    let plan = resolve_plan(&spec, &loader, &cfg)?;

    let mut backend = CpuBackend::new(RenderOptions {
        font_dirs: args.font_dirs.clone(),
        document_dir: document_dir(&args.doc.document),
    });
    if args.dump_ops {
        let ops = backend.draw_ops(&plan)?;
        println!(
            "{}",
            serde_json::to_string_pretty(&ops).context("serialize draw ops")?
        );
    }

    let frame = backend.render(&plan)?;
    let png = frame.encode_png()?;
    write_atomically(&args.output, &png)?;

    eprintln!("wrote {}", args.output.display());
    Ok(())
}

fn cmd_markup(args: MarkupArgs) -> anyhow::Result<()> {
    let (spec, cfg) = load_spec(&args.doc)?;
    let loader = FsImageLoader::for_document(&args.doc.document);
    let plan = resolve_plan(&spec, &loader, &cfg)?;
    let doc = MarkupBackend.render(&plan)?;

    let (bytes, default_out) = match args.format {
        MarkupFormat::Html => (doc.to_html().into_bytes(), "thumbnail.html"),
        MarkupFormat::Json => (doc.to_json()?.into_bytes(), "thumbnail.markup.json"),
    };
    let output = args.output.unwrap_or_else(|| PathBuf::from(default_out));
    write_atomically(&output, &bytes)?;

    eprintln!("wrote {}", output.display());
    Ok(())
}

/// Write to a sibling temp file and rename it into place, so a failed run leaves no partial file.
fn write_atomically(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let file_name = path
        .file_name()
        .with_context(|| format!("output path '{}' has no file name", path.display()))?;
    let mut tmp_name = std::ffi::OsString::from(".");
    tmp_name.push(file_name);
    tmp_name.push(format!(".{}.tmp", std::process::id()));
    let tmp = path.with_file_name(tmp_name);

    std::fs::write(&tmp, bytes).with_context(|| format!("write '{}'", tmp.display()))?;
    if let Err(err) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(err).with_context(|| format!("move output into '{}'", path.display()));
    }
    Ok(())
}
