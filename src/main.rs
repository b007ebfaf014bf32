// this_file: src/main.rs
//! Snapline CLI - render text snippets to PNG or PPM

use anyhow::{Context as _, Result};
use base64::Engine as _;
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use log::info;
use snapline::{
    logging, CanvasSize, Color, Context, FontRole, FontSource, OutputFormat, RenderConfig,
    SkrifaEngine,
};

/// Snapline - render short text snippets into RGB images
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Set log level (error, warn, info, debug, trace)
    #[arg(short = 'l', long, global = true, default_value = "warn")]
    log_level: String,

    /// Enable quiet mode (only errors)
    #[arg(short = 'q', long, global = true)]
    quiet: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render text into an image
    Render(RenderArgs),

    /// Show version information
    Version,
}

#[derive(Args)]
struct RenderArgs {
    /// Font file, optionally tagged with a role: PATH[=ROLE]
    #[arg(short, long = "font", value_name = "PATH[=ROLE]", value_parser = parse_font)]
    fonts: Vec<FontArg>,

    /// Role to draw with (defaults to the first font)
    #[arg(long, value_name = "ROLE")]
    active: Option<FontRole>,

    /// Text to draw; each line goes on its own row
    #[arg(short, long)]
    text: String,

    /// First grid row
    #[arg(long, default_value_t = 0)]
    row: u32,

    /// First grid column
    #[arg(long, default_value_t = 0)]
    col: u32,

    /// Canvas rows (defaults to fit the text)
    #[arg(long, conflicts_with_all = ["width", "height"])]
    rows: Option<u32>,

    /// Canvas columns (defaults to fit the text)
    #[arg(long, conflicts_with_all = ["width", "height"])]
    cols: Option<u32>,

    /// Canvas width in pixels
    #[arg(long, requires = "height")]
    width: Option<u32>,

    /// Canvas height in pixels
    #[arg(long, requires = "width")]
    height: Option<u32>,

    /// Foreground color (#rrggbb)
    #[arg(long)]
    fg: Option<Color>,

    /// Background color (#rrggbb)
    #[arg(long)]
    bg: Option<Color>,

    /// Line height in pixels
    #[arg(long)]
    line_height: Option<u32>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<Utf8PathBuf>,

    /// Output format (png, ppm)
    #[arg(long)]
    format: Option<OutputFormat>,

    /// Apply pair kerning
    #[arg(long)]
    kerning: bool,

    /// Output file (base64 on stdout if omitted)
    #[arg(short, long)]
    output: Option<Utf8PathBuf>,
}

#[derive(Debug, Clone)]
struct FontArg {
    path: Utf8PathBuf,
    role: Option<FontRole>,
}

fn parse_font(s: &str) -> std::result::Result<FontArg, String> {
    match s.rsplit_once('=') {
        Some((path, role)) if !path.is_empty() => Ok(FontArg {
            path: path.into(),
            role: Some(role.parse().map_err(|e: snapline::Error| e.to_string())?),
        }),
        _ => Ok(FontArg {
            path: s.into(),
            role: None,
        }),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level, cli.quiet, true);

    match cli.command {
        Commands::Render(args) => render(args)?,
        Commands::Version => {
            println!("snapline version {}", snapline::VERSION);
            println!("Text snippet to RGB image renderer");
        }
    }

    Ok(())
}

fn render(args: RenderArgs) -> Result<()> {
    let config = build_config(&args)?;
    let size = canvas_size(&args);

    let mut ctx = Context::new(SkrifaEngine::new(), config, size)?;
    for (font, role) in assign_roles(&args.fonts)? {
        ctx.add_font(&FontSource::path(font.path.clone()), role)
            .with_context(|| format!("adding font {}", font.path))?;
    }
    if let Some(role) = args.active {
        ctx.set_active(role)?;
    }

    for (i, line) in args.text.lines().enumerate() {
        let row = args.row.saturating_add(i as u32);
        ctx.draw_text(row, args.col, line)
            .with_context(|| format!("drawing row {}", row))?;
    }

    let bytes = ctx.encode()?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, &bytes).with_context(|| format!("writing {}", path))?;
            info!(
                "Wrote {}x{} {} to {} ({} bytes)",
                ctx.bitmap().width(),
                ctx.bitmap().height(),
                ctx.config().format,
                path,
                bytes.len()
            );
        }
        None => println!("{}", base64::engine::general_purpose::STANDARD.encode(&bytes)),
    }
    Ok(())
}

fn build_config(args: &RenderArgs) -> Result<RenderConfig> {
    let mut config = match &args.config {
        Some(path) => {
            RenderConfig::from_path(path).with_context(|| format!("loading config {}", path))?
        }
        None => RenderConfig::default(),
    };
    if let Some(line_height) = args.line_height {
        config.line_height = line_height;
    }
    if let Some(fg) = args.fg {
        config.pencil = fg;
    }
    if let Some(bg) = args.bg {
        config.fill = bg;
    }
    if let Some(format) = args.format {
        config.format = format;
    }
    if args.kerning {
        config.kerning = true;
    }
    config.validate()?;
    Ok(config)
}

/// Explicit pixels win; otherwise a grid just large enough for the text.
fn canvas_size(args: &RenderArgs) -> CanvasSize {
    if let (Some(width), Some(height)) = (args.width, args.height) {
        return CanvasSize::Pixels { width, height };
    }
    let lines = args.text.lines().count().max(1) as u32;
    let widest = args
        .text
        .lines()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0) as u32;
    CanvasSize::Grid {
        rows: args.rows.unwrap_or(args.row.saturating_add(lines)),
        cols: args
            .cols
            .unwrap_or(args.col.saturating_add(widest).max(1)),
    }
}

/// Untagged fonts take the first role not claimed by a tagged one.
fn assign_roles(fonts: &[FontArg]) -> Result<Vec<(&FontArg, FontRole)>> {
    let mut taken: Vec<FontRole> = fonts.iter().filter_map(|f| f.role).collect();
    let mut out = Vec::with_capacity(fonts.len());
    for font in fonts {
        let role = match font.role {
            Some(role) => role,
            None => {
                let role = FontRole::ALL
                    .into_iter()
                    .find(|r| !taken.contains(r))
                    .with_context(|| format!("no free font role for {}", font.path))?;
                taken.push(role);
                role
            }
        };
        out.push((font, role));
    }
    Ok(out)
}
