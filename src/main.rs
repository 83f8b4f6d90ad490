use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{debug, warn};
use simple_mosaic::export::ExportFormat;
use simple_mosaic::mosaic::{AlphaMode, BlockSize, MAX_BLOCK_SIZE, MosaicParams, Preset, plan_mosaic};
use simple_mosaic::raster::Region;
use simple_mosaic::selection::Point;
use simple_mosaic::session::EditSession;
use simple_mosaic::{config, io, output};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// A rectangle given on the command line as `X0,Y0,X1,Y1` in image pixels.
///
/// Corners may be given in any order and may lie outside the image.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SelectionArg {
    start: Point,
    end: Point,
}

impl FromStr for SelectionArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let coords = s
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("invalid coordinate in '{s}': {e}"))?;
        match coords[..] {
            [x0, y0, x1, y1] if coords.iter().all(|c| c.is_finite()) => Ok(Self {
                start: Point::new(x0, y0),
                end: Point::new(x1, y1),
            }),
            [_, _, _, _] => Err(format!("coordinates in '{s}' must be finite")),
            _ => Err(format!("expected X0,Y0,X1,Y1, got '{s}'")),
        }
    }
}

/// Block size overrides.
#[derive(clap::Args, Clone)]
struct BlockSizeArgs {
    /// Block edge length in pixels (overrides config and preset)
    #[arg(long, value_name = "N", conflicts_with = "preset",
          value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_BLOCK_SIZE)))]
    block_size: Option<u32>,

    /// Named block size: small, medium, large, extra-large
    #[arg(long, value_name = "PRESET")]
    preset: Option<Preset>,
}

impl BlockSizeArgs {
    fn apply_to(&self, block: BlockSize) -> BlockSize {
        match (self.block_size, self.preset) {
            (Some(size), _) => BlockSize::new(size),
            (None, Some(preset)) => preset.into(),
            (None, None) => block,
        }
    }
}

/// Block size and alpha overrides for commands that pixelate.
#[derive(clap::Args, Clone)]
struct BlockArgs {
    #[command(flatten)]
    size: BlockSizeArgs,

    /// Alpha handling inside a block: average or preserve
    #[arg(long, value_name = "MODE")]
    alpha: Option<AlphaMode>,
}

impl BlockArgs {
    /// Layer command-line overrides on top of config-derived params.
    fn apply_to(&self, params: MosaicParams) -> MosaicParams {
        MosaicParams {
            block: self.size.apply_to(params.block),
            alpha: self.alpha.unwrap_or(params.alpha),
        }
    }
}

#[derive(Parser)]
#[command(name = "simple-mosaic")]
#[command(about = "Pixelate regions of an image")]
#[command(long_about = "\
Pixelate regions of an image

Each --select rectangle is replaced by a grid of uniform blocks, each block
the average color of the pixels it covers. Without --select the whole image
is pixelated. Rectangles are applied in order, each on top of the last.

Block size resolution (first available wins):
  --block-size / --preset  →  mosaic.toml [mosaic] block_size / preset  →  medium (10px)

mosaic.toml is read from the input image's directory unless --config is
given. Run 'simple-mosaic gen-config' to generate a documented mosaic.toml.")]
#[command(version)]
struct Cli {
    /// Config file (default: mosaic.toml next to the input image)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log transform details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Pixelate selected rectangles (or the whole image) and save the result
    Apply {
        /// Image to edit
        input: PathBuf,

        /// Rectangle to pixelate, as X0,Y0,X1,Y1 (repeatable)
        #[arg(long = "select", value_name = "X0,Y0,X1,Y1")]
        selections: Vec<SelectionArg>,

        /// Output file (default: <stem>_mosaicked.<ext> next to the input)
        #[arg(short, long = "output", value_name = "PATH")]
        output_path: Option<PathBuf>,

        #[command(flatten)]
        block: BlockArgs,
    },
    /// Show image dimensions and the block grid for each block size
    Info {
        /// Image to inspect
        input: PathBuf,

        #[command(flatten)]
        block: BlockSizeArgs,
    },
    /// Print a stock mosaic.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Apply {
            input,
            selections,
            output_path,
            block,
        } => {
            let config = resolve_config(cli.config.as_deref(), &input)?;
            init_thread_pool(&config.processing);
            let params = block.apply_to(config.params());
            debug!("params: block {}, alpha {}", params.block, params.alpha);

            let raster = io::decode_file(&input)?;
            let dimensions = raster.dimensions();
            let source_name = input.file_name().and_then(|n| n.to_str());
            let mut session = EditSession::new(params).with_naming(config.naming());
            session.load_image(raster, source_name);

            let mut outcomes = Vec::with_capacity(selections.len().max(1));
            if selections.is_empty() {
                outcomes.push(session.apply_mosaic()?);
            }
            for selection in &selections {
                session.begin_select(selection.start);
                session.drag_select(selection.end);
                session.end_select();
                outcomes.push(session.apply_mosaic()?);
            }

            let (path, bytes) = match output_path {
                Some(path) => {
                    let (path, format) = resolve_output(path);
                    let bytes = session.export_as(format)?;
                    (path, bytes)
                }
                None => {
                    let exported = session.export()?;
                    (input.with_file_name(&exported.filename), exported.bytes)
                }
            };
            std::fs::write(&path, &bytes)?;
            output::print_apply_output(&input, dimensions, &outcomes, &path, bytes.len());
        }
        Command::Info { input, block } => {
            let config = resolve_config(cli.config.as_deref(), &input)?;
            let chosen = block.apply_to(config.params().block);
            let raster = io::decode_file(&input)?;
            let dimensions = raster.dimensions();
            let full = Region::full(dimensions.0, dimensions.1);

            let mut sizes = vec![chosen];
            sizes.extend(
                Preset::ALL
                    .into_iter()
                    .map(Preset::block_size)
                    .filter(|b| *b != chosen),
            );
            let plans: Vec<_> = sizes
                .into_iter()
                .map(|b| plan_mosaic(dimensions, full, b))
                .collect();
            output::print_info(&input, dimensions, &plans);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// `--verbose` raises this crate to `debug`; `RUST_LOG` overrides both.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        "warn,simple_mosaic=debug"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(filter))
        .format_timestamp(None)
        .init();
}

/// Output path and encoder for `--output`. An extension without an encoder
/// is replaced with `.png` so the name matches the bytes.
fn resolve_output(path: PathBuf) -> (PathBuf, ExportFormat) {
    match ExportFormat::from_path(&path) {
        Some(format) => (path, format),
        None => {
            let png = path.with_extension(ExportFormat::Png.extension());
            warn!("no encoder for {}, writing {}", path.display(), png.display());
            (png, ExportFormat::Png)
        }
    }
}

/// An explicit `--config` must exist; the implicit `mosaic.toml` is optional.
fn resolve_config(
    explicit: Option<&Path>,
    input: &Path,
) -> Result<config::MosaicConfig, config::ConfigError> {
    match explicit {
        Some(path) => config::load_config_file(path),
        None => {
            let dir = input
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            config::load_config(dir)
        }
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores: the user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
