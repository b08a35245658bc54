use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};

use pageflow_pdf::filename::document_filename;
use pageflow_pdf::input::{read_blocks, read_layout};
use pageflow_pdf::{
    Block, Error, FontChoice, Orientation, PageFormat, RenderOptions, StaticSurface,
};

#[derive(Parser)]
#[command(name = "pageflow-pdf")]
#[command(version)]
#[command(about = "Paginate semantic blocks or a rendered surface into a PDF", long_about = None)]
struct Cli {
    /// More logging (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Lay out a JSON array of blocks (heading, paragraph, key_value, spacer)
    Blocks {
        #[arg(value_name = "BLOCKS_JSON")]
        input: PathBuf,

        #[command(flatten)]
        common: CommonArgs,
    },
    /// Slice a pre-rendered image into pages
    Raster {
        #[arg(value_name = "IMAGE")]
        input: PathBuf,

        /// JSON layout tree describing the image (keep-together markers, headings)
        #[arg(long, value_name = "FILE")]
        layout: Option<PathBuf>,

        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    A4,
    Letter,
}

#[derive(Args)]
struct CommonArgs {
    /// Output file or directory
    #[arg(short, long, value_name = "PATH", default_value = ".")]
    output: PathBuf,

    /// File name used when the output is a directory; parts are joined with '_'
    #[arg(long, value_name = "PART", num_args = 1..)]
    name: Vec<String>,

    #[arg(long, value_enum, default_value = "a4")]
    format: FormatArg,

    #[arg(long)]
    landscape: bool,

    /// Page margin in millimetres
    #[arg(long, default_value_t = 10.0)]
    margin: f32,

    /// Raster render scale (surface pixels per layout unit)
    #[arg(long, default_value_t = 2.0)]
    scale: f32,

    /// TrueType/OpenType font for text (default: $PAGEFLOW_FONT, then Helvetica)
    #[arg(long, value_name = "FILE")]
    font: Option<PathBuf>,

    /// Bold companion of --font
    #[arg(long, value_name = "FILE", requires = "font")]
    bold_font: Option<PathBuf>,

    /// Body text size in points
    #[arg(long, value_name = "PT")]
    font_size: Option<f32>,

    /// Line height multiplier for body text
    #[arg(long, value_name = "FACTOR")]
    line_height: Option<f32>,

    /// Document title stored in the PDF metadata
    #[arg(long)]
    title: Option<String>,
}

impl CommonArgs {
    fn options(&self) -> RenderOptions {
        let mut options = RenderOptions {
            page_format: match self.format {
                FormatArg::A4 => PageFormat::A4,
                FormatArg::Letter => PageFormat::Letter,
            },
            orientation: if self.landscape {
                Orientation::Landscape
            } else {
                Orientation::Portrait
            },
            margin_mm: self.margin,
            scale: self.scale,
            title: self.title.clone(),
            font: match &self.font {
                Some(path) => FontChoice::File {
                    regular: path.clone(),
                    bold: self.bold_font.clone(),
                },
                None => FontChoice::from_env(),
            },
            ..Default::default()
        };
        if !self.name.is_empty() {
            let parts: Vec<&str> = self.name.iter().map(String::as_str).collect();
            options.filename = document_filename(&parts);
        }
        if let Some(size) = self.font_size {
            options.font_sizes.paragraph = size;
            options.font_sizes.key_value = size;
        }
        if let Some(factor) = self.line_height {
            options.line_heights.paragraph = factor;
            options.line_heights.key_value = factor;
        }
        options
    }
}

fn run(cli: Cli) -> Result<PathBuf, Error> {
    match cli.command {
        Command::Blocks { input, common } => {
            let blocks: Vec<Block> = read_blocks(&input)?;
            let mut options = common.options();
            if common.name.is_empty() {
                options.filename = stem_filename(&input);
            }
            pageflow_pdf::export_blocks(&blocks, &options, &common.output)
        }
        Command::Raster {
            input,
            layout,
            common,
        } => {
            let image = image::open(&input)
                .map_err(|e| Error::Render(format!("{}: {e}", input.display())))?
                .to_rgba8();
            let source = match layout {
                Some(path) => StaticSurface::new(image, read_layout(&path)?),
                None => StaticSurface::without_structure(image),
            };
            let mut options = common.options();
            if common.name.is_empty() {
                options.filename = stem_filename(&input);
            }
            pageflow_pdf::export_surface(&source, &options, &common.output)
        }
    }
}

fn stem_filename(input: &Path) -> String {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");
    document_filename(&[stem])
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(cli) {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
