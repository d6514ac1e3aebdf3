use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context as _;
use clap::{ArgAction, Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "stagecast",
    version,
    about = "Render a frame range of a stage through a scene camera into image files",
    allow_negative_numbers = true
)]
struct Cli {
    /// Output image width.
    #[arg(long, default_value_t = 512)]
    width: u32,

    /// Output image height.
    #[arg(long, default_value_t = 512)]
    height: u32,

    /// Output path template with one printf-style frame conversion (e.g. `%04d`).
    #[arg(short, long, default_value = "output_%04d.png")]
    output: String,

    /// First frame, inclusive.
    #[arg(long = "firstframe", visible_alias = "ff", default_value_t = 1)]
    first_frame: i64,

    /// Last frame, inclusive.
    #[arg(long = "lastframe", visible_alias = "lf", default_value_t = 1)]
    last_frame: i64,

    /// Worker threads: 0 uses every core, negative values leave that many cores free.
    #[arg(short = 'n', long = "numThreads", default_value_t = 0)]
    num_threads: i32,

    /// Render-root prim path.
    #[arg(short, long, default_value = "/")]
    select: String,

    /// Camera prim path (required).
    #[arg(short, long, default_value = "")]
    camera: String,

    /// Tessellation complexity in [1.0, 2.0].
    #[arg(long, default_value_t = 1.0)]
    complexity: f64,

    /// Renderer backend.
    #[arg(short, long, value_enum, default_value_t = RendererArg::Opt)]
    renderer: RendererArg,

    /// Draw mode.
    #[arg(long, value_enum, default_value_t = DrawModeArg::ShadedSmooth)]
    draw_mode: DrawModeArg,

    /// Face culling.
    #[arg(long, value_enum, default_value_t = CullStyleArg::BackUnlessDoubleSided)]
    cull_style: CullStyleArg,

    /// How the camera window is fitted to the output aspect ratio.
    #[arg(long, value_enum, default_value_t = ConformArg::MatchVertically)]
    conform: ConformArg,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Stage file to render.
    stagefile: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum RendererArg {
    Opt,
    Simple,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum DrawModeArg {
    ShadedSmooth,
    ShadedFlat,
    Wireframe,
    WireframeOnSurface,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum CullStyleArg {
    Nothing,
    Back,
    Front,
    BackUnlessDoubleSided,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ConformArg {
    MatchVertically,
    MatchHorizontally,
    Fit,
    Crop,
    DontConform,
}

impl Cli {
    fn render_config(&self) -> stagecast::RenderConfig {
        stagecast::RenderConfig {
            width: self.width,
            height: self.height,
            output: self.output.clone(),
            first_frame: self.first_frame,
            last_frame: self.last_frame,
            threads: self.num_threads,
            select: self.select.clone(),
            camera: self.camera.clone(),
            complexity: self.complexity,
            renderer: match self.renderer {
                RendererArg::Opt => stagecast::RendererKind::Opt,
                RendererArg::Simple => stagecast::RendererKind::Simple,
            },
            draw_mode: match self.draw_mode {
                DrawModeArg::ShadedSmooth => stagecast::DrawMode::ShadedSmooth,
                DrawModeArg::ShadedFlat => stagecast::DrawMode::ShadedFlat,
                DrawModeArg::Wireframe => stagecast::DrawMode::Wireframe,
                DrawModeArg::WireframeOnSurface => stagecast::DrawMode::WireframeOnSurface,
            },
            cull_style: match self.cull_style {
                CullStyleArg::Nothing => stagecast::CullStyle::Nothing,
                CullStyleArg::Back => stagecast::CullStyle::Back,
                CullStyleArg::Front => stagecast::CullStyle::Front,
                CullStyleArg::BackUnlessDoubleSided => stagecast::CullStyle::BackUnlessDoubleSided,
            },
            conform: match self.conform {
                ConformArg::MatchVertically => stagecast::ConformPolicy::MatchVertically,
                ConformArg::MatchHorizontally => stagecast::ConformPolicy::MatchHorizontally,
                ConformArg::Fit => stagecast::ConformPolicy::Fit,
                ConformArg::Crop => stagecast::ConformPolicy::Crop,
                ConformArg::DontConform => stagecast::ConformPolicy::DontConform,
            },
        }
    }

    fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}

/// Rewrite the single-dash `-ff` / `-lf` spellings to their long aliases.
fn normalize_legacy_flags(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    args.into_iter()
        .map(|arg| {
            let Some(s) = arg.to_str() else {
                return arg;
            };
            for legacy in ["-ff", "-lf"] {
                if s == legacy {
                    return OsString::from(format!("-{legacy}"));
                }
                if let Some(value) = s.strip_prefix(legacy).and_then(|r| r.strip_prefix('=')) {
                    return OsString::from(format!("-{legacy}={value}"));
                }
            }
            arg
        })
        .collect()
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = cli.render_config();
    config.validate().context("invalid arguments")?;

    let stage = stagecast::Stage::open(&cli.stagefile)
        .with_context(|| format!("open stage '{}'", cli.stagefile.display()))?;
    let stats = stagecast::render_sequence(config, stage).context("render failed")?;

    for report in &stats.reports {
        if let Some(path) = &report.path {
            eprintln!("wrote {}", path.display());
        }
    }
    if stats.frames_total == 0 {
        eprintln!(
            "no frames rendered (first frame {} is after last frame {})",
            cli.first_frame, cli.last_frame
        );
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse_from(normalize_legacy_flags(std::env::args_os()));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(cli.log_level())
        .with_target(false)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/args.rs"]
mod tests;
