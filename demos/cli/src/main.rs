use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{error, info, warn};

use vrmlx::{
    config::Config, convert::Converter, executor::Executor,
    mesh::output::ExportFormat,
};

/// Converts VRML 2.0 scenes into triangle meshes
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(subcommand)]
    cmd: Command,

    /// JSON configuration file (overrides `config.json` in bulk mode)
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Number of threads to use (overrides the configured parallelism)
    #[clap(short, long)]
    threads: Option<NonZeroUsize>,

    /// Output format (overrides the configured `exportFormat`)
    #[clap(short, long)]
    format: Option<ExportFormat>,
}

#[derive(Subcommand)]
enum Command {
    /// Converts a single file
    Convert {
        /// Input `.wrl` file
        input: PathBuf,

        /// Output mesh file; defaults to the input path with a new extension
        #[clap(short, long)]
        out: Option<PathBuf>,
    },
    /// Converts every `.wrl` file in a folder
    Bulk {
        /// Input folder, optionally containing a `config.json`
        input: PathBuf,

        /// Output folder, created if missing
        output: PathBuf,
    },
}

////////////////////////////////////////////////////////////////////////////////

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(p) => Config::from_file(p)
            .with_context(|| format!("failed to load config {p:?}")),
        None => Ok(Config::default()),
    }
}

fn build_converter(args: &Args, mut config: Config) -> Result<Converter> {
    if let Some(f) = args.format {
        config.export_format = f;
    }
    let mut conv = Converter::new(config)?;
    if let Some(n) = args.threads {
        conv.set_executor(Executor::new(n.get())?);
    }
    Ok(conv)
}

fn output_path(input: &Path, dir: Option<&Path>, format: ExportFormat) -> PathBuf {
    let mut out = match (dir, input.file_name()) {
        (Some(d), Some(name)) => d.join(name),
        _ => input.to_owned(),
    };
    out.set_extension(format.extension());
    out
}

fn convert_one(conv: &Converter, input: &Path, out: &Path) -> Result<()> {
    let start = Instant::now();
    let mesh = conv
        .convert_to_file(input, out)
        .with_context(|| format!("failed to convert {input:?}"))?;
    info!(
        "{input:?} -> {out:?}: {} vertices, {} triangles in {:?}",
        mesh.vertices.len(),
        mesh.triangles.len(),
        start.elapsed()
    );
    Ok(())
}

fn run_bulk(args: &Args, input: &Path, output: &Path) -> Result<()> {
    if !input.is_dir() {
        bail!("{input:?} is not a folder");
    }
    let default_cfg = input.join("config.json");
    let cfg_path = match &args.config {
        Some(p) => Some(p.clone()),
        None if default_cfg.is_file() => Some(default_cfg),
        None => {
            warn!("no config.json in {input:?}; using defaults");
            None
        }
    };
    let conv = build_converter(args, load_config(cfg_path.as_deref())?)?;
    std::fs::create_dir_all(output)
        .with_context(|| format!("failed to create {output:?}"))?;

    let mut files = vec![];
    for entry in std::fs::read_dir(input)? {
        let path = entry?.path();
        let is_wrl = path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("wrl"));
        if path.is_file() && is_wrl {
            files.push(path);
        }
    }
    files.sort();

    let start = Instant::now();
    let mut failed = 0;
    for f in &files {
        let out = output_path(f, Some(output), conv.config().export_format);
        if let Err(e) = convert_one(&conv, f, &out) {
            failed += 1;
            error!("{e:?}");
        }
    }
    info!(
        "converted {}/{} file(s) in {:?}",
        files.len() - failed,
        files.len(),
        start.elapsed()
    );
    if failed > 0 {
        bail!("{failed} file(s) failed to convert");
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .init();

    let args = Args::parse();
    match &args.cmd {
        Command::Convert { input, out } => {
            let conv =
                build_converter(&args, load_config(args.config.as_deref())?)?;
            let out = out.clone().unwrap_or_else(|| {
                output_path(input, None, conv.config().export_format)
            });
            convert_one(&conv, input, &out)
        }
        Command::Bulk { input, output } => run_bulk(&args, input, output),
    }
}
