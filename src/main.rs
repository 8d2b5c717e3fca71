use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use studiofx::engine::{AudioEnhancer, EnhanceJob, JobState, Pipeline};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: studiofx <input.wav> [--config chain.json] [--out-dir DIR] [--name NAME] [--overwrite]";

struct Args {
    input: PathBuf,
    config: Option<PathBuf>,
    out_dir: Option<PathBuf>,
    name: Option<String>,
    overwrite: bool,
}

fn parse_args() -> Result<Args> {
    let mut input = None;
    let mut config = None;
    let mut out_dir = None;
    let mut name = None;
    let mut overwrite = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config = Some(PathBuf::from(args.next().context("--config needs a path")?)),
            "--out-dir" => out_dir = Some(PathBuf::from(args.next().context("--out-dir needs a path")?)),
            "--name" => name = Some(args.next().context("--name needs a value")?),
            "--overwrite" => overwrite = true,
            "-h" | "--help" => bail!(USAGE),
            flag if flag.starts_with("--") => bail!("unknown flag {}\n{}", flag, USAGE),
            _ if input.is_none() => input = Some(PathBuf::from(arg)),
            _ => bail!("unexpected argument {}\n{}", arg, USAGE),
        }
    }

    Ok(Args {
        input: input.context(USAGE)?,
        config,
        out_dir,
        name,
        overwrite,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = parse_args()?;

    let pipeline = match &args.config {
        Some(path) => Pipeline::load(path).await?,
        None => Pipeline::studio_preset(),
    };
    let out_dir = match args.out_dir {
        Some(dir) => dir,
        None => args
            .input
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".")),
    };

    let mut job = EnhanceJob::new(AudioEnhancer::new(pipeline), out_dir);
    let proposed = job.select(&args.input)?;
    let name = args.name.as_deref().unwrap_or(&proposed);

    if let JobState::DuplicateFound { target, .. } = job.confirm(Some(name))? {
        if !args.overwrite {
            let target = target.display().to_string();
            job.cancel()?;
            bail!("{} already exists; pass --overwrite to replace it", target);
        }
        job.overwrite()?;
    }

    let report = job.run().await?;
    println!("Wrote {}", report.output.display());
    println!("  format:  {}", report.format);
    println!("  frames:  {}", report.frames);
    println!(
        "  clipped: {} of {} samples",
        report.samples_clipped, report.samples_processed
    );

    Ok(())
}
