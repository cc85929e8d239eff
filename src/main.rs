//! Binary entrypoint for the slideshow.
//!
//! Resolves settings and the image list, then hands the window loop to the
//! library.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser};
use rust_slideshow::config::Settings;
use rust_slideshow::events::ReturnRequest;
use rust_slideshow::last_dir;
use rust_slideshow::scan::{self, SortOrder};
use rust_slideshow::tasks::viewer::{self, ViewerOutcome};
use tokio_util::sync::CancellationToken;
use tracing::{Level, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Debug, Parser)]
#[command(name = "slideshow", version, about = "Fullscreen crossfading slideshow")]
struct Args {
    /// Directory of images; defaults to the last one shown
    #[arg(value_name = "DIRECTORY")]
    directory: Option<PathBuf>,

    /// Path to YAML settings file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Seconds each slide stays on screen
    #[arg(long, value_name = "SECS")]
    display: Option<f64>,

    /// Crossfade length in seconds (0 disables blending)
    #[arg(long, value_name = "SECS")]
    transition: Option<f64>,

    /// Blended frames per crossfade
    #[arg(long, value_name = "N")]
    steps: Option<u32>,

    /// Index of the first slide
    #[arg(long, value_name = "N")]
    start: Option<usize>,

    /// Stop after the last slide instead of wrapping around
    #[arg(long)]
    no_loop: bool,

    /// File ordering (defaults to the platform's file manager order)
    #[arg(long, value_enum)]
    order: Option<SortOrder>,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    // map -v to log level
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"))
        .add_directive(format!("rust_slideshow={level}").parse()?)
        .add_directive(format!("slideshow={level}").parse()?)
        .add_directive("wgpu=warn".parse()?)
        .add_directive("winit=warn".parse()?);
    fmt().with_env_filter(filter).with_target(false).compact().init();
    Ok(())
}

fn seconds(flag: &str, secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs).with_context(|| format!("--{flag} must be a non-negative number of seconds"))
}

fn settings(args: &Args) -> Result<Settings> {
    let mut settings = match &args.config {
        Some(path) => Settings::from_yaml_file(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };
    if let Some(secs) = args.display {
        settings.display_duration = seconds("display", secs)?;
    }
    if let Some(secs) = args.transition {
        settings.transition_duration = seconds("transition", secs)?;
    }
    if let Some(steps) = args.steps {
        settings.transition_steps = steps;
    }
    if let Some(start) = args.start {
        settings.start_index = start;
    }
    if args.no_loop {
        settings.loop_slides = false;
    }
    if args.order.is_some() {
        settings.sort_order = args.order;
    }
    settings.validated().context("invalid slideshow settings")
}

fn resume_command(req: &ReturnRequest) -> String {
    format!(
        "slideshow {:?} --display {} --transition {}",
        req.directory,
        req.display_duration.as_secs_f64(),
        req.transition_duration.as_secs_f64()
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose)?;

    let settings = settings(&args)?;
    let Some(dir) = args
        .directory
        .clone()
        .or_else(|| settings.photo_directory.clone())
        .or_else(last_dir::load)
    else {
        bail!("no directory given and no previous directory remembered");
    };

    let order = settings.sort_order();
    let images = scan::scan_directory(&dir, order).with_context(|| format!("failed to scan {}", dir.display()))?;
    info!(dir = %dir.display(), count = images.len(), ?order, "scanned images");
    let cfg = settings.slideshow(images, dir.clone())?;

    if let Err(err) = last_dir::store(&dir) {
        warn!(error = %err, "could not remember directory");
    }

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!("ctrl-c handler failed: {err}");
                return;
            }
            info!("ctrl-c received; closing slideshow");
            cancel.cancel();
        });
    }

    let outcome = viewer::run_windowed(cfg, cancel.clone()).context("viewer failed")?;
    cancel.cancel();

    match outcome {
        ViewerOutcome::Quit => info!("slideshow closed"),
        ViewerOutcome::Finished => info!("slideshow reached the end"),
        ViewerOutcome::Return(req) => {
            info!(
                dir = %req.directory.display(),
                display = %humantime::format_duration(req.display_duration),
                transition = %humantime::format_duration(req.transition_duration),
                "returned to launcher"
            );
            println!("{}", resume_command(&req));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let args = Args::parse_from(["slideshow", "/photos", "--display", "2.5", "--transition", "0", "--no-loop"]);
        let s = settings(&args).unwrap();
        assert_eq!(s.display_duration, Duration::from_millis(2500));
        assert!(s.transition_duration.is_zero());
        assert!(!s.loop_slides);
        assert_eq!(s.transition_steps, 30);
    }

    #[test]
    fn zero_display_is_rejected() {
        let args = Args::parse_from(["slideshow", "--display", "0"]);
        assert!(settings(&args).is_err());
    }

    #[test]
    fn negative_seconds_are_rejected() {
        assert!(seconds("display", -1.0).is_err());
    }

    #[test]
    fn resume_command_carries_settings() {
        let req = ReturnRequest {
            directory: PathBuf::from("/photos"),
            display_duration: Duration::from_secs(7),
            transition_duration: Duration::from_millis(500),
        };
        assert_eq!(
            resume_command(&req),
            "slideshow \"/photos\" --display 7 --transition 0.5"
        );
    }
}
