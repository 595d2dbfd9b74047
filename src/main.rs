mod cli;
mod config;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use cli::{Cli, OutputFormat};
use pitchscope::audio::decode::decode_audio;
use pitchscope::audio::features::{describe_frame, describe_spectrum, FrameReport, Spectrum};
use pitchscope::audio::source::SampleSlice;
use pitchscope::audio::timeline::{analyze_timeline, frame_times};
use pitchscope::util::range::NumberRange;
use pitchscope::{AudioFile, BandScale, PeakDetector, Playhead, SpectralAnalyzer};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut cli = Cli::parse();

    // Explicit --config path, or auto-detect pitchscope.toml / user config
    let config_path = cli.config.clone().or_else(config::find_config);
    if let Some(ref path) = config_path {
        if let Some(cfg) = config::load_config(path) {
            log::info!("Loaded config from {}", path.display());
            // Config values apply only when the CLI is at its default
            if cli.resolution == 12 { cli.resolution = cfg.analysis.resolution; }
            if cli.smoothing == 0.8 { cli.smoothing = cfg.analysis.smoothing; }
            if cli.threshold == 0.1 { cli.threshold = cfg.analysis.threshold; }
            if cli.min_freq == 27.5 { cli.min_freq = cfg.band.min_frequency; }
            if cli.max_freq == 4200.0 { cli.max_freq = cfg.band.max_frequency; }
            if cli.fps == 30 { cli.fps = cfg.output.fps; }
            if cli.format == OutputFormat::Text { cli.format = cfg.output.format; }
        } else {
            log::warn!("Failed to load config from {}", path.display());
        }
    }

    if !cli.input.exists() {
        anyhow::bail!("Input file not found: {}", cli.input.display());
    }
    if cli.fps == 0 {
        anyhow::bail!("--fps must be at least 1");
    }

    let scale = BandScale::new(NumberRange::new(cli.min_freq, cli.max_freq))
        .context("Invalid frequency band")?;
    let detector = PeakDetector::new(cli.threshold).context("Invalid peak threshold")?;

    log::info!("pitchscope - spectral note detection");
    log::info!("Input: {}", cli.input.display());
    log::info!(
        "Resolution: {} ({} bins), smoothing {:.2}, threshold {:.2}",
        cli.resolution,
        1u64 << cli.resolution.min(63),
        cli.smoothing,
        cli.threshold
    );

    log::info!("Decoding audio...");
    let decoded = decode_audio(&cli.input)
        .with_context(|| format!("Failed to decode {}", cli.input.display()))?;
    let sample_rate = decoded.sample_rate;
    let duration = decoded.duration();

    let span = NumberRange::new(cli.start, cli.end.unwrap_or(duration))
        .trimmed_to_range(&NumberRange::new(0.0, duration));
    if span.end < span.start {
        anyhow::bail!(
            "Empty time span: {:.3}s..{:.3}s (file is {:.3}s long)",
            cli.start,
            cli.end.unwrap_or(duration),
            duration
        );
    }
    let times = frame_times(span, cli.fps as f64);
    log::info!(
        "Analysing {:.3}s..{:.3}s: {} frames @ {}fps",
        span.start,
        span.end,
        times.len(),
        cli.fps
    );

    let pb = match cli.format {
        OutputFormat::Text => {
            let pb = ProgressBar::new(times.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} frames ({eta} remaining)")
                    .context("Invalid progress bar template")?
                    .progress_chars("=>-"),
            );
            pb
        }
        OutputFormat::Json => ProgressBar::hidden(),
    };

    if cli.parallel {
        let mono = decoded.channels.first().map(Vec::as_slice).unwrap_or_default();
        let timeline = analyze_timeline(
            &SampleSlice::new(mono, sample_rate),
            &times,
            cli.resolution,
            cli.smoothing,
        )
        .context("Timeline analysis failed")?;

        for frame in &timeline {
            let spectrum = Spectrum {
                magnitudes: &frame.magnitudes,
                raw: &frame.raw,
                sample_rate,
            };
            let report = describe_spectrum(&spectrum, &scale, &detector, frame.time, frame.outcome);
            emit(&report, cli.format, &pb)?;
            pb.inc(1);
        }
    } else {
        let file = AudioFile::new(decoded);
        let mut analyzer = SpectralAnalyzer::with_settings(sample_rate, cli.resolution, cli.smoothing)
            .context("Invalid analyzer settings")?;
        let mut playhead = Playhead::new(duration);

        for &time in &times {
            playhead.seek(time);
            let outcome = analyzer.re_analyze(&file, &playhead);
            let report = describe_frame(&analyzer, &scale, &detector, time, outcome);
            emit(&report, cli.format, &pb)?;
            pb.inc(1);
        }
    }

    pb.finish_with_message("Analysis complete");
    log::info!("Done! {} frames", times.len());
    Ok(())
}

fn emit(report: &FrameReport, format: OutputFormat, pb: &ProgressBar) -> Result<()> {
    let line = match format {
        OutputFormat::Text => format_text(report),
        OutputFormat::Json => serde_json::to_string(report).context("Failed to serialize frame")?,
    };
    pb.suspend(|| println!("{}", line));
    Ok(())
}

fn format_text(report: &FrameReport) -> String {
    let notes = if report.notes.is_empty() {
        "-".to_string()
    } else {
        report.notes.join(" ")
    };
    format!("{:9.3}s  {}", report.time, notes)
}
