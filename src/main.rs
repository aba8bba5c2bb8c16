mod cli;
mod config;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};

use cepstra::audio::{decode, resample, spectrogram};
use cepstra::{FramingParams, MfccAnalysis, PipelineConfig};
use cli::{Cli, OutputFormat};

/// Fully merged run settings (CLI over config file over defaults)
#[derive(Debug)]
struct Settings {
    framing: FramingParams,
    pipeline: PipelineConfig,
    resample_rate: Option<u32>,
    format: OutputFormat,
    spectrogram: bool,
}

#[derive(Serialize)]
struct Report {
    input: PathBuf,
    duration: f64,
    #[serde(flatten)]
    analysis: MfccAnalysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    spectrogram_db: Option<Vec<Vec<f64>>>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    // Load config: explicit --config path, or auto-detect cepstra.toml / global config
    let config_path = cli.config.clone().or_else(|| {
        let local = PathBuf::from("cepstra.toml");
        if local.exists() {
            return Some(local);
        }
        if let Some(home) = dirs::home_dir() {
            let xdg = home.join(".config").join("cepstra").join("config.toml");
            if xdg.exists() {
                return Some(xdg);
            }
        }
        if let Some(config_dir) = dirs::config_dir() {
            let platform = config_dir.join("cepstra").join("config.toml");
            if platform.exists() {
                return Some(platform);
            }
        }
        None
    });

    let cfg = match config_path {
        Some(ref path) => match config::load_config(path) {
            Some(cfg) => {
                log::info!("Loaded config from {}", path.display());
                cfg
            }
            None => {
                log::warn!("Failed to load config from {}", path.display());
                config::Config::default()
            }
        },
        None => config::Config::default(),
    };

    let settings = merge_settings(&cli, &cfg);
    log::debug!("Settings: {:?}", settings);

    // Validate up front so a bad flag fails once, not once per file
    settings
        .pipeline
        .validate()
        .context("Invalid pipeline parameters")?;

    let pb = ProgressBar::new(cli.inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} files ({eta} remaining)")
            .unwrap()
            .progress_chars("=>-"),
    );

    let results: Vec<(PathBuf, Result<Report>)> = cli
        .inputs
        .par_iter()
        .map(|input| {
            let report = extract(input, &settings);
            pb.inc(1);
            (input.clone(), report)
        })
        .collect();

    pb.finish_and_clear();

    let mut reports = Vec::with_capacity(results.len());
    let mut failures = 0;
    for (input, result) in results {
        match result {
            Ok(report) => reports.push(report),
            Err(err) => {
                failures += 1;
                log::error!("{}: {:#}", input.display(), err);
            }
        }
    }

    match settings.format {
        OutputFormat::Summary => {
            for report in &reports {
                print_summary(report);
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string(&reports).context("Failed to serialize output")?;
            println!("{}", json);
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} inputs failed", failures, cli.inputs.len());
    }
    Ok(())
}

fn merge_settings(cli: &Cli, cfg: &config::Config) -> Settings {
    let mut framing = FramingParams::from(&cfg.framing);
    let mut pipeline = PipelineConfig::from(&cfg.pipeline);

    if let Some(ms) = cli.frame_ms { framing.frame_duration_ms = ms; }
    if let Some(overlap) = cli.overlap { framing.overlap_percent = overlap; }
    if let Some(n) = cli.nfft { pipeline.nfft = n; }
    if let Some(n) = cli.n_mels { pipeline.n_mels = n; }
    if let Some(n) = cli.num_ceps { pipeline.num_ceps = n; }
    if let Some(eps) = cli.epsilon { pipeline.epsilon = eps; }
    if let Some(norm) = cli.mel_norm { pipeline.mel_norm = norm; }

    let resample_rate = match cli.resample {
        Some(target) => target.rate(),
        None => cfg.audio.resample_rate,
    };

    Settings {
        framing,
        pipeline,
        resample_rate,
        format: cli.format.unwrap_or(cfg.output.format),
        spectrogram: cli.spectrogram || cfg.output.spectrogram,
    }
}

/// Decode, optionally resample, and run the MFCC pipeline for one file.
fn extract(input: &Path, settings: &Settings) -> Result<Report> {
    let mut waveform = decode::decode_file(input)
        .with_context(|| format!("Failed to decode audio file: {}", input.display()))?;

    if let Some(rate) = settings.resample_rate {
        waveform = resample::resample(&waveform, rate).context("Resampling failed")?;
    }

    let analysis = cepstra::analyze(&waveform, &settings.framing, &settings.pipeline)
        .context("MFCC extraction failed")?;

    let spectrogram_db = if settings.spectrogram {
        Some(spectrogram::spectrogram_db(
            &waveform.samples,
            spectrogram::DEFAULT_N_FFT,
            spectrogram::DEFAULT_HOP,
        )?)
    } else {
        None
    };

    Ok(Report {
        input: input.to_path_buf(),
        duration: waveform.duration(),
        analysis,
        spectrogram_db,
    })
}

fn print_summary(report: &Report) {
    let a = &report.analysis;
    println!("{}", report.input.display());
    println!(
        "  audio:    {} samples, {}Hz, {:.2}s",
        a.waveform.len(),
        a.sample_rate,
        report.duration
    );
    println!(
        "  frames:   {} (frame_size={}, hop_size={})",
        a.num_frames, a.frame_size, a.hop_size
    );
    println!(
        "  mel bank: {} x {} ({:?} norm)",
        a.mel_filters.n_mels(),
        a.mel_filters.num_bins(),
        a.mel_filters.norm()
    );
    println!("  mfcc:     {} x {}", a.num_frames, a.num_ceps());

    for k in 0..a.num_ceps() {
        let mean = a.mfcc.iter().map(|row| row[k]).sum::<f64>() / a.num_frames as f64;
        println!("    MFCC[{:2}]: mean={:>10.4}", k + 1, mean);
    }

    if let Some(ref spec) = report.spectrogram_db {
        let bins = spec.first().map_or(0, |row| row.len());
        println!("  spectrogram: {} x {} (dB)", spec.len(), bins);
    }
}
