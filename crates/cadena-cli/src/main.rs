//! cadena - offline WAV processing through effect racks.
//!
//! Three subcommands:
//!
//! - `effects` lists the catalog, grouped by category
//! - `inspect` prints the racks and parameters of a preset bank
//! - `process` runs a WAV file through a rack or bank, block by block,
//!   then renders the rack's decay tail

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use cadena_core::{Effect, ParamValue};
use cadena_rack::{EffectsManager, EffectsRack};
use cadena_registry::{EffectCatalog, EffectCategory};

/// Command-line interface for the cadena effects rack.
#[derive(Parser)]
#[command(name = "cadena", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every available effect.
    Effects,

    /// Print the contents of a preset bank (.axe) or rack (.rack) file.
    Inspect {
        /// File to inspect.
        file: PathBuf,
    },

    /// Process a WAV file through a rack or preset bank.
    Process {
        /// Input WAV file.
        #[arg(short, long)]
        input: PathBuf,

        /// Output WAV file (32-bit float).
        #[arg(short, long)]
        output: PathBuf,

        /// Single-rack file to process through.
        #[arg(long, conflicts_with = "bank")]
        rack: Option<PathBuf>,

        /// Preset-bank file to process through.
        #[arg(long)]
        bank: Option<PathBuf>,

        /// Rack index inside the bank (defaults to the bank's active rack).
        #[arg(long)]
        rack_index: Option<usize>,

        /// Frames per processing block.
        #[arg(long, default_value_t = 512)]
        block_size: usize,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    match Cli::parse().command {
        Command::Effects => list_effects(),
        Command::Inspect { file } => inspect(&file),
        Command::Process {
            input,
            output,
            rack,
            bank,
            rack_index,
            block_size,
        } => process(&input, &output, rack.as_deref(), bank.as_deref(), rack_index, block_size),
    }
}

fn list_effects() -> Result<()> {
    let catalog = EffectCatalog::new();
    for category in [
        EffectCategory::Utility,
        EffectCategory::Distortion,
        EffectCategory::Filter,
        EffectCategory::Modulation,
        EffectCategory::TimeBased,
        EffectCategory::Dynamics,
        EffectCategory::Analysis,
        EffectCategory::Drums,
    ] {
        let entries = catalog.in_category(category);
        if entries.is_empty() {
            continue;
        }
        println!("{}", category.name());
        for descriptor in entries {
            println!(
                "  [{:2}] {:<18} {}",
                descriptor.kind.tag(),
                descriptor.name,
                descriptor.description
            );
        }
    }
    Ok(())
}

fn format_value(value: ParamValue) -> String {
    match value {
        ParamValue::Float(v) => format!("{v:.2}"),
        ParamValue::Int(v) => v.to_string(),
        ParamValue::Bool(v) => if v { "on" } else { "off" }.to_string(),
    }
}

fn print_rack(rack: &EffectsRack) {
    println!("rack '{}' ({} effects)", rack.name(), rack.len());
    for (i, effect) in rack.effects().enumerate() {
        let settings = effect.settings();
        let state = if effect.is_enabled() { "on " } else { "off" };
        println!("  {i}: [{state}] {}", settings.effect_name());
        for param in settings.params() {
            println!(
                "        {:<12} {}{}",
                param.name(),
                format_value(param.value()),
                param.unit().suffix()
            );
        }
    }
}

fn inspect(file: &std::path::Path) -> Result<()> {
    let catalog = EffectCatalog::new();
    let is_bank = file
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("axe"));

    if is_bank {
        let manager = EffectsManager::new(48000.0);
        if !manager.load_file(file) {
            bail!("failed to load bank: {}", manager.take_errors().trim_end());
        }
        println!(
            "bank '{}', {} racks, active {:?}",
            manager.name(),
            manager.rack_count(),
            manager.active_rack_index()
        );
        for (i, name) in manager.rack_names().iter().enumerate() {
            manager.set_active_rack(i);
            println!("[{i}] {name}");
            for (kind, enabled) in manager.active_rack_effects() {
                let state = if enabled { "on " } else { "off" };
                println!("    [{state}] {}", kind.name());
            }
        }
    } else {
        let rack = EffectsRack::load_file(file, &catalog, 48000.0)
            .with_context(|| format!("failed to load rack {}", file.display()))?;
        print_rack(&rack);
    }
    Ok(())
}

fn process(
    input: &std::path::Path,
    output: &std::path::Path,
    rack: Option<&std::path::Path>,
    bank: Option<&std::path::Path>,
    rack_index: Option<usize>,
    block_size: usize,
) -> Result<()> {
    let mut reader = hound::WavReader::open(input)
        .with_context(|| format!("cannot open {}", input.display()))?;
    let spec = reader.spec();
    let channels = spec.channels as usize;
    let sample_rate = spec.sample_rate as f32;

    // Everything becomes f32 internally, whatever the container held
    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let scale = 1.0 / (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<_, _>>()?
        }
    };

    let manager = EffectsManager::new(sample_rate);
    match (rack, bank) {
        (Some(rack_path), None) => {
            let loaded =
                EffectsRack::load_file(rack_path, manager.catalog(), sample_rate)
                    .with_context(|| format!("failed to load rack {}", rack_path.display()))?;
            manager.add_rack(loaded.name());
            for effect in loaded.effects() {
                manager.add_effect(effect.kind());
            }
            // Carry settings and enable flags over onto the manager's copy
            for (i, effect) in loaded.effects().enumerate() {
                let settings = manager
                    .effect_settings(i)
                    .context("rack construction mismatch")?;
                settings.apply(&effect.settings().snapshot());
                manager.set_effect_enabled(i, effect.is_enabled());
            }
        }
        (None, Some(bank_path)) => {
            if !manager.load_file(bank_path) {
                bail!("failed to load bank: {}", manager.take_errors().trim_end());
            }
            if let Some(index) = rack_index
                && !manager.set_active_rack(index)
            {
                bail!("bank has no rack {index}");
            }
        }
        (None, None) => bail!("pass --rack or --bank to choose a chain"),
        (Some(_), Some(_)) => unreachable!("clap forbids --rack with --bank"),
    }

    let frames = samples.len() / channels;
    let progress = ProgressBar::new(frames as u64).with_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} frames ({eta})")?,
    );

    let writer_spec = hound::WavSpec {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(output, writer_spec)
        .with_context(|| format!("cannot create {}", output.display()))?;

    let mut buffer = samples;
    for block in buffer.chunks_mut(block_size * channels) {
        manager.process(block, channels);
        for &sample in block.iter() {
            writer.write_sample(sample)?;
        }
        progress.inc((block.len() / channels) as u64);
    }
    progress.finish_and_clear();

    // Ring out the tail (delay repeats, reverb decay) on silence
    let tail_frames = (manager.tail_seconds() * sample_rate).ceil() as usize;
    let mut silence = vec![0.0f32; block_size * channels];
    let mut remaining = tail_frames;
    while remaining > 0 {
        let frames_now = remaining.min(block_size);
        let block = &mut silence[..frames_now * channels];
        block.fill(0.0);
        manager.process(block, channels);
        for &sample in block.iter() {
            writer.write_sample(sample)?;
        }
        remaining -= frames_now;
    }

    writer.finalize()?;
    let errors = manager.take_errors();
    if !errors.is_empty() {
        bail!("processing finished with errors: {}", errors.trim_end());
    }
    println!(
        "wrote {} ({} frames + {} tail frames)",
        output.display(),
        frames,
        tail_frames
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn value_formatting() {
        assert_eq!(format_value(ParamValue::Float(1.234)), "1.23");
        assert_eq!(format_value(ParamValue::Int(7)), "7");
        assert_eq!(format_value(ParamValue::Bool(true)), "on");
    }
}
