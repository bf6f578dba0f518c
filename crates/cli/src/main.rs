#![deny(warnings)]

use anyhow::Context;
use bytes::Bytes;
use clap::{Parser, ValueEnum};
use emotion_timeline_core::classify::ProsodyEmotionModel;
use emotion_timeline_core::config::{
    resolve_chunk_duration, resolve_parallelism, AnalysisConfig, Env, StdEnv,
};
use emotion_timeline_core::decode::{AudioFormat, SymphoniaDecoder};
use emotion_timeline_core::pipeline::{AnalysisReport, Analyzer};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Wav,
    Mp3,
}

impl From<FormatArg> for AudioFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Wav => AudioFormat::Wav,
            FormatArg::Mp3 => AudioFormat::Mp3,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "emotion-timeline")]
#[command(about = "Emotion timeline analysis for speech recordings (chunk->classify->merge)")]
struct Args {
    /// Audio file to analyze (.wav or .mp3).
    input: PathBuf,

    /// Container format. Defaults to the declared file extension.
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Analysis window length in seconds.
    #[arg(long)]
    chunk_secs: Option<f64>,

    /// Maximum concurrent model invocations.
    #[arg(long)]
    parallelism: Option<usize>,

    /// Pretty-print the JSON report.
    #[arg(long, default_value_t = false)]
    pretty: bool,

    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let env = StdEnv;
    let config = build_config(&args, &env)?;
    let format = declared_format(&args.input, args.format)?;

    tracing::info!(
        input = %args.input.display(),
        %format,
        chunk_secs = config.chunk_duration.secs(),
        parallelism = config.parallelism.get(),
        "config loaded"
    );

    let bytes = tokio::fs::read(&args.input)
        .await
        .with_context(|| format!("failed to read {}", args.input.display()))?;

    let analyzer = Analyzer::new(
        Arc::new(SymphoniaDecoder::default()),
        Arc::new(ProsodyEmotionModel::new()),
        config,
    );
    let result = analyzer.analyze(Bytes::from(bytes), format).await?;
    let report = AnalysisReport::from_result(&result);

    let json = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{json}");

    Ok(())
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(
            level
                .parse()
                .with_context(|| format!("invalid --log-level: {level}"))?,
        )
        .from_env_lossy();

    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

fn build_config(args: &Args, env: &impl Env) -> anyhow::Result<AnalysisConfig> {
    let chunk_duration = resolve_chunk_duration(args.chunk_secs, env)?;
    let parallelism = resolve_parallelism(args.parallelism, env)?;
    Ok(AnalysisConfig {
        chunk_duration,
        parallelism,
    })
}

/// The decoder wants a declared content type, not sniffed bytes. Without
/// --format, the file extension is taken as the caller's declaration.
fn declared_format(path: &Path, arg: Option<FormatArg>) -> anyhow::Result<AudioFormat> {
    if let Some(arg) = arg {
        return Ok(arg.into());
    }
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("wav") => Ok(AudioFormat::Wav),
        Some("mp3") => Ok(AudioFormat::Mp3),
        other => anyhow::bail!(
            "cannot infer audio format from extension {:?}; pass --format wav|mp3",
            other
        ),
    }
}
