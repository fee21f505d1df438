mod display;
mod fetch;
mod serve;

use std::io::Read;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use mbti_ai::{ArtifactPaths, EmbedderOptions, PredictError, Predictor};
use tracing_subscriber::EnvFilter;

use crate::display::{EMPTY_INPUT_WARNING, PredictionReport};

/// Predict a 4-letter MBTI type from free-form text.
#[derive(Parser)]
#[command(name = "mbti", version, about)]
struct Cli {
    #[command(flatten)]
    models: ModelArgs,

    #[command(subcommand)]
    command: Command,
}

/// Where the artifacts live.
#[derive(Args)]
struct ModelArgs {
    /// Directory containing one sub-directory per embedding model
    #[arg(long, global = true, env = "MBTI_MODELS_DIR", default_value = "models")]
    models_dir: PathBuf,

    /// Directory containing model_{IE,NS,TF,JP}.json
    #[arg(
        long,
        global = true,
        env = "MBTI_CLASSIFIERS_DIR",
        default_value = "mbti_models"
    )]
    classifiers_dir: PathBuf,

    /// Embedding model name (sub-directory of --models-dir)
    #[arg(
        long,
        global = true,
        env = "MBTI_EMBEDDING_MODEL",
        default_value = "all-MiniLM-L6-v2"
    )]
    embedding_model: String,

    /// Token limit for the embedder
    #[arg(long, global = true, env = "MBTI_MAX_LENGTH", default_value_t = 256)]
    max_length: usize,
}

impl ModelArgs {
    fn paths(&self) -> ArtifactPaths {
        ArtifactPaths::new(
            &self.models_dir,
            &self.embedding_model,
            &self.classifiers_dir,
        )
    }

    fn options(&self) -> EmbedderOptions {
        EmbedderOptions {
            max_length: self.max_length,
        }
    }

    fn load(&self) -> anyhow::Result<Predictor> {
        let paths = self.paths();
        Predictor::load(&paths, &self.options()).context("loading models")
    }
}

#[derive(Subcommand)]
enum Command {
    /// Predict the type code for TEXT (or stdin)
    Predict {
        text: Option<String>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
        /// Show per-axis confidences and the cleaned text
        #[arg(short, long)]
        verbose: bool,
    },
    /// Print the normalized form of TEXT (or stdin)
    Clean { text: Option<String> },
    /// Print the description for a type code
    Describe { code: String },
    /// Load every artifact and report whether prediction is possible
    Check,
    /// Download the embedding model from the Hugging Face hub
    Fetch {
        /// Re-download files that are already present
        #[arg(long)]
        force: bool,
        #[arg(long, env = "MBTI_HF_BASE_URL", default_value = fetch::HF_BASE_URL)]
        base_url: String,
    },
    /// Serve the web form
    Serve {
        #[arg(long, env = "MBTI_BIND", default_value = "127.0.0.1:8501")]
        bind: SocketAddr,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    tracing::info!("mbti v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();

    match cli.command {
        Command::Predict {
            text,
            json,
            verbose,
        } => {
            let text = text_or_stdin(text)?;
            run_predict(&cli.models, &text, json, verbose)?;
        }
        Command::Clean { text } => {
            let text = text_or_stdin(text)?;
            println!("{}", mbti_core::normalize(&text));
        }
        Command::Describe { code } => {
            println!("{}", mbti_core::describe(&code));
        }
        Command::Check => {
            let paths = cli.models.paths();
            let missing = paths.missing();
            for path in &missing {
                eprintln!("  missing: {}", path.display());
            }
            if !missing.is_empty() {
                anyhow::bail!(
                    "{} artifact(s) missing; run `mbti fetch` for the embedding model",
                    missing.len()
                );
            }
            let predictor = cli.models.load()?;
            println!(
                "OK: embedder {} (dim {}), classifiers in {}",
                paths.embedder_dir.display(),
                predictor.dim(),
                paths.classifier_dir.display()
            );
        }
        Command::Fetch { force, base_url } => {
            let dest = cli.models.paths().embedder_dir;
            let stats = fetch::fetch_embedding_model(
                &base_url,
                &cli.models.embedding_model,
                &dest,
                force,
            )
            .await
            .with_context(|| format!("fetching {}", cli.models.embedding_model))?;
            println!(
                "{} downloaded ({} bytes), {} already present in {}",
                stats.downloaded,
                stats.bytes,
                stats.skipped,
                dest.display()
            );
        }
        Command::Serve { bind } => {
            let predictor = Arc::new(cli.models.load()?);
            serve::serve(predictor, bind).await?;
        }
    }

    Ok(())
}

/// Blank input gets the warning without touching the artifacts.
fn run_predict(models: &ModelArgs, text: &str, json: bool, verbose: bool) -> anyhow::Result<()> {
    if mbti_core::is_blank(text) {
        eprintln!("{EMPTY_INPUT_WARNING}");
        return Ok(());
    }
    let predictor = models.load()?;
    let prediction = match predictor.predict(text) {
        Ok(p) => p,
        Err(PredictError::EmptyInput) => {
            eprintln!("{EMPTY_INPUT_WARNING}");
            return Ok(());
        }
        Err(e) => return Err(e).context("prediction failed"),
    };
    let report = PredictionReport::from(&prediction);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", display::render(&report, verbose));
    }
    Ok(())
}

/// The positional argument if given, otherwise all of stdin.
fn text_or_stdin(text: Option<String>) -> anyhow::Result<String> {
    match text {
        Some(text) => Ok(text),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading stdin")?;
            Ok(buf)
        }
    }
}
