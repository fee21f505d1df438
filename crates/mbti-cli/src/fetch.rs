//! Download the sentence-transformers embedding model from the Hugging Face hub.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

pub const HF_BASE_URL: &str = "https://huggingface.co";

const HF_ORG: &str = "sentence-transformers";

/// `(path inside the model repo, local file name)`.
const MODEL_FILES: &[(&str, &str)] = &[
    ("onnx/model.onnx", "model.onnx"),
    ("tokenizer.json", "tokenizer.json"),
];

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} returned {status}")]
    Server { url: String, status: u16 },
    #[error("writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Default)]
pub struct FetchStats {
    pub downloaded: usize,
    pub skipped: usize,
    pub bytes: u64,
}

/// Download URL for one file of `model`.
pub fn file_url(base_url: &str, model: &str, remote_path: &str) -> String {
    format!(
        "{}/{HF_ORG}/{model}/resolve/main/{remote_path}",
        base_url.trim_end_matches('/')
    )
}

/// Fetch `model.onnx` and `tokenizer.json` into `dest_dir`.
///
/// Files already present are kept unless `force` is set. Each file is
/// written to a temporary name and renamed into place once complete.
pub async fn fetch_embedding_model(
    base_url: &str,
    model: &str,
    dest_dir: &Path,
    force: bool,
) -> Result<FetchStats, FetchError> {
    tokio::fs::create_dir_all(dest_dir)
        .await
        .map_err(|source| FetchError::Io {
            path: dest_dir.to_path_buf(),
            source,
        })?;

    let client = reqwest::Client::new();
    let mut stats = FetchStats::default();

    for &(remote, local) in MODEL_FILES {
        let dest = dest_dir.join(local);
        if dest.exists() && !force {
            info!(path = %dest.display(), "already present, skipping");
            stats.skipped += 1;
            continue;
        }

        let url = file_url(base_url, model, remote);
        info!(url = %url, "downloading");
        let resp = client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Server {
                url,
                status: status.as_u16(),
            });
        }
        let body = resp.bytes().await?;
        store(&dest, &body).await?;

        info!(path = %dest.display(), bytes = body.len(), "saved");
        stats.downloaded += 1;
        stats.bytes += body.len() as u64;
    }

    Ok(stats)
}

/// Write `body` next to `dest` and rename it into place. The partial file
/// is removed if either step fails.
async fn store(dest: &Path, body: &[u8]) -> Result<(), FetchError> {
    let partial = dest.with_extension("part");
    let written = match tokio::fs::write(&partial, body).await {
        Ok(()) => tokio::fs::rename(&partial, dest).await,
        Err(e) => Err(e),
    };
    if let Err(source) = written {
        if let Err(e) = tokio::fs::remove_file(&partial).await {
            warn!(path = %partial.display(), error = %e, "could not remove partial download");
        }
        return Err(FetchError::Io {
            path: dest.to_path_buf(),
            source,
        });
    }
    Ok(())
}
