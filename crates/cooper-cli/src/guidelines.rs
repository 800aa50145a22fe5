//! `guidelines` command: index a brand guidelines file into Pinecone.

use std::path::Path;
use std::time::Duration;

use cooper_core::AppConfig;
use cooper_pipeline::GuidelineStore;

/// Chunk, embed and upsert the guidelines at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read, TEI or Pinecone is not
/// configured, or either service rejects the request.
pub(crate) async fn run_index_guidelines(config: &AppConfig, path: &Path) -> anyhow::Result<()> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| anyhow::anyhow!("cannot read {}: {e}", path.display()))?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .user_agent(&config.user_agent)
        .build()?;
    let store = GuidelineStore::from_config(&client, config)?;
    if !store.has_remote() {
        anyhow::bail!("COOPER_TEI_URL, PINECONE_INDEX_HOST and PINECONE_API_KEY must be set");
    }

    let written = store.index(&text).await?;
    println!(
        "indexed {written} guideline chunks into namespace '{}'",
        config.pinecone_namespace
    );
    Ok(())
}
