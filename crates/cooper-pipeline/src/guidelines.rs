//! Brand guideline retrieval.
//!
//! Guidelines are split into paragraph chunks, embedded through TEI and
//! stored in Pinecone. Retrieval degrades to the local chunks when either
//! service is missing or failing.

use std::path::Path;

use cooper_core::AppConfig;

use crate::embeddings::TeiClient;
use crate::error::PipelineError;
use crate::vector_store::PineconeClient;

/// Split guideline text on blank lines into trimmed, non-empty chunks.
#[must_use]
pub fn chunk_guidelines(text: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            flush(&mut current, &mut chunks);
        } else {
            current.push(line.trim_end());
        }
    }
    flush(&mut current, &mut chunks);
    chunks
}

fn flush(current: &mut Vec<&str>, chunks: &mut Vec<String>) {
    let chunk = current.join("\n");
    let chunk = chunk.trim();
    if !chunk.is_empty() {
        chunks.push(chunk.to_string());
    }
    current.clear();
}

struct Remote {
    tei: TeiClient,
    pinecone: PineconeClient,
}

#[derive(Default)]
pub struct GuidelineStore {
    local: Vec<String>,
    remote: Option<Remote>,
}

impl GuidelineStore {
    /// Store answering only from in-memory chunks of `text`.
    #[must_use]
    pub fn local(text: &str) -> Self {
        Self {
            local: chunk_guidelines(text),
            remote: None,
        }
    }

    /// Attach TEI + Pinecone for indexing and semantic retrieval.
    #[must_use]
    pub fn with_remote(
        mut self,
        client: &reqwest::Client,
        tei_url: &str,
        pinecone_host: &str,
        pinecone_api_key: &str,
        namespace: &str,
    ) -> Self {
        self.remote = Some(Remote {
            tei: TeiClient::new(client.clone(), tei_url),
            pinecone: PineconeClient::new(client.clone(), pinecone_host, pinecone_api_key, namespace),
        });
        self
    }

    /// Build from configuration: local chunks from `brand_guidelines_path`
    /// and the remote store when TEI and Pinecone are both configured.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidInput`] if the guidelines file is set
    /// but cannot be read.
    pub fn from_config(client: &reqwest::Client, config: &AppConfig) -> Result<Self, PipelineError> {
        let store = match &config.brand_guidelines_path {
            Some(path) => Self::local(&read_guidelines(path)?),
            None => Self::default(),
        };

        Ok(
            match (&config.tei_url, &config.pinecone_index_host, &config.pinecone_api_key) {
                (Some(tei), Some(host), Some(key)) => {
                    store.with_remote(client, tei, host, key, &config.pinecone_namespace)
                }
                _ => store,
            },
        )
    }

    #[must_use]
    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Embed and upsert every chunk of `text`. Returns the number of chunks
    /// written.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::InvalidInput`] if no remote store is configured.
    /// - [`PipelineError::Tei`] / [`PipelineError::Pinecone`] on service failure.
    pub async fn index(&self, text: &str) -> Result<usize, PipelineError> {
        let Some(remote) = &self.remote else {
            return Err(PipelineError::InvalidInput(
                "TEI and Pinecone must be configured to index guidelines".to_string(),
            ));
        };

        let chunks = chunk_guidelines(text);
        if chunks.is_empty() {
            return Ok(0);
        }
        let refs: Vec<&str> = chunks.iter().map(String::as_str).collect();
        let embeddings = remote.tei.embed_chunks(&refs).await?;
        let written = remote.pinecone.upsert_chunks(&refs, embeddings).await?;
        tracing::info!(chunks = written, "indexed brand guidelines");
        Ok(written)
    }

    /// Up to `top_k` guideline chunks relevant to `query`.
    ///
    /// Never fails: remote errors or an empty index fall back to the first
    /// `top_k` local chunks.
    pub async fn relevant(&self, query: &str, top_k: usize) -> Vec<String> {
        if let Some(remote) = &self.remote {
            match semantic_search(remote, query, top_k).await {
                Ok(found) if !found.is_empty() => return found,
                Ok(_) => tracing::debug!("guideline index returned no matches"),
                Err(e) => tracing::warn!(error = %e, "guideline search failed, using local chunks"),
            }
        }
        self.local.iter().take(top_k).cloned().collect()
    }
}

async fn semantic_search(
    remote: &Remote,
    query: &str,
    top_k: usize,
) -> Result<Vec<String>, PipelineError> {
    let vector = remote.tei.embed_query(query).await?;
    remote.pinecone.query(&vector, top_k).await
}

fn read_guidelines(path: &Path) -> Result<String, PipelineError> {
    std::fs::read_to_string(path).map_err(|e| {
        PipelineError::InvalidInput(format!(
            "cannot read brand guidelines {}: {e}",
            path.display()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunks_split_on_blank_lines() {
        let text = "Voice\nBe warm.\n\n\n  \nTone: playful.  \n\n";
        assert_eq!(chunk_guidelines(text), ["Voice\nBe warm.", "Tone: playful."]);
    }

    #[test]
    fn empty_text_has_no_chunks() {
        assert!(chunk_guidelines("\n \n").is_empty());
    }

    #[tokio::test]
    async fn local_store_returns_first_chunks() {
        let store = GuidelineStore::local("a\n\nb\n\nc");
        assert_eq!(store.relevant("anything", 2).await, ["a", "b"]);
        assert!(!store.has_remote());
    }

    #[tokio::test]
    async fn index_requires_remote() {
        let err = GuidelineStore::local("a").index("a").await.unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
    }
}
