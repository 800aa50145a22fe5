//! Pinecone data-plane client for brand guideline chunks.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::PipelineError;

/// Hex characters of the SHA-256 digest used in vector ids.
const ID_HEX_LEN: usize = 16;

pub(crate) struct PineconeClient {
    client: reqwest::Client,
    host: String,
    api_key: String,
    namespace: String,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: Vec<Vector<'a>>,
    namespace: &'a str,
}

#[derive(Serialize)]
struct Vector<'a> {
    id: String,
    values: Vec<f32>,
    metadata: ChunkMetadata<'a>,
}

#[derive(Serialize)]
struct ChunkMetadata<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    namespace: &'a str,
    include_metadata: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<Match>,
}

#[derive(Deserialize)]
struct Match {
    #[serde(default)]
    metadata: Option<MatchMetadata>,
}

#[derive(Deserialize)]
struct MatchMetadata {
    text: Option<String>,
}

impl PineconeClient {
    /// `host` is the index host as shown in the Pinecone console; a bare
    /// hostname gets an `https://` scheme.
    #[must_use]
    pub(crate) fn new(client: reqwest::Client, host: &str, api_key: &str, namespace: &str) -> Self {
        let host = host.trim_end_matches('/');
        let host = if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("https://{host}")
        };
        Self {
            client,
            host,
            api_key: api_key.to_string(),
            namespace: namespace.to_string(),
        }
    }

    /// Upsert chunk texts with their embeddings. Returns the number written.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Pinecone`] on network or API failure, or if
    /// `chunks` and `embeddings` differ in length.
    pub(crate) async fn upsert_chunks(
        &self,
        chunks: &[&str],
        embeddings: Vec<Vec<f32>>,
    ) -> Result<usize, PipelineError> {
        if chunks.len() != embeddings.len() {
            return Err(PipelineError::Pinecone(format!(
                "{} chunks but {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }

        let vectors: Vec<Vector<'_>> = chunks
            .iter()
            .zip(embeddings)
            .map(|(&text, values)| Vector {
                id: chunk_id(text),
                values,
                metadata: ChunkMetadata { text },
            })
            .collect();
        let count = vectors.len();

        let resp = self
            .client
            .post(format!("{}/vectors/upsert", self.host))
            .header("Api-Key", &self.api_key)
            .json(&UpsertRequest {
                vectors,
                namespace: &self.namespace,
            })
            .send()
            .await
            .map_err(|e| PipelineError::Pinecone(format!("upsert request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(PipelineError::Pinecone(format!(
                "upsert returned status {}",
                resp.status()
            )));
        }

        Ok(count)
    }

    /// Chunk texts of the `top_k` nearest vectors, best match first.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Pinecone`] on network or API failure.
    pub(crate) async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<String>, PipelineError> {
        let resp = self
            .client
            .post(format!("{}/query", self.host))
            .header("Api-Key", &self.api_key)
            .json(&QueryRequest {
                vector,
                top_k,
                namespace: &self.namespace,
                include_metadata: true,
            })
            .send()
            .await
            .map_err(|e| PipelineError::Pinecone(format!("query request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(PipelineError::Pinecone(format!(
                "query returned status {}",
                resp.status()
            )));
        }

        let body: QueryResponse = resp
            .json()
            .await
            .map_err(|e| PipelineError::Pinecone(format!("query response parse error: {e}")))?;

        Ok(body
            .matches
            .into_iter()
            .filter_map(|m| m.metadata.and_then(|md| md.text))
            .collect())
    }
}

/// Stable vector id for a chunk: the same text always lands on the same id.
pub(crate) fn chunk_id(text: &str) -> String {
    let hash = Sha256::digest(text.as_bytes());
    let hex: String = hash.iter().map(|b| format!("{b:02x}")).collect();
    format!("guideline-{}", &hex[..ID_HEX_LEN])
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn chunk_id_is_stable() {
        assert_eq!(chunk_id("Be warm."), chunk_id("Be warm."));
        assert!(chunk_id("Be warm.").starts_with("guideline-"));
        assert_eq!(chunk_id("x").len(), "guideline-".len() + ID_HEX_LEN);
    }

    #[test]
    fn different_chunks_produce_different_ids() {
        assert_ne!(chunk_id("a"), chunk_id("b"));
    }

    #[test]
    fn bare_host_gets_https_scheme() {
        let c = PineconeClient::new(reqwest::Client::new(), "idx.svc.pinecone.io/", "k", "ns");
        assert_eq!(c.host, "https://idx.svc.pinecone.io");
    }

    #[tokio::test]
    async fn upsert_sends_api_key_and_namespace() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/vectors/upsert"))
            .and(header("Api-Key", "secret"))
            .and(body_partial_json(serde_json::json!({"namespace": "brand"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"upsertedCount": 1})))
            .expect(1)
            .mount(&server)
            .await;

        let c = PineconeClient::new(reqwest::Client::new(), &server.uri(), "secret", "brand");
        let n = c.upsert_chunks(&["Be warm."], vec![vec![0.1, 0.2]]).await.unwrap();
        assert_eq!(n, 1);
    }

    #[tokio::test]
    async fn query_returns_matched_texts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/query"))
            .and(body_partial_json(serde_json::json!({"topK": 2, "includeMetadata": true})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "matches": [
                    {"id": "guideline-1", "score": 0.9, "metadata": {"text": "Be warm."}},
                    {"id": "guideline-2", "score": 0.8}
                ]
            })))
            .mount(&server)
            .await;

        let c = PineconeClient::new(reqwest::Client::new(), &server.uri(), "k", "brand");
        let texts = c.query(&[0.1, 0.2], 2).await.unwrap();
        assert_eq!(texts, ["Be warm."]);
    }

    #[tokio::test]
    async fn non_2xx_is_pinecone_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let c = PineconeClient::new(reqwest::Client::new(), &server.uri(), "bad", "brand");
        assert!(matches!(
            c.query(&[0.0], 1).await.unwrap_err(),
            PipelineError::Pinecone(_)
        ));
    }
}
