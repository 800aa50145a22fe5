//! Embeddings for brand guideline chunks and search queries, served by a
//! Text Embeddings Inference (TEI) endpoint.

use serde::Serialize;

use crate::error::PipelineError;

/// Chunks sent per `/embed` call.
const BATCH_SIZE: usize = 64;

pub(crate) struct TeiClient {
    client: reqwest::Client,
    embed_url: String,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    inputs: &'a [&'a str],
}

impl TeiClient {
    pub(crate) fn new(client: reqwest::Client, tei_url: &str) -> Self {
        Self {
            client,
            embed_url: format!("{}/embed", tei_url.trim_end_matches('/')),
        }
    }

    /// One vector per guideline chunk, in chunk order.
    ///
    /// Every vector must have the same width, since they all land in one
    /// Pinecone index.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Tei`] on transport or status failure, a
    /// short answer, or vectors of differing or zero width.
    pub(crate) async fn embed_chunks(
        &self,
        chunks: &[&str],
    ) -> Result<Vec<Vec<f32>>, PipelineError> {
        let mut vectors: Vec<Vec<f32>> = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(BATCH_SIZE) {
            let embedded = self.post_batch(batch).await?;
            let width = vectors.first().or(embedded.first()).map_or(0, Vec::len);
            if let Some(bad) = embedded.iter().find(|v| v.len() != width || v.is_empty()) {
                return Err(PipelineError::Tei(format!(
                    "embedding width {} does not match {width}",
                    bad.len()
                )));
            }
            vectors.extend(embedded);
        }
        Ok(vectors)
    }

    /// Vector for a guideline search query.
    ///
    /// # Errors
    ///
    /// Same failures as [`TeiClient::embed_chunks`].
    pub(crate) async fn embed_query(&self, query: &str) -> Result<Vec<f32>, PipelineError> {
        let mut embedded = self.post_batch(&[query]).await?;
        match embedded.pop() {
            Some(vector) if !vector.is_empty() => Ok(vector),
            _ => Err(PipelineError::Tei("empty embedding for query".to_string())),
        }
    }

    /// Embed one non-empty batch; the answer has exactly one vector per input.
    async fn post_batch(&self, batch: &[&str]) -> Result<Vec<Vec<f32>>, PipelineError> {
        let response = self
            .client
            .post(&self.embed_url)
            .json(&EmbedRequest { inputs: batch })
            .send()
            .await
            .map_err(|e| PipelineError::Tei(format!("embed request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::Tei(format!("embed endpoint answered {status}")));
        }

        let embedded: Vec<Vec<f32>> = response
            .json()
            .await
            .map_err(|e| PipelineError::Tei(format!("unreadable embed response: {e}")))?;
        if embedded.len() != batch.len() {
            return Err(PipelineError::Tei(format!(
                "{} vectors for {} guideline texts",
                embedded.len(),
                batch.len()
            )));
        }
        Ok(embedded)
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn chunks_embed_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embed"))
            .and(body_json(serde_json::json!({"inputs": ["a", "b"]})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(vec![vec![1.0, 0.0], vec![0.0, 2.0]]),
            )
            .mount(&server)
            .await;

        let tei = TeiClient::new(reqwest::Client::new(), &format!("{}/", server.uri()));
        let vectors = tei.embed_chunks(&["a", "b"]).await.unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 2.0]]);
    }

    #[tokio::test]
    async fn large_guideline_sets_are_batched() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embed"))
            .respond_with(|req: &wiremock::Request| {
                let body: serde_json::Value = serde_json::from_slice(&req.body).unwrap();
                let n = body["inputs"].as_array().unwrap().len();
                ResponseTemplate::new(200).set_body_json(vec![vec![0.5_f32]; n])
            })
            .expect(2)
            .mount(&server)
            .await;

        let texts: Vec<String> = (0..70).map(|i| format!("chunk {i}")).collect();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let tei = TeiClient::new(reqwest::Client::new(), &server.uri());
        assert_eq!(tei.embed_chunks(&refs).await.unwrap().len(), 70);
    }

    #[tokio::test]
    async fn short_answer_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(vec![vec![1.0_f32]]))
            .mount(&server)
            .await;

        let tei = TeiClient::new(reqwest::Client::new(), &server.uri());
        let err = tei.embed_chunks(&["a", "b"]).await.unwrap_err();
        assert!(matches!(err, PipelineError::Tei(_)));
    }

    #[tokio::test]
    async fn mixed_widths_are_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(vec![vec![1.0_f32, 0.0], vec![1.0]]),
            )
            .mount(&server)
            .await;

        let tei = TeiClient::new(reqwest::Client::new(), &server.uri());
        let err = tei.embed_chunks(&["a", "b"]).await.unwrap_err();
        assert!(err.to_string().contains("width"), "{err}");
    }

    #[tokio::test]
    async fn query_embedding_must_be_non_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(serde_json::json!({"inputs": ["tone"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(vec![Vec::<f32>::new()]))
            .mount(&server)
            .await;

        let tei = TeiClient::new(reqwest::Client::new(), &server.uri());
        assert!(tei.embed_query("tone").await.is_err());
    }
}
