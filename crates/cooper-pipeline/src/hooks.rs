//! PR hook suggestions aligned with the brand voice.

use std::fmt::Write as _;
use std::sync::Arc;

use cooper_core::Insight;
use serde_json::Value;

use crate::guidelines::GuidelineStore;
use crate::openai::{ChatRequest, OpenAiClient};

const GUIDELINE_QUERY: &str = "brand voice tone PR hooks";
const GUIDELINE_CHUNKS: usize = 3;

const HOOK_SYSTEM_PROMPT: &str = "You are an expert PR consultant who crafts compelling hooks \
and headlines that match a brand's voice and tone. Based on the provided insights and brand \
guidelines, write hooks that capture the insights in the brand's language and would perform \
well on social media and in press releases. \
Return only a JSON object of the form {\"hooks\": [\"Hook 1\", \"Hook 2\"]}.";

pub struct HookWriter {
    model: Option<(OpenAiClient, String)>,
    guidelines: Arc<GuidelineStore>,
}

impl HookWriter {
    /// Template-only writer.
    #[must_use]
    pub fn templated(guidelines: Arc<GuidelineStore>) -> Self {
        Self {
            model: None,
            guidelines,
        }
    }

    #[must_use]
    pub fn with_model(client: OpenAiClient, model: &str, guidelines: Arc<GuidelineStore>) -> Self {
        Self {
            model: Some((client, model.to_string())),
            guidelines,
        }
    }

    /// Up to `n` hooks for the ranked insights.
    ///
    /// Model failures are logged and answered from templates, so hook
    /// writing never fails a request.
    pub async fn suggest(&self, insights: &[Insight], n: usize) -> Vec<String> {
        if insights.is_empty() || n == 0 {
            return Vec::new();
        }

        if let Some((client, model)) = &self.model {
            match self.ask_model(client, model, insights, n).await {
                Some(hooks) => return hooks,
                None => tracing::warn!("PR hook model gave no usable hooks, using templates"),
            }
        }

        template_hooks(insights, n)
    }

    async fn ask_model(
        &self,
        client: &OpenAiClient,
        model: &str,
        insights: &[Insight],
        n: usize,
    ) -> Option<Vec<String>> {
        let guidelines = self.guidelines.relevant(GUIDELINE_QUERY, GUIDELINE_CHUNKS).await;

        let mut prompt = String::from("INSIGHTS:\n");
        for insight in insights {
            let _ = writeln!(prompt, "- {}", insight.text);
        }
        prompt.push_str("\nBRAND GUIDELINES (TONE AND VOICE):\n");
        prompt.push_str(&guidelines.join("\n\n"));
        let _ = write!(
            prompt,
            "\n\nGenerate {n} attention-grabbing PR hooks based on these insights that align \
             with the brand voice."
        );

        let reply = client
            .chat_json(ChatRequest {
                model,
                system: HOOK_SYSTEM_PROMPT,
                user: &prompt,
                temperature: 0.8,
                json_mode: false,
            })
            .await
            .map_err(|e| tracing::warn!(error = %e, "PR hook model call failed"))
            .ok()?;

        let hooks = parse_hooks(&reply, n);
        (!hooks.is_empty()).then_some(hooks)
    }
}

/// Accepts `{"hooks": [...]}` or a bare array of strings.
fn parse_hooks(reply: &Value, n: usize) -> Vec<String> {
    let list = match reply {
        Value::Object(map) => map.get("hooks").and_then(Value::as_array),
        Value::Array(items) => Some(items),
        _ => None,
    };
    list.into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|hook| !hook.is_empty())
        .take(n)
        .map(str::to_string)
        .collect()
}

fn template_hooks(insights: &[Insight], n: usize) -> Vec<String> {
    insights
        .iter()
        .take(n)
        .map(|insight| format!("What audiences are really feeling: {}", insight.text))
        .collect()
}
