use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::prediction::Verdict;
use crate::models::question::Question;

/// External collaborator that decides which predicted texts are correct.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VerdictSource: Send + Sync {
    async fn judge(
        &self,
        question: &Question,
        actual_answer: &str,
        predictions: &[String],
    ) -> Result<Vec<Verdict>>;
}

/// Verdict source backed by an OpenAI-compatible chat completions endpoint.
#[derive(Clone)]
pub struct HttpJudge {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    r#type: &'a str,
}

#[derive(Serialize)]
struct Req<'a> {
    model: &'a str,
    temperature: f32,
    response_format: ResponseFormat<'a>,
    messages: Vec<Msg<'a>>,
}

#[derive(Deserialize)]
struct RespChoiceMsg {
    content: String,
}

#[derive(Deserialize)]
struct RespChoice {
    message: RespChoiceMsg,
}

#[derive(Deserialize)]
struct Resp {
    choices: Vec<RespChoice>,
}

#[derive(Deserialize)]
struct JudgeOutput {
    verdicts: Vec<JudgeVerdict>,
}

#[derive(Deserialize)]
struct JudgeVerdict {
    predicted_answer: String,
    is_correct: bool,
}

const SYSTEM_PROMPT: &str = "You judge free-text predictions against a confirmed answer. \
Treat a prediction as correct when it denotes the same value, ignoring units, formatting and currency symbols. \
Output a JSON object {\"verdicts\": [{\"predicted_answer\": string, \"is_correct\": boolean}]} \
with exactly one entry per prediction, copying each prediction text verbatim.";

impl HttpJudge {
    pub fn new(client: Client, api_url: String, api_key: String, model: String) -> Self {
        Self {
            client,
            api_url,
            api_key,
            model,
        }
    }
}

#[async_trait]
impl VerdictSource for HttpJudge {
    async fn judge(
        &self,
        question: &Question,
        actual_answer: &str,
        predictions: &[String],
    ) -> Result<Vec<Verdict>> {
        let user_content = serde_json::json!({
            "question": question.body,
            "actual_answer": actual_answer,
            "predictions": predictions,
        })
        .to_string();

        let req = Req {
            model: &self.model,
            temperature: 0.0,
            response_format: ResponseFormat {
                r#type: "json_object",
            },
            messages: vec![
                Msg {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                Msg {
                    role: "user",
                    content: user_content,
                },
            ],
        };

        let resp = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(Error::ExternalService(format!(
                "Verdict source returned status {}",
                resp.status()
            )));
        }

        let body = resp.json::<Resp>().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::ExternalService("Verdict source returned no choices".into()))?;
        parse_verdicts(&content, predictions)
    }
}

/// Parses the judge's JSON and rejects verdicts for texts that were never
/// asked about.
pub fn parse_verdicts(content: &str, predictions: &[String]) -> Result<Vec<Verdict>> {
    let output: JudgeOutput = serde_json::from_str(content.trim()).map_err(|e| {
        Error::ExternalService(format!("Verdict source returned unparsable content: {}", e))
    })?;
    output
        .verdicts
        .into_iter()
        .map(|v| {
            if predictions.contains(&v.predicted_answer) {
                Ok(Verdict {
                    predicted_answer: v.predicted_answer,
                    is_correct: v.is_correct,
                    user_id: None,
                })
            } else {
                Err(Error::ExternalService(format!(
                    "Verdict source judged unknown prediction '{}'",
                    v.predicted_answer
                )))
            }
        })
        .collect()
}
