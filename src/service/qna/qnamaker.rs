//! QnA Maker knowledge base client.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::base::{
    config::Config,
    types::{QnaAnswer, Res},
};

use super::{GenericQnaClient, QnaClient};

// Extra methods on `QnaClient` applied by the QnA Maker implementation.

impl QnaClient {
    /// Creates a new QnA Maker client.
    pub fn qnamaker(config: &Config) -> Res<Self> {
        let client = QnaMakerClient::new(config)?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Specific implementations.

/// QnA Maker client implementation.
#[derive(Clone)]
pub struct QnaMakerClient {
    client: reqwest::Client,
    url: String,
    endpoint_key: String,
    top: u32,
}

impl QnaMakerClient {
    /// Create a new QnA Maker client.
    #[instrument(name = "QnaMakerClient::new", skip_all)]
    pub fn new(config: &Config) -> Res<Self> {
        let client = reqwest::Client::builder().timeout(config.turn_timeout()).build()?;

        Ok(Self {
            client,
            url: generate_answer_url(&config.qna_endpoint, &config.qna_knowledge_base_id),
            endpoint_key: config.qna_endpoint_key.clone(),
            top: config.qna_top,
        })
    }
}

#[async_trait]
impl GenericQnaClient for QnaMakerClient {
    #[instrument(name = "QnaMakerClient::get_answers", skip_all)]
    async fn get_answers(&self, text: &str) -> Res<Vec<QnaAnswer>> {
        let request = GenerateAnswerRequest { question: text, top: self.top };

        let response = self
            .client
            .post(&self.url)
            .header("Authorization", format!("EndpointKey {}", self.endpoint_key))
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let payload: GenerateAnswerResponse = response.json().await?;
        let answers = payload.into_answers();

        debug!("QnA Maker returned {} usable answers", answers.len());

        Ok(answers)
    }
}

// Payloads.

#[derive(Debug, Serialize)]
struct GenerateAnswerRequest<'a> {
    question: &'a str,
    top: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateAnswerResponse {
    #[serde(default)]
    answers: Vec<QnaAnswer>,
}

impl GenerateAnswerResponse {
    /// Drop the service's zero-score "no good match" placeholder and order best first.
    fn into_answers(self) -> Vec<QnaAnswer> {
        let mut answers = self.answers.into_iter().filter(|a| a.score > 0.0).collect::<Vec<_>>();
        answers.sort_by(|a, b| b.score.total_cmp(&a.score));
        answers
    }
}

fn generate_answer_url(endpoint: &str, knowledge_base_id: &str) -> String {
    format!("{}/qnamaker/knowledgebases/{}/generateAnswer", endpoint.trim_end_matches('/'), knowledge_base_id)
}

// Tests.

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn parse(value: serde_json::Value) -> Vec<QnaAnswer> {
        serde_json::from_value::<GenerateAnswerResponse>(value).unwrap().into_answers()
    }

    #[test]
    fn test_generate_answer_url() {
        assert_eq!(
            generate_answer_url("https://covid-qna.azurewebsites.net/", "kb-1"),
            "https://covid-qna.azurewebsites.net/qnamaker/knowledgebases/kb-1/generateAnswer"
        );
    }

    #[test]
    fn test_answers_are_ordered_best_first() {
        let answers = parse(json!({
            "answers": [
                { "answer": "Wash your hands.", "score": 41.5, "questions": ["how to stay safe"] },
                { "answer": "Fever, cough and tiredness.", "score": 87.2, "questions": ["symptoms"] }
            ]
        }));

        assert_eq!(answers.len(), 2);
        assert_eq!(answers[0].answer, "Fever, cough and tiredness.");
    }

    #[test]
    fn test_no_good_match_placeholder_is_dropped() {
        let answers = parse(json!({
            "answers": [{ "answer": "No good match found in KB.", "score": 0.0, "id": -1 }]
        }));

        assert!(answers.is_empty());
    }

    #[test]
    fn test_missing_answers_is_empty() {
        assert!(parse(json!({})).is_empty());
    }
}
