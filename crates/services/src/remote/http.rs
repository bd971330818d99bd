use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use practice_core::model::{MasteryUpdate, NextQuestion, Subject, SubjectReport, Topic};

use crate::config::PracticeConfig;
use crate::error::RemoteError;

use super::wire::{QuestionBody, ReportBody, SubmitRequest, SubmitResponse};
use super::{MasteryService, QuestionSource, ReportSource, Submission};

/// JSON-over-HTTP client for the practice backend.
///
/// - `GET  /api/next_question` picks the next due topic
/// - `GET  /api/practice/{subject}/{topic}` serves a specific topic
/// - `POST /api/submit` records an answer
/// - `GET  /api/subject_report/{subject}` builds the dashboard
#[derive(Clone, Debug)]
pub struct HttpPracticeApi {
    client: Client,
    base_url: Url,
}

impl HttpPracticeApi {
    /// # Errors
    ///
    /// Returns `RemoteError::Transport` if the HTTP client cannot be built.
    pub fn new(config: &PracticeConfig) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RemoteError::Transport(e.to_string()))?;
        Ok(Self::with_client(client, config.api_url.clone()))
    }

    #[must_use]
    pub fn with_client(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    /// Append percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, RemoteError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                RemoteError::Transport(format!("{} cannot be used as a base URL", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, RemoteError> {
        debug!(%url, "GET");
        let response = self.client.get(url).send().await?;
        read_json(response).await
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, RemoteError> {
    let status = response.status();
    if !status.is_success() {
        return Err(RemoteError::Status(status.as_u16()));
    }
    Ok(response.json().await?)
}

#[async_trait]
impl QuestionSource for HttpPracticeApi {
    async fn next_question(
        &self,
        subject: &Subject,
        topic: Option<&Topic>,
    ) -> Result<NextQuestion, RemoteError> {
        let body: QuestionBody = match topic {
            None => self.get_json(self.endpoint(&["api", "next_question"])?).await?,
            Some(topic) => {
                let url =
                    self.endpoint(&["api", "practice", subject.as_str(), topic.as_str()])?;
                self.get_json(url).await.map_err(|err| match err {
                    RemoteError::Status(404) => RemoteError::UnknownTopic(topic.clone()),
                    other => other,
                })?
            }
        };
        body.into_next(topic)
    }
}

#[async_trait]
impl MasteryService for HttpPracticeApi {
    async fn record(&self, submission: &Submission) -> Result<MasteryUpdate, RemoteError> {
        let url = self.endpoint(&["api", "submit"])?;
        debug!(%url, attempt = %submission.attempt_id, topic = %submission.topic, "POST");
        let response = self
            .client
            .post(url)
            .json(&SubmitRequest::from_submission(submission))
            .send()
            .await?;
        let body: SubmitResponse = read_json(response).await?;
        body.into_update(&submission.topic)
    }
}

#[async_trait]
impl ReportSource for HttpPracticeApi {
    async fn subject_report(&self, subject: &Subject) -> Result<SubjectReport, RemoteError> {
        let url = self.endpoint(&["api", "subject_report", subject.as_str()])?;
        let body: ReportBody = self.get_json(url).await?;
        body.into_report()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(base: &str) -> HttpPracticeApi {
        HttpPracticeApi::with_client(Client::new(), Url::parse(base).unwrap())
    }

    #[test]
    fn endpoint_appends_segments() {
        let url = api("http://127.0.0.1:5000").endpoint(&["api", "submit"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:5000/api/submit");
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let url = api("https://tutor.example.com/v1/")
            .endpoint(&["api", "next_question"])
            .unwrap();
        assert_eq!(url.as_str(), "https://tutor.example.com/v1/api/next_question");
    }

    #[test]
    fn endpoint_encodes_topic_names() {
        let url = api("http://localhost:5000")
            .endpoint(&["api", "practice", "Mathematics", "Mixed Numbers/Ratios"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/api/practice/Mathematics/Mixed%20Numbers%2FRatios"
        );
    }

    #[tokio::test]
    async fn unreachable_backend_is_transport_failure() {
        // Port 9 (discard) on localhost is expected to refuse connections.
        let api = api("http://127.0.0.1:9");
        let err = api
            .next_question(&Subject::new("Mathematics").unwrap(), None)
            .await
            .unwrap_err();
        assert!(err.is_transport(), "unexpected error: {err:?}");
    }
}
