use serde::Deserialize;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum RecommendError {
    #[error("Recommendation request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Recommendation endpoint error: {0}")]
    Api(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Recommendation {
    pub title: String,
    #[serde(default)]
    pub score: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct RecommendResponse {
    recommendations: Vec<Recommendation>,
}

/// Client for the hosted recommendation model: one POST with the user's
/// watched titles, one ranked list back. No retries; a failed call just
/// means no recommendations this time.
pub struct RecommendClient {
    http: reqwest::Client,
    endpoint: String,
}

impl RecommendClient {
    pub fn new(http: reqwest::Client, endpoint: &str) -> Self {
        Self {
            http,
            endpoint: endpoint.to_string(),
        }
    }

    pub async fn recommend(
        &self,
        seed_titles: &[String],
        limit: usize,
    ) -> Result<Vec<Recommendation>, RecommendError> {
        let resp = self
            .http
            .post(&self.endpoint)
            .json(&serde_json::json!({ "titles": seed_titles, "limit": limit }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(RecommendError::Api(format!(
                "model endpoint returned status {}: {}",
                status, body
            )));
        }

        let mut parsed: RecommendResponse = resp.json().await?;
        parsed.recommendations.truncate(limit);
        debug!(
            seeds = seed_titles.len(),
            results = parsed.recommendations.len(),
            "recommendations fetched"
        );
        Ok(parsed.recommendations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_deserialization() {
        let json = r#"{
            "recommendations": [
                { "title": "Blade Runner 2049", "score": 0.93 },
                { "title": "Arrival" }
            ]
        }"#;

        let parsed: RecommendResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.recommendations.len(), 2);
        assert_eq!(parsed.recommendations[0].title, "Blade Runner 2049");
        assert_eq!(parsed.recommendations[0].score, Some(0.93));
        assert_eq!(parsed.recommendations[1].score, None);
    }
}
