use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Method, Request, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::client::HttpClient;
use super::{Classifier, FeatureVector, Prediction};

#[derive(Serialize)]
struct PredictRequest<'a> {
    features: &'a [f64],
}

#[derive(Deserialize)]
struct PredictResponse {
    class_id: i64,
    probabilities: Vec<f64>,
}

/// Classifier backed by a model server.
///
/// Posts `{"features": [...]}` to the endpoint and expects
/// `{"class_id": n, "probabilities": [p0, p1, p2]}` back.
pub struct HttpClassifier<C> {
    client: C,
    endpoint: Url,
}

impl<C: HttpClient> HttpClassifier<C> {
    pub fn new(client: C, endpoint: &str) -> Result<Self> {
        let endpoint = endpoint
            .parse()
            .with_context(|| format!("invalid classifier endpoint `{endpoint}`"))?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl<C: HttpClient> Classifier for HttpClassifier<C> {
    #[tracing::instrument(skip(self, features), fields(endpoint = %self.endpoint))]
    async fn predict(&self, features: &FeatureVector) -> Result<Prediction> {
        let body = serde_json::to_vec(&PredictRequest {
            features: features.as_slice(),
        })?;

        let mut req = Request::new(Method::POST, self.endpoint.clone());
        req.headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        *req.body_mut() = Some(body.into());

        let resp = self
            .client
            .execute(req)
            .await
            .context("classifier request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("classifier returned {status}: {body}");
        }

        let reply: PredictResponse = resp
            .json()
            .await
            .context("classifier returned an unreadable reply")?;
        debug!(class_id = reply.class_id, "Classifier replied");

        Ok(Prediction::new(reply.class_id, &reply.probabilities)?)
    }
}
