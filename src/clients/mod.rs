pub mod aggregator;
pub mod metrics;

#[cfg(test)]
pub mod fake;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ClusterConfig;
use crate::error::ClusterError;
use crate::models::k8s::{Envelope, Event, Namespace, ObjectList, Pod, PodMetrics};
use crate::models::views::LogOptions;

const METRICS_API: &str = "/apis/metrics.k8s.io/v1beta1";

/// Read-only view of the cluster that the aggregator consumes.
#[async_trait]
pub trait ClusterSource: Send + Sync {
    /// All pods in `namespace`, or cluster-wide when `None`.
    async fn list_pods(&self, namespace: Option<&str>) -> Result<Vec<Pod>, ClusterError>;

    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Pod, ClusterError>;

    async fn list_events(
        &self,
        namespace: &str,
        involved_name: &str,
        kind: &str,
    ) -> Result<Vec<Event>, ClusterError>;

    async fn list_namespaces(&self) -> Result<Vec<Namespace>, ClusterError>;

    /// Fails with [`ClusterError::Unavailable`] when no metrics source is installed.
    async fn get_pod_metrics(&self, namespace: &str) -> Result<Vec<PodMetrics>, ClusterError>;

    async fn stream_pod_logs(
        &self,
        namespace: &str,
        name: &str,
        container: Option<&str>,
        options: &LogOptions,
    ) -> Result<String, ClusterError>;
}

/// HTTP client for a Kubernetes-compatible REST endpoint.
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
    http: Client,
}

impl ApiClient {
    pub fn new(cfg: &ClusterConfig) -> Result<Self, ClusterError> {
        let http = Client::builder().timeout(cfg.timeout()).build()?;

        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            token: cfg.token.clone().filter(|t| !t.is_empty()),
            http,
        })
    }

    fn get(&self, path: &str) -> RequestBuilder {
        let req = self.http.get(format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send(
        &self,
        path: &str,
        req: RequestBuilder,
    ) -> Result<reqwest::Response, ClusterError> {
        let resp = req.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        debug!(%path, %status, "request rejected");
        Err(match status {
            StatusCode::NOT_FOUND => ClusterError::NotFound(format!("GET {}: {}", path, body)),
            StatusCode::SERVICE_UNAVAILABLE => {
                ClusterError::Unavailable(format!("GET {}: {}", path, body))
            }
            _ => ClusterError::Upstream(format!("GET {} returned {}: {}", path, status, body)),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClusterError> {
        let req = self
            .get(path)
            .header("Accept", "application/json")
            .query(query);
        let resp = self.send(path, req).await?;
        let envelope: Envelope<T> = resp.json().await?;
        Ok(envelope.into_body())
    }

    async fn list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, ClusterError> {
        let list: ObjectList<T> = self.get_json(path, query).await?;
        Ok(list.items)
    }
}

#[async_trait]
impl ClusterSource for ApiClient {
    async fn list_pods(&self, namespace: Option<&str>) -> Result<Vec<Pod>, ClusterError> {
        match namespace {
            Some(ns) => {
                self.list(&format!("/api/v1/namespaces/{}/pods", ns), &[])
                    .await
            }
            None => self.list("/api/v1/pods", &[]).await,
        }
    }

    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Pod, ClusterError> {
        self.get_json(&format!("/api/v1/namespaces/{}/pods/{}", namespace, name), &[])
            .await
    }

    async fn list_events(
        &self,
        namespace: &str,
        involved_name: &str,
        kind: &str,
    ) -> Result<Vec<Event>, ClusterError> {
        let selector = format!(
            "involvedObject.name={},involvedObject.kind={}",
            involved_name, kind
        );
        self.list(
            &format!("/api/v1/namespaces/{}/events", namespace),
            &[("fieldSelector", selector)],
        )
        .await
    }

    async fn list_namespaces(&self) -> Result<Vec<Namespace>, ClusterError> {
        self.list("/api/v1/namespaces", &[]).await
    }

    async fn get_pod_metrics(&self, namespace: &str) -> Result<Vec<PodMetrics>, ClusterError> {
        let path = format!("{}/namespaces/{}/pods", METRICS_API, namespace);
        // An unregistered metrics.k8s.io group answers 404.
        self.list(&path, &[]).await.map_err(|e| match e {
            ClusterError::NotFound(msg) => ClusterError::Unavailable(msg),
            other => other,
        })
    }

    async fn stream_pod_logs(
        &self,
        namespace: &str,
        name: &str,
        container: Option<&str>,
        options: &LogOptions,
    ) -> Result<String, ClusterError> {
        let path = format!("/api/v1/namespaces/{}/pods/{}/log", namespace, name);

        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(c) = container {
            query.push(("container", c.to_string()));
        }
        if let Some(n) = options.tail_lines {
            query.push(("tailLines", n.to_string()));
        }
        if options.timestamps {
            query.push(("timestamps", "true".to_string()));
        }
        if let Some(s) = options.since_seconds {
            query.push(("sinceSeconds", s.to_string()));
        }

        let resp = self.send(&path, self.get(&path).query(&query)).await?;
        Ok(resp.text().await?)
    }
}
