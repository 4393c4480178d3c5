use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::ClusterSource;
use crate::error::ClusterError;
use crate::models::k8s::{Event, Namespace, ObjectMeta, Pod, PodMetrics};
use crate::models::views::LogOptions;

/// In-memory cluster used by unit tests. Unset sources behave as failures.
#[derive(Default)]
pub struct FakeCluster {
    pub pods: Vec<Pod>,
    pub fail_pods: bool,
    pub events: Option<Vec<Event>>,
    pub namespaces: Option<Vec<String>>,
    /// Per-namespace metrics; namespaces missing here answer `Unavailable`.
    pub metrics: HashMap<String, Vec<PodMetrics>>,
    /// Namespaces whose metrics query fails with `Upstream`.
    pub broken_metrics: Vec<String>,
    pub logs: Option<String>,
    pub metrics_calls: AtomicUsize,
    pub log_requests: Mutex<Vec<(String, String, Option<String>, LogOptions)>>,
}

impl FakeCluster {
    pub fn with_pods(pods: Vec<Pod>) -> Self {
        Self {
            pods,
            ..Default::default()
        }
    }

    pub fn log_requests(&self) -> Vec<(String, String, Option<String>, LogOptions)> {
        self.log_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ClusterSource for FakeCluster {
    async fn list_pods(&self, namespace: Option<&str>) -> Result<Vec<Pod>, ClusterError> {
        if self.fail_pods {
            return Err(ClusterError::Upstream("apiserver unreachable".into()));
        }
        Ok(self
            .pods
            .iter()
            .filter(|p| namespace.is_none_or(|ns| p.metadata.namespace == ns))
            .cloned()
            .collect())
    }

    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Pod, ClusterError> {
        if self.fail_pods {
            return Err(ClusterError::Upstream("apiserver unreachable".into()));
        }
        self.pods
            .iter()
            .find(|p| p.metadata.namespace == namespace && p.metadata.name == name)
            .cloned()
            .ok_or_else(|| ClusterError::NotFound(format!("pod {}/{}", namespace, name)))
    }

    async fn list_events(
        &self,
        _namespace: &str,
        _involved_name: &str,
        _kind: &str,
    ) -> Result<Vec<Event>, ClusterError> {
        self.events
            .clone()
            .ok_or_else(|| ClusterError::Upstream("events unavailable".into()))
    }

    async fn list_namespaces(&self) -> Result<Vec<Namespace>, ClusterError> {
        let names = self
            .namespaces
            .clone()
            .ok_or_else(|| ClusterError::Upstream("namespaces unavailable".into()))?;
        Ok(names
            .into_iter()
            .map(|name| Namespace {
                metadata: ObjectMeta {
                    name,
                    ..Default::default()
                },
            })
            .collect())
    }

    async fn get_pod_metrics(&self, namespace: &str) -> Result<Vec<PodMetrics>, ClusterError> {
        self.metrics_calls.fetch_add(1, Ordering::SeqCst);
        if self.broken_metrics.iter().any(|ns| ns == namespace) {
            return Err(ClusterError::Upstream(format!("metrics for {} timed out", namespace)));
        }
        self.metrics
            .get(namespace)
            .cloned()
            .ok_or_else(|| ClusterError::Unavailable(format!("no metrics for {}", namespace)))
    }

    async fn stream_pod_logs(
        &self,
        namespace: &str,
        name: &str,
        container: Option<&str>,
        options: &LogOptions,
    ) -> Result<String, ClusterError> {
        self.log_requests.lock().unwrap().push((
            namespace.to_string(),
            name.to_string(),
            container.map(str::to_string),
            options.clone(),
        ));
        self.logs
            .clone()
            .ok_or_else(|| ClusterError::NotFound(format!("pod {}/{}", namespace, name)))
    }
}

/// Builds a `PodMetrics` sample from `(container, cpu, memory)` triples.
pub fn sample(namespace: &str, name: &str, containers: &[(&str, &str, &str)]) -> PodMetrics {
    let containers: Vec<serde_json::Value> = containers
        .iter()
        .map(|(c, cpu, mem)| serde_json::json!({"name": c, "usage": {"cpu": cpu, "memory": mem}}))
        .collect();
    serde_json::from_value(serde_json::json!({
        "metadata": {"name": name, "namespace": namespace},
        "containers": containers,
    }))
    .unwrap()
}

pub fn pod(value: serde_json::Value) -> Pod {
    serde_json::from_value(value).unwrap()
}
