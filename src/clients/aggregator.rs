use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::ClusterSource;
use super::metrics::MetricsCollector;
use crate::config::MetricsConfig;
use crate::error::AggregatorError;
use crate::models::views::{LogOptions, PodDetail, PodFilter, PodView};
use crate::pods::{detail, filter, logs, normalize};

/// Entry point for pod views: merges pods, events and metrics per request.
/// Holds no per-request state.
pub struct Aggregator {
    source: Arc<dyn ClusterSource>,
    metrics: MetricsCollector,
}

impl Aggregator {
    pub fn new(source: Arc<dyn ClusterSource>, metrics_cfg: &MetricsConfig) -> Self {
        Self {
            metrics: MetricsCollector::new(source.clone(), metrics_cfg),
            source,
        }
    }

    pub async fn list_pod_views(
        &self,
        criteria: &PodFilter,
    ) -> Result<Vec<PodView>, AggregatorError> {
        let namespace = criteria.namespace.as_deref();
        let (pods, metrics) = tokio::join!(
            self.source.list_pods(namespace),
            self.metrics.collect(namespace)
        );
        let pods = pods?;
        let total = pods.len();

        let pods = filter::apply(pods, criteria);
        let views = normalize::normalize_all(&pods, &metrics, Utc::now());
        if views.len() < pods.len() {
            debug!(skipped = pods.len() - views.len(), "pods without phase left out");
        }

        debug!(
            total,
            matched = views.len(),
            with_metrics = metrics.len(),
            "listed pods"
        );
        Ok(views)
    }

    pub async fn get_pod_detail(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<PodDetail, AggregatorError> {
        let pod = self.source.get_pod(namespace, name).await?;

        let (events, metrics) = tokio::join!(
            self.source.list_events(namespace, name, "Pod"),
            self.metrics.collect(Some(namespace))
        );
        let events = events.unwrap_or_else(|e| {
            warn!(%namespace, pod = %name, error = %e, "events unavailable, continuing without");
            Vec::new()
        });

        detail::assemble_detail(&pod, events, &metrics, Utc::now()).ok_or_else(|| {
            AggregatorError::MissingPhase {
                namespace: namespace.to_string(),
                name: name.to_string(),
            }
        })
    }

    /// Fetches logs after checking `options.container` against the pod. The
    /// check is advisory: if the pod cannot be read the request goes out as
    /// given.
    pub async fn get_pod_logs(
        &self,
        namespace: &str,
        name: &str,
        options: &LogOptions,
    ) -> Result<String, AggregatorError> {
        let requested = options.container.as_deref();

        let container = match self.source.get_pod(namespace, name).await {
            Ok(pod) => {
                let resolved = logs::resolve_container(&pod, requested).ok_or_else(|| {
                    AggregatorError::InvalidRequest(format!(
                        "pod {}/{} declares no containers",
                        namespace, name
                    ))
                })?;
                if requested.is_some_and(|r| r != resolved) {
                    info!(
                        %namespace,
                        pod = %name,
                        requested = requested.unwrap_or_default(),
                        container = %resolved,
                        "requested container not in pod, using default"
                    );
                }
                Some(resolved)
            }
            Err(e) => {
                warn!(%namespace, pod = %name, error = %e, "could not validate container name");
                requested.map(str::to_string)
            }
        };

        let text = self
            .source
            .stream_pod_logs(namespace, name, container.as_deref(), options)
            .await?;
        Ok(text)
    }
}
