//! Pod usage collection from the metrics API.
//!
//! Metrics are optional enrichment: every failure here degrades to an empty
//! or partial result and is only logged.

use futures_util::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, warn};

use super::ClusterSource;
use crate::config::MetricsConfig;
use crate::error::ClusterError;
use crate::helpers::{format_cpu, format_memory, parse_cpu, parse_memory};
use crate::models::k8s::PodMetrics;
use crate::models::views::PodMetric;

pub struct MetricsCollector {
    source: Arc<dyn ClusterSource>,
    enabled: bool,
    concurrency: usize,
}

impl MetricsCollector {
    pub fn new(source: Arc<dyn ClusterSource>, cfg: &MetricsConfig) -> Self {
        Self {
            source,
            enabled: cfg.enabled,
            concurrency: cfg.concurrency.max(1),
        }
    }

    /// Collects per-pod usage for one namespace, or for every namespace when
    /// `namespace` is `None`. Never fails.
    pub async fn collect(&self, namespace: Option<&str>) -> Vec<PodMetric> {
        if !self.enabled {
            return Vec::new();
        }

        let samples = match namespace {
            Some(ns) => self.query(ns).await.unwrap_or_default(),
            None => self.collect_all().await,
        };

        samples.iter().map(summarize).collect()
    }

    async fn collect_all(&self) -> Vec<PodMetrics> {
        let namespaces = match self.source.list_namespaces().await {
            Ok(list) => list,
            Err(e) => {
                warn!(error = %e, "listing namespaces for metrics failed");
                return Vec::new();
            }
        };

        // `buffered` keeps namespace order and waits for every query to settle.
        let results: Vec<Option<Vec<PodMetrics>>> = stream::iter(namespaces)
            .map(|ns| async move { self.query(&ns.metadata.name).await })
            .buffered(self.concurrency)
            .collect()
            .await;

        results.into_iter().flatten().flatten().collect()
    }

    async fn query(&self, namespace: &str) -> Option<Vec<PodMetrics>> {
        match self.source.get_pod_metrics(namespace).await {
            Ok(samples) => Some(samples),
            Err(ClusterError::Unavailable(msg)) => {
                debug!(%namespace, reason = %msg, "metrics source unavailable");
                None
            }
            Err(e) => {
                warn!(%namespace, error = %e, "metrics query failed");
                None
            }
        }
    }
}

/// Sums container usage into one pod total. Unparseable quantities count as zero.
pub fn summarize(sample: &PodMetrics) -> PodMetric {
    let (cpu, memory) = sample
        .containers
        .iter()
        .fold((0.0, 0.0), |(cpu, memory), c| {
            let c_cpu = parse_cpu(&c.usage.cpu).unwrap_or_else(|| {
                debug!(container = %c.name, raw = %c.usage.cpu, "bad cpu quantity");
                0.0
            });
            let c_mem = parse_memory(&c.usage.memory).unwrap_or_else(|| {
                debug!(container = %c.name, raw = %c.usage.memory, "bad memory quantity");
                0.0
            });
            (cpu + c_cpu, memory + c_mem)
        });

    PodMetric {
        name: sample.metadata.name.clone(),
        namespace: sample.metadata.namespace.clone(),
        cpu: format_cpu(cpu),
        memory: format_memory(memory),
    }
}
