use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::helpers::parse_age;
use crate::models::k8s::Pod;
use crate::models::views::{PodMetric, PodView};

const NO_CPU: &str = "0m";
const NO_MEMORY: &str = "0Mi";

/// Builds the list view for one pod, or `None` if the pod has no phase yet.
pub fn normalize(pod: &Pod, metrics: &[PodMetric], now: DateTime<Utc>) -> Option<PodView> {
    let metric = metrics
        .iter()
        .find(|m| m.name == pod.metadata.name && m.namespace == pod.metadata.namespace);
    build_view(pod, metric, now)
}

/// Batch form of [`normalize`] sharing one metrics snapshot. Phaseless pods
/// are dropped.
pub fn normalize_all(pods: &[Pod], metrics: &[PodMetric], now: DateTime<Utc>) -> Vec<PodView> {
    let index: HashMap<(&str, &str), &PodMetric> = metrics
        .iter()
        .map(|m| ((m.namespace.as_str(), m.name.as_str()), m))
        .collect();

    pods.iter()
        .filter_map(|pod| {
            let key = (pod.metadata.namespace.as_str(), pod.metadata.name.as_str());
            build_view(pod, index.get(&key).copied(), now)
        })
        .collect()
}

pub(crate) fn build_view(
    pod: &Pod,
    metric: Option<&PodMetric>,
    now: DateTime<Utc>,
) -> Option<PodView> {
    let phase = pod.phase()?;

    Some(PodView {
        id: pod.metadata.uid.clone(),
        name: pod.metadata.name.clone(),
        namespace: pod.metadata.namespace.clone(),
        status: derive_status(pod, phase),
        phase: phase.to_string(),
        age: parse_age(pod.metadata.creation_timestamp.as_deref(), now),
        cpu: metric.map_or_else(|| NO_CPU.to_string(), |m| m.cpu.clone()),
        memory: metric.map_or_else(|| NO_MEMORY.to_string(), |m| m.memory.clone()),
        restarts: total_restarts(pod),
        node_name: pod.spec.node_name.clone(),
    })
}

/// Presentation label: a running pod whose containers all report ready is
/// "Active". A pod that has not reported container statuses yet is not.
pub fn derive_status(pod: &Pod, phase: &str) -> String {
    let all_ready = pod
        .status
        .container_statuses
        .as_ref()
        .is_some_and(|statuses| statuses.iter().all(|c| c.ready));
    match phase {
        "Running" if all_ready => "Active".to_string(),
        other => other.to_string(),
    }
}

pub fn total_restarts(pod: &Pod) -> i64 {
    pod.container_statuses()
        .iter()
        .map(|c| i64::from(c.restart_count.max(0)))
        .sum()
}
