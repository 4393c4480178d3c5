use chrono::{DateTime, Utc};

use super::normalize::normalize;
use crate::helpers::parse_timestamp;
use crate::models::k8s::{Container, ContainerStatus, Event, Pod};
use crate::models::views::{
    ConditionView, ContainerDetail, ContainerRunState, EventView, PodDetail, PodMetric,
};

/// Number of most recent events kept on a pod detail.
pub const EVENT_WINDOW: usize = 20;

const DEFAULT_QOS_CLASS: &str = "BestEffort";

/// Extends the list view of `pod` with metadata, container state and the
/// recent event window. Returns `None` when the pod has no phase.
pub fn assemble_detail(
    pod: &Pod,
    events: Vec<Event>,
    metrics: &[PodMetric],
    now: DateTime<Utc>,
) -> Option<PodDetail> {
    let view = normalize(pod, metrics, now)?;
    let meta = &pod.metadata;
    let status = &pod.status;

    Some(PodDetail {
        view,
        uid: meta.uid.clone(),
        labels: meta.labels.clone().unwrap_or_default(),
        annotations: meta.annotations.clone().unwrap_or_default(),
        conditions: status
            .conditions
            .iter()
            .flatten()
            .map(|c| ConditionView {
                condition_type: c.condition_type.clone(),
                status: c.status.clone(),
                last_probe_time: c.last_probe_time.clone(),
                last_transition_time: c.last_transition_time.clone(),
                reason: c.reason.clone(),
                message: c.message.clone(),
            })
            .collect(),
        containers: pod
            .spec
            .containers
            .iter()
            .map(|c| container_detail(c, pod.container_statuses()))
            .collect(),
        events: event_window(events),
        owner_references: meta.owner_references.clone().unwrap_or_default(),
        qos_class: status
            .qos_class
            .clone()
            .filter(|q| !q.is_empty())
            .unwrap_or_else(|| DEFAULT_QOS_CLASS.to_string()),
        pod_ip: status.pod_ip.clone().filter(|ip| !ip.is_empty()),
        host_ip: status.host_ip.clone().filter(|ip| !ip.is_empty()),
        created_at: meta.creation_timestamp.clone(),
    })
}

fn container_detail(container: &Container, statuses: &[ContainerStatus]) -> ContainerDetail {
    let status = statuses.iter().find(|s| s.name == container.name);

    ContainerDetail {
        name: container.name.clone(),
        image: container.image.clone(),
        state: status.map_or(ContainerRunState::Waiting, run_state),
        ready: status.is_some_and(|s| s.ready),
        restart_count: status.map_or(0, |s| s.restart_count),
        ports: container.ports.clone().unwrap_or_default(),
        resources: container.resources.clone().unwrap_or_default(),
    }
}

fn run_state(status: &ContainerStatus) -> ContainerRunState {
    if status.state.running.is_some() {
        ContainerRunState::Running
    } else if status.state.terminated.is_some() {
        ContainerRunState::Terminated
    } else {
        ContainerRunState::Waiting
    }
}

/// Sort key: the later of `lastTimestamp` and `firstTimestamp`, falling back
/// to `eventTime` for events recorded through the events.k8s.io API.
fn event_time(event: &Event) -> Option<DateTime<Utc>> {
    let last = event.last_timestamp.as_deref().and_then(parse_timestamp);
    let first = event.first_timestamp.as_deref().and_then(parse_timestamp);
    last.max(first)
        .or_else(|| event.event_time.as_deref().and_then(parse_timestamp))
}

/// Newest first, truncated to [`EVENT_WINDOW`] after sorting. Events without
/// any timestamp sort last.
pub fn event_window(mut events: Vec<Event>) -> Vec<EventView> {
    events.sort_by_cached_key(|e| std::cmp::Reverse(event_time(e)));
    events.truncate(EVENT_WINDOW);

    events
        .into_iter()
        .map(|e| EventView {
            timestamp: e
                .last_timestamp
                .or(e.first_timestamp)
                .or(e.event_time),
            event_type: e.event_type,
            reason: e.reason,
            message: e.message,
            count: e.count,
        })
        .collect()
}
