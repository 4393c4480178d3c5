use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use super::k8s::{ContainerPort, OwnerReference, ResourceRequirements};

/// Per-pod resource usage, already summed across containers and formatted.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PodMetric {
    pub name: String,
    pub namespace: String,
    pub cpu: String,
    pub memory: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PodView {
    pub id: String,
    pub name: String,
    pub namespace: String,
    pub status: String,
    pub phase: String,
    pub age: String,
    pub cpu: String,
    pub memory: String,
    pub restarts: i64,
    pub node_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PodDetail {
    #[serde(flatten)]
    pub view: PodView,
    pub uid: String,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
    pub conditions: Vec<ConditionView>,
    pub containers: Vec<ContainerDetail>,
    pub events: Vec<EventView>,
    pub owner_references: Vec<OwnerReference>,
    pub qos_class: String,
    #[serde(rename = "podIP")]
    pub pod_ip: Option<String>,
    #[serde(rename = "hostIP")]
    pub host_ip: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConditionView {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: String,
    pub last_probe_time: Option<String>,
    pub last_transition_time: Option<String>,
    pub reason: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContainerRunState {
    Running,
    Terminated,
    Waiting,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContainerDetail {
    pub name: String,
    pub image: Option<String>,
    pub state: ContainerRunState,
    pub ready: bool,
    pub restart_count: i32,
    pub ports: Vec<ContainerPort>,
    pub resources: ResourceRequirements,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EventView {
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub reason: Option<String>,
    pub message: Option<String>,
    pub timestamp: Option<String>,
    pub count: Option<i32>,
}

/// Conjunction of optional pod predicates. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PodFilter {
    pub namespace: Option<String>,
    pub phase: Option<String>,
    pub node_name: Option<String>,
    pub labels: BTreeMap<String, String>,
}

impl PodFilter {
    /// Builds a filter from raw query parameters.
    ///
    /// Labels may be given as repeated `label.<key>=<value>` parameters or as a
    /// single `labels=k1=v1,k2=v2` parameter. Blank values are ignored.
    pub fn from_query(params: &HashMap<String, String>) -> Self {
        let non_blank = |key: &str| {
            params
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let mut filter = PodFilter {
            namespace: non_blank("namespace"),
            phase: non_blank("phase"),
            node_name: non_blank("nodeName"),
            labels: BTreeMap::new(),
        };

        if let Some(compact) = non_blank("labels") {
            filter.labels.extend(parse_label_selector(&compact));
        }

        for (key, value) in params {
            if let Some(label) = key.strip_prefix("label.") {
                let value = value.trim();
                if !label.is_empty() && !value.is_empty() {
                    filter.labels.insert(label.to_string(), value.to_string());
                }
            }
        }

        filter
    }

    pub fn is_empty(&self) -> bool {
        self.namespace.is_none()
            && self.phase.is_none()
            && self.node_name.is_none()
            && self.labels.is_empty()
    }
}

fn parse_label_selector(raw: &str) -> impl Iterator<Item = (String, String)> + '_ {
    raw.split(',').filter_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        let (key, value) = (key.trim(), value.trim());
        if key.is_empty() || value.is_empty() {
            None
        } else {
            Some((key.to_string(), value.to_string()))
        }
    })
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogOptions {
    pub container: Option<String>,
    pub tail_lines: Option<i64>,
    pub timestamps: bool,
    pub since_seconds: Option<i64>,
}

impl LogOptions {
    /// Builds log options from raw query parameters. Blank or unparseable
    /// values are treated as absent, and only `timestamps=true` enables
    /// timestamps.
    pub fn from_query(params: &HashMap<String, String>) -> Self {
        let non_blank = |key: &str| {
            params
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };
        let integer = |key: &str| non_blank(key).and_then(|v| v.parse::<i64>().ok());

        LogOptions {
            container: non_blank("container").map(str::to_string),
            tail_lines: integer("tailLines"),
            timestamps: non_blank("timestamps") == Some("true"),
            since_seconds: integer("sinceSeconds"),
        }
    }
}
