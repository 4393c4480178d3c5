use std::collections::BTreeMap;

use crate::models::k8s::Pod;
use crate::models::views::{PodDetail, PodFilter, PodView};

/// Anything the filter engine can test. Fields a shape does not carry are
/// `None`, so predicates on them never match.
pub trait Filterable {
    fn namespace(&self) -> &str;
    fn phase(&self) -> Option<&str>;
    fn node_name(&self) -> Option<&str>;
    fn labels(&self) -> Option<&BTreeMap<String, String>>;
}

impl Filterable for Pod {
    fn namespace(&self) -> &str {
        &self.metadata.namespace
    }

    fn phase(&self) -> Option<&str> {
        Pod::phase(self)
    }

    fn node_name(&self) -> Option<&str> {
        self.spec.node_name.as_deref()
    }

    fn labels(&self) -> Option<&BTreeMap<String, String>> {
        Pod::labels(self)
    }
}

impl Filterable for PodView {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn phase(&self) -> Option<&str> {
        Some(&self.phase)
    }

    fn node_name(&self) -> Option<&str> {
        self.node_name.as_deref()
    }

    fn labels(&self) -> Option<&BTreeMap<String, String>> {
        None
    }
}

impl Filterable for PodDetail {
    fn namespace(&self) -> &str {
        &self.view.namespace
    }

    fn phase(&self) -> Option<&str> {
        Some(&self.view.phase)
    }

    fn node_name(&self) -> Option<&str> {
        self.view.node_name.as_deref()
    }

    fn labels(&self) -> Option<&BTreeMap<String, String>> {
        Some(&self.labels)
    }
}

pub fn matches<T: Filterable>(item: &T, filter: &PodFilter) -> bool {
    let scalar = |want: &Option<String>, have: Option<&str>| {
        want.as_deref().is_none_or(|want| have == Some(want))
    };

    if !scalar(&filter.namespace, Some(item.namespace()))
        || !scalar(&filter.phase, item.phase())
        || !scalar(&filter.node_name, item.node_name())
    {
        return false;
    }

    if filter.labels.is_empty() {
        return true;
    }
    item.labels().is_some_and(|labels| {
        filter
            .labels
            .iter()
            .all(|(k, v)| labels.get(k) == Some(v))
    })
}

/// Keeps the items matching every predicate, in input order.
pub fn apply<T: Filterable>(items: Vec<T>, filter: &PodFilter) -> Vec<T> {
    if filter.is_empty() {
        return items;
    }
    items.into_iter().filter(|i| matches(i, filter)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::fake::pod;
    use serde_json::json;

    fn raw(name: &str, ns: &str, phase: &str, node: &str, labels: serde_json::Value) -> Pod {
        pod(json!({
            "metadata": {"name": name, "namespace": ns, "labels": labels},
            "spec": {"nodeName": node},
            "status": {"phase": phase}
        }))
    }

    fn fixture() -> Vec<Pod> {
        vec![
            raw("a", "prod", "Running", "n1", json!({"app": "nginx"})),
            raw("b", "dev", "Running", "n1", json!({"app": "nginx"})),
            raw("c", "prod", "Pending", "n2", json!({"app": "redis"})),
            raw("d", "prod", "Running", "n2", json!({"app": "nginx", "tier": "web"})),
            raw("e", "prod", "Running", "n1", json!(null)),
        ]
    }

    fn pod_names(pods: &[Pod]) -> Vec<&str> {
        pods.iter().map(|p| p.metadata.name.as_str()).collect()
    }

    #[test]
    fn namespace_and_label_preserve_order() {
        let filter = PodFilter {
            namespace: Some("prod".into()),
            labels: BTreeMap::from([("app".into(), "nginx".into())]),
            ..Default::default()
        };
        let out = apply(fixture(), &filter);
        assert_eq!(pod_names(&out), ["a", "d"]);
    }

    #[test]
    fn empty_filter_is_identity() {
        let out = apply(fixture(), &PodFilter::default());
        assert_eq!(pod_names(&out), ["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn phase_and_node_combine_with_and() {
        let filter = PodFilter {
            phase: Some("Running".into()),
            node_name: Some("n2".into()),
            ..Default::default()
        };
        let out = apply(fixture(), &filter);
        assert_eq!(pod_names(&out), ["d"]);
    }

    #[test]
    fn every_label_must_match() {
        let filter = PodFilter {
            labels: BTreeMap::from([
                ("app".into(), "nginx".into()),
                ("tier".into(), "web".into()),
            ]),
            ..Default::default()
        };
        let out = apply(fixture(), &filter);
        assert_eq!(pod_names(&out), ["d"]);
    }

    #[test]
    fn views_support_scalar_predicates_but_not_labels() {
        let views: Vec<PodView> = ["x", "y"]
            .iter()
            .map(|n| PodView {
                id: String::new(),
                name: n.to_string(),
                namespace: "prod".into(),
                status: "Active".into(),
                phase: "Running".into(),
                age: "1m".into(),
                cpu: "0m".into(),
                memory: "0Mi".into(),
                restarts: 0,
                node_name: Some(if *n == "x" { "n1" } else { "n2" }.into()),
            })
            .collect();

        let by_node = PodFilter {
            node_name: Some("n2".into()),
            ..Default::default()
        };
        let out = apply(views.clone(), &by_node);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "y");

        let by_label = PodFilter {
            labels: BTreeMap::from([("app".into(), "nginx".into())]),
            ..Default::default()
        };
        assert!(apply(views, &by_label).is_empty());
    }
}
