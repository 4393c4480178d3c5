use crate::models::k8s::Pod;

/// Container names in log-selection priority: regular containers, then init
/// containers.
pub fn container_names(pod: &Pod) -> Vec<&str> {
    pod.spec
        .containers
        .iter()
        .chain(pod.spec.init_containers.iter().flatten())
        .map(|c| c.name.as_str())
        .collect()
}

/// Returns `requested` when the pod declares it, otherwise the first declared
/// container. `None` only when the pod has no containers at all.
pub fn resolve_container(pod: &Pod, requested: Option<&str>) -> Option<String> {
    let names = container_names(pod);
    let requested = requested.map(str::trim).filter(|r| !r.is_empty());

    match requested {
        Some(r) if names.contains(&r) => Some(r.to_string()),
        _ => names.first().map(|n| n.to_string()),
    }
}
