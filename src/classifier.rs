use k8s_openapi::api::core::v1::Pod;
use log::debug;

use crate::quantity;
use crate::workload::{QosClass, Resource};

pub const PENDING: &str = "Pending";
pub const RUNNING: &str = "Running";

/// Derive the QoS tier from declared container resources.
///
/// Single pass over the containers: the first one missing any of the four
/// requests/limits makes the pod `Burstable`, the first one declaring all four
/// makes it `Guaranteed`. Only an empty container list is `BestEffort`.
pub fn classify_qos(resources: &[Resource]) -> QosClass {
    for resource in resources {
        let quantities = [
            &resource.requests.memory,
            &resource.requests.cpu,
            &resource.limits.memory,
            &resource.limits.cpu,
        ];
        if quantities.iter().any(|q| quantity::is_zero(q)) {
            return QosClass::Burstable;
        }
        if quantities.iter().all(|q| !quantity::is_zero(q)) {
            return QosClass::Guaranteed;
        }
    }
    QosClass::BestEffort
}

/// Read the QoS tier the orchestrator already assigned to a live pod.
///
/// Only pods in phase `Running` or `Pending` count as live.
pub fn observed_qos(pods: &[Pod]) -> QosClass {
    pods.iter()
        .filter_map(|pod| pod.status.as_ref())
        .filter(|status| match status.phase.as_deref() {
            Some(phase) => phase == RUNNING || phase == PENDING,
            None => false,
        })
        .find_map(|status| status.qos_class.as_deref().and_then(parse_qos_class))
        .unwrap_or_else(|| {
            debug!("No live pods found among {} listed", pods.len());
            QosClass::NoActivePods
        })
}

fn parse_qos_class(name: &str) -> Option<QosClass> {
    match name {
        "Guaranteed" => Some(QosClass::Guaranteed),
        "Burstable" => Some(QosClass::Burstable),
        "BestEffort" => Some(QosClass::BestEffort),
        _ => None,
    }
}
