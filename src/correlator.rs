//! Matching of companion resources (autoscalers, disruption budgets) to a workload.
//!
//! Autoscalers name their target directly, so they are matched on identity.
//! Disruption budgets only carry a label selector, so they are matched on labels.
use k8s_openapi::api::autoscaling::v2::HorizontalPodAutoscaler;
use k8s_openapi::api::policy::v1::PodDisruptionBudget;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::ResourceExt;

use crate::crd::vpa::VerticalPodAutoscaler;
use crate::workload::Labels;

/// The parts of a workload a companion resource can point at
#[derive(Clone, Copy, Debug)]
pub struct WorkloadRef<'a> {
    pub name: &'a str,
    pub labels: &'a Labels,
}

pub trait Correlate {
    fn correlates(&self, workload: &WorkloadRef<'_>) -> bool;
}

/// True when at least one `matchLabels` pair of the selector is present in `labels`.
///
/// This is an any-match: `{app: x, env: dev}` correlates with `{app: x, env: prod}`.
/// `matchExpressions` are not considered. An absent selector never matches.
pub fn labels_match_any(selector: Option<&LabelSelector>, labels: &Labels) -> bool {
    let match_labels = match selector.and_then(|s| s.match_labels.as_ref()) {
        Some(match_labels) => match_labels,
        None => return false,
    };
    match_labels
        .iter()
        .any(|(key, value)| labels.get(key) == Some(value))
}

/// Identity match between an autoscaler's target and the workload's name
pub fn targets_workload(target_name: &str, workload: &WorkloadRef<'_>) -> bool {
    target_name == workload.name
}

impl Correlate for HorizontalPodAutoscaler {
    fn correlates(&self, workload: &WorkloadRef<'_>) -> bool {
        self.spec
            .as_ref()
            .map(|spec| targets_workload(&spec.scale_target_ref.name, workload))
            .unwrap_or(false)
    }
}

impl Correlate for VerticalPodAutoscaler {
    fn correlates(&self, workload: &WorkloadRef<'_>) -> bool {
        self.spec
            .target_ref
            .as_ref()
            .map(|target| targets_workload(&target.name, workload))
            .unwrap_or(false)
    }
}

impl Correlate for PodDisruptionBudget {
    fn correlates(&self, workload: &WorkloadRef<'_>) -> bool {
        let selector = self.spec.as_ref().and_then(|spec| spec.selector.as_ref());
        labels_match_any(selector, workload.labels)
    }
}

/// Names of the candidates which correlate to `workload`
pub fn correlated_names<K>(candidates: &[K], workload: &WorkloadRef<'_>) -> Vec<String>
where
    K: Correlate + ResourceExt,
{
    candidates
        .iter()
        .filter(|candidate| candidate.correlates(workload))
        .map(|candidate| candidate.name_any())
        .collect()
}
