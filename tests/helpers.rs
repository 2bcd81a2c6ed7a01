#![allow(dead_code)]
use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{Deployment, StatefulSet};
use k8s_openapi::api::autoscaling::v2::{CrossVersionObjectReference, HorizontalPodAutoscaler, HorizontalPodAutoscalerSpec};
use k8s_openapi::api::batch::v1::CronJob;
use k8s_openapi::api::core::v1::{Pod, PodStatus};
use k8s_openapi::api::policy::v1::{PodDisruptionBudget, PodDisruptionBudgetSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use kube::error::ErrorResponse;
use serde::de::DeserializeOwned;

use workload_inspector::crd::vpa::{TargetRef, VerticalPodAutoscaler, VerticalPodAutoscalerSpec};
use workload_inspector::errors::Error;
use workload_inspector::reporter::Reporter;
use workload_inspector::workload::{Limits, Requests, Resource};
use workload_inspector::{ClusterLister, Workload};

// Parse one of the YAML files under `tests/fixtures`
pub fn fixture<T: DeserializeOwned>(name: &str) -> T {
    let config_str = std::fs::read_to_string(format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name))
        .expect("Failed to read fixture file");
    serde_yaml::from_str(&config_str).expect("Unable to parse fixture file")
}

pub fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

pub fn meta(name: &str, namespace: &str) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_owned()),
        namespace: Some(namespace.to_owned()),
        ..ObjectMeta::default()
    }
}

pub fn resource(request_memory: &str, request_cpu: &str, limit_memory: &str, limit_cpu: &str) -> Resource {
    Resource {
        requests: Requests {
            memory: request_memory.to_owned(),
            cpu: request_cpu.to_owned(),
        },
        limits: Limits {
            memory: limit_memory.to_owned(),
            cpu: limit_cpu.to_owned(),
        },
    }
}

pub fn hpa(name: &str, target: &str) -> HorizontalPodAutoscaler {
    HorizontalPodAutoscaler {
        metadata: meta(name, "shop"),
        spec: Some(HorizontalPodAutoscalerSpec {
            scale_target_ref: CrossVersionObjectReference {
                api_version: Some("apps/v1".to_owned()),
                kind: "Deployment".to_owned(),
                name: target.to_owned(),
            },
            min_replicas: Some(2),
            max_replicas: 10,
            ..HorizontalPodAutoscalerSpec::default()
        }),
        ..HorizontalPodAutoscaler::default()
    }
}

pub fn vpa(name: &str, target: &str) -> VerticalPodAutoscaler {
    let mut vpa = VerticalPodAutoscaler::new(
        name,
        VerticalPodAutoscalerSpec {
            target_ref: Some(TargetRef {
                api_version: Some("apps/v1".to_owned()),
                kind: "Deployment".to_owned(),
                name: target.to_owned(),
            }),
            update_policy: None,
        },
    );
    vpa.metadata.namespace = Some("shop".to_owned());
    vpa
}

pub fn pdb(name: &str, match_labels: &[(&str, &str)]) -> PodDisruptionBudget {
    PodDisruptionBudget {
        metadata: meta(name, "shop"),
        spec: Some(PodDisruptionBudgetSpec {
            selector: Some(LabelSelector {
                match_labels: Some(labels(match_labels)),
                ..LabelSelector::default()
            }),
            ..PodDisruptionBudgetSpec::default()
        }),
        ..PodDisruptionBudget::default()
    }
}

pub fn live_pod(phase: &str, qos_class: Option<&str>) -> Pod {
    Pod {
        status: Some(PodStatus {
            phase: Some(phase.to_owned()),
            qos_class: qos_class.map(|q| q.to_owned()),
            ..PodStatus::default()
        }),
        ..Pod::default()
    }
}

/// In-memory `ClusterLister` recording every call it receives
#[derive(Default)]
pub struct FakeLister {
    pub deployments: Vec<Deployment>,
    pub stateful_sets: Vec<StatefulSet>,
    pub cron_jobs: Vec<CronJob>,
    pub hpas: Vec<HorizontalPodAutoscaler>,
    pub vpas: Vec<VerticalPodAutoscaler>,
    pub pdbs: Vec<PodDisruptionBudget>,
    pub pods: Vec<Pod>,
    pub fail_pdbs: bool,
    pub calls: Mutex<Vec<String>>,
}

impl FakeLister {
    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ClusterLister for FakeLister {
    async fn list_deployments(&self, namespace: Option<&str>) -> Result<Vec<Deployment>, Error> {
        self.record(format!("deployments:{}", namespace.unwrap_or("*")));
        Ok(self.deployments.clone())
    }

    async fn list_stateful_sets(&self, namespace: Option<&str>) -> Result<Vec<StatefulSet>, Error> {
        self.record(format!("statefulsets:{}", namespace.unwrap_or("*")));
        Ok(self.stateful_sets.clone())
    }

    async fn list_cron_jobs(&self, namespace: Option<&str>) -> Result<Vec<CronJob>, Error> {
        self.record(format!("cronjobs:{}", namespace.unwrap_or("*")));
        Ok(self.cron_jobs.clone())
    }

    async fn list_hpas(&self, namespace: &str) -> Result<Vec<HorizontalPodAutoscaler>, Error> {
        self.record(format!("hpas:{}", namespace));
        Ok(self.hpas.clone())
    }

    async fn list_vpas(&self, namespace: &str) -> Result<Vec<VerticalPodAutoscaler>, Error> {
        self.record(format!("vpas:{}", namespace));
        Ok(self.vpas.clone())
    }

    async fn list_pdbs(&self, namespace: &str) -> Result<Vec<PodDisruptionBudget>, Error> {
        self.record(format!("pdbs:{}", namespace));
        if self.fail_pdbs {
            return Err(Error::KubeError(kube::Error::Api(ErrorResponse {
                status: "Failure".to_owned(),
                message: "poddisruptionbudgets.policy is forbidden".to_owned(),
                reason: "Forbidden".to_owned(),
                code: 403,
            })));
        }
        Ok(self.pdbs.clone())
    }

    async fn list_pods(&self, namespace: &str, label_selector: &str) -> Result<Vec<Pod>, Error> {
        self.record(format!("pods:{}:{}", namespace, label_selector));
        Ok(self.pods.clone())
    }
}

/// Reporter keeping every workload it is handed
#[derive(Default)]
pub struct CollectingReporter {
    pub workloads: Vec<Workload>,
}

impl Reporter for CollectingReporter {
    fn report(&mut self, workload: &Workload) -> Result<(), Error> {
        self.workloads.push(workload.clone());
        Ok(())
    }
}
