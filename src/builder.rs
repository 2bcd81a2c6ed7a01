//! Turns raw cluster objects plus their companion lists into normalized `Workload`s.
use k8s_openapi::api::apps::v1 as apps;
use k8s_openapi::api::autoscaling::v2::HorizontalPodAutoscaler;
use k8s_openapi::api::batch::v1 as batch;
use k8s_openapi::api::core::v1 as core;
use k8s_openapi::api::policy::v1::PodDisruptionBudget;
use kube::ResourceExt;
use log::debug;

use crate::classifier::{classify_qos, observed_qos};
use crate::config::{QosPolicy, WorkloadType};
use crate::correlator::{correlated_names, WorkloadRef};
use crate::crd::vpa::VerticalPodAutoscaler;
use crate::errors::Error;
use crate::quantity;
use crate::utils::selector_query;
use crate::workload::{
    Container, CronJob, Deployment, Labels, Limits, Pod, Requests, Resource, StatefulSet, Workload, WorkloadKind,
};

pub const DEFAULT_REPLICAS: i32 = 1;
pub const DEFAULT_CONCURRENCY_POLICY: &str = "Allow";
pub const DEFAULT_RESTART_POLICY: &str = "Always";
pub const DEFAULT_SUCCESSFUL_JOBS_HISTORY_LIMIT: i32 = 3;
pub const DEFAULT_FAILED_JOBS_HISTORY_LIMIT: i32 = 1;
pub const DEFAULT_PARALLELISM: i32 = 1;
pub const DEFAULT_COMPLETIONS: i32 = 1;
pub const DEFAULT_BACKOFF_LIMIT: i32 = 6;

/// Companion resources already fetched for the workload's namespace
#[derive(Clone, Debug, Default)]
pub struct Companions {
    pub hpas: Vec<HorizontalPodAutoscaler>,
    pub vpas: Vec<VerticalPodAutoscaler>,
    pub pdbs: Vec<PodDisruptionBudget>,
    /// Live pods of the workload, only listed under `QosPolicy::Observed`
    pub pods: Vec<core::Pod>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct CompanionFlags {
    hpa_set: bool,
    vpa_set: bool,
    pdb_set: bool,
}

/// A workload object as listed from the cluster
pub trait RawWorkload: ResourceExt {
    const TYPE: WorkloadType;

    /// Whether autoscalers and disruption budgets can target this kind
    const TAKES_COMPANIONS: bool = true;

    /// Label query selecting this workload's pods
    fn pod_selector(&self) -> Option<String>;

    fn build(&self, companions: &Companions, policy: QosPolicy) -> Result<Workload, Error>;
}

impl RawWorkload for apps::Deployment {
    const TYPE: WorkloadType = WorkloadType::Deployment;

    fn pod_selector(&self) -> Option<String> {
        self.spec.as_ref().and_then(|spec| selector_query(&spec.selector))
    }

    fn build(&self, companions: &Companions, policy: QosPolicy) -> Result<Workload, Error> {
        let name = object_name(&self.metadata)?;
        let labels = self.labels().clone();
        let spec = self.spec.as_ref().ok_or(Error::MissingKey(".spec"))?;
        let replicas = spec.replicas.unwrap_or(DEFAULT_REPLICAS);
        debug!(" * {} ({} replicas)", name, replicas);

        let pod = build_pod(&spec.template, companions, policy)?;
        let flags = correlate(&name, &labels, companions);

        Ok(Workload {
            name,
            labels,
            kind: WorkloadKind::Deployment(Deployment {
                replicas,
                hpa_set: flags.hpa_set,
                vpa_set: flags.vpa_set,
                pdb_set: flags.pdb_set,
                pod,
            }),
        })
    }
}

impl RawWorkload for apps::StatefulSet {
    const TYPE: WorkloadType = WorkloadType::StatefulSet;

    fn pod_selector(&self) -> Option<String> {
        self.spec.as_ref().and_then(|spec| selector_query(&spec.selector))
    }

    fn build(&self, companions: &Companions, policy: QosPolicy) -> Result<Workload, Error> {
        let name = object_name(&self.metadata)?;
        let labels = self.labels().clone();
        let spec = self.spec.as_ref().ok_or(Error::MissingKey(".spec"))?;
        let replicas = spec.replicas.unwrap_or(DEFAULT_REPLICAS);
        debug!(" * {} ({} replicas)", name, replicas);

        let pod = build_pod(&spec.template, companions, policy)?;
        let flags = correlate(&name, &labels, companions);

        Ok(Workload {
            name,
            labels,
            kind: WorkloadKind::StatefulSet(StatefulSet {
                replicas,
                hpa_set: flags.hpa_set,
                vpa_set: flags.vpa_set,
                pdb_set: flags.pdb_set,
                pod,
            }),
        })
    }
}

impl RawWorkload for batch::CronJob {
    const TYPE: WorkloadType = WorkloadType::CronJob;
    const TAKES_COMPANIONS: bool = false;

    fn pod_selector(&self) -> Option<String> {
        let labels = self
            .spec
            .as_ref()?
            .job_template
            .spec
            .as_ref()?
            .template
            .metadata
            .as_ref()?
            .labels
            .as_ref()?;
        let query = labels
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<String>>()
            .join(",");
        Some(query).filter(|q| !q.is_empty())
    }

    fn build(&self, companions: &Companions, policy: QosPolicy) -> Result<Workload, Error> {
        let name = object_name(&self.metadata)?;
        let labels = self.labels().clone();
        let spec = self.spec.as_ref().ok_or(Error::MissingKey(".spec"))?;
        let job = spec
            .job_template
            .spec
            .as_ref()
            .ok_or(Error::MissingKey(".spec.jobTemplate.spec"))?;
        debug!(" * {} ({})", name, spec.schedule);

        let pod = build_pod(&job.template, companions, policy)?;
        let restart_policy = job
            .template
            .spec
            .as_ref()
            .and_then(|pod_spec| pod_spec.restart_policy.clone())
            .unwrap_or_else(|| DEFAULT_RESTART_POLICY.to_owned());

        Ok(Workload {
            name,
            labels,
            kind: WorkloadKind::CronJob(CronJob {
                schedule: spec.schedule.clone(),
                concurrency_policy: spec
                    .concurrency_policy
                    .clone()
                    .unwrap_or_else(|| DEFAULT_CONCURRENCY_POLICY.to_owned()),
                suspended: spec.suspend.unwrap_or(false),
                successful_jobs_history_limit: spec
                    .successful_jobs_history_limit
                    .unwrap_or(DEFAULT_SUCCESSFUL_JOBS_HISTORY_LIMIT),
                failed_jobs_history_limit: spec
                    .failed_jobs_history_limit
                    .unwrap_or(DEFAULT_FAILED_JOBS_HISTORY_LIMIT),
                parallelism: job.parallelism.unwrap_or(DEFAULT_PARALLELISM),
                completions: job.completions.unwrap_or(DEFAULT_COMPLETIONS),
                restart_policy,
                backoff_limit: job.backoff_limit.unwrap_or(DEFAULT_BACKOFF_LIMIT),
                active_deadline_seconds: job.active_deadline_seconds.unwrap_or(0),
                pod,
            }),
        })
    }
}

fn object_name(metadata: &k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta) -> Result<String, Error> {
    metadata.name.clone().ok_or(Error::MissingKey(".metadata.name"))
}

/// Normalize one container: canonical quantities and probe presence
pub fn build_container(container: &core::Container) -> Result<Container, Error> {
    let requirements = container.resources.as_ref();
    let lookup = |limits: bool, resource: &str| -> Result<String, Error> {
        let quantities = requirements.and_then(|r| if limits { r.limits.as_ref() } else { r.requests.as_ref() });
        quantity::normalize(quantities.and_then(|q| q.get(resource)).map(|q| q.0.as_str()))
    };

    Ok(Container {
        name: container.name.clone(),
        readiness_probe_set: container.readiness_probe.is_some(),
        liveness_probe_set: container.liveness_probe.is_some(),
        resource: Resource {
            requests: Requests {
                memory: lookup(false, "memory")?,
                cpu: lookup(false, "cpu")?,
            },
            limits: Limits {
                memory: lookup(true, "memory")?,
                cpu: lookup(true, "cpu")?,
            },
        },
    })
}

fn build_pod(template: &core::PodTemplateSpec, companions: &Companions, policy: QosPolicy) -> Result<Pod, Error> {
    let labels: Labels = template
        .metadata
        .as_ref()
        .and_then(|metadata| metadata.labels.clone())
        .unwrap_or_default();

    let containers = template
        .spec
        .iter()
        .flat_map(|spec| spec.containers.iter())
        .map(build_container)
        .collect::<Result<Vec<Container>, Error>>()?;

    let qos = match policy {
        QosPolicy::Declarative => {
            let resources: Vec<Resource> = containers.iter().map(|c| c.resource.clone()).collect();
            classify_qos(&resources)
        }
        QosPolicy::Observed => observed_qos(&companions.pods),
    };

    Ok(Pod {
        labels,
        containers,
        qos,
    })
}

fn correlate(name: &str, labels: &Labels, companions: &Companions) -> CompanionFlags {
    let workload = WorkloadRef { name, labels };

    let matching_hpas = correlated_names(&companions.hpas, &workload);
    let matching_vpas = correlated_names(&companions.vpas, &workload);
    let matching_pdbs = correlated_names(&companions.pdbs, &workload);
    debug!(
        "'{}' correlates with HPAs {:?}, VPAs {:?}, PDBs {:?}",
        name, matching_hpas, matching_vpas, matching_pdbs
    );

    CompanionFlags {
        hpa_set: !matching_hpas.is_empty(),
        vpa_set: !matching_vpas.is_empty(),
        pdb_set: !matching_pdbs.is_empty(),
    }
}
