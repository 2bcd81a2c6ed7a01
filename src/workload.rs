use std::collections::BTreeMap;
use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::errors::Error;

pub type Labels = BTreeMap<String, String>;

pub const DEPLOYMENT: &str = "Deployment";
pub const STATEFUL_SET: &str = "StatefulSet";
pub const CRON_JOB: &str = "CronJob";

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Requests {
    pub memory: String,
    pub cpu: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Limits {
    pub memory: String,
    pub cpu: String,
}

/// Canonical request/limit quantities of one container
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Resource {
    pub requests: Requests,
    pub limits: Limits,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    pub name: String,
    pub readiness_probe_set: bool,
    pub liveness_probe_set: bool,
    pub resource: Resource,
}

/// Quality-of-Service tier of a pod
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum QosClass {
    Guaranteed,
    Burstable,
    BestEffort,
    /// Observed policy found no live pod to read the tier from
    NoActivePods,
}

impl fmt::Display for QosClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QosClass::Guaranteed => "Guaranteed",
            QosClass::Burstable => "Burstable",
            QosClass::BestEffort => "BestEffort",
            QosClass::NoActivePods => "NoActivePods",
        };
        f.write_str(name)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Pod {
    pub labels: Labels,
    pub containers: Vec<Container>,
    pub qos: QosClass,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub replicas: i32,
    pub hpa_set: bool,
    pub vpa_set: bool,
    pub pdb_set: bool,
    pub pod: Pod,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatefulSet {
    pub replicas: i32,
    pub hpa_set: bool,
    pub vpa_set: bool,
    pub pdb_set: bool,
    pub pod: Pod,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CronJob {
    pub schedule: String,
    pub concurrency_policy: String,
    pub suspended: bool,
    pub successful_jobs_history_limit: i32,
    pub failed_jobs_history_limit: i32,
    pub parallelism: i32,
    pub completions: i32,
    pub restart_policy: String,
    pub backoff_limit: i32,
    pub active_deadline_seconds: i64,
    pub pod: Pod,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorkloadKind {
    Deployment(Deployment),
    StatefulSet(StatefulSet),
    CronJob(CronJob),
}

impl WorkloadKind {
    /// The `type` tag carried in the serialized record
    pub fn type_name(&self) -> &'static str {
        match self {
            WorkloadKind::Deployment(_) => DEPLOYMENT,
            WorkloadKind::StatefulSet(_) => STATEFUL_SET,
            WorkloadKind::CronJob(_) => CRON_JOB,
        }
    }

    pub fn pod(&self) -> &Pod {
        match self {
            WorkloadKind::Deployment(deployment) => &deployment.pod,
            WorkloadKind::StatefulSet(stateful_set) => &stateful_set.pod,
            WorkloadKind::CronJob(cron_job) => &cron_job.pod,
        }
    }
}

/// A normalized workload, ready to be handed to a reporter.
///
/// Serializes as `{"name", "type", "labels", <variant>}` where `<variant>` is exactly one
/// of `deployment`, `statefulset` or `cronjob`; the other two keys never appear.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(try_from = "WorkloadRecord")]
pub struct Workload {
    pub name: String,
    pub labels: Labels,
    pub kind: WorkloadKind,
}

impl Workload {
    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    pub fn pod(&self) -> &Pod {
        self.kind.pod()
    }
}

impl Serialize for Workload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Workload", 4)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("type", self.type_name())?;
        state.serialize_field("labels", &self.labels)?;
        match &self.kind {
            WorkloadKind::Deployment(deployment) => state.serialize_field("deployment", deployment)?,
            WorkloadKind::StatefulSet(stateful_set) => state.serialize_field("statefulset", stateful_set)?,
            WorkloadKind::CronJob(cron_job) => state.serialize_field("cronjob", cron_job)?,
        }
        state.end()
    }
}

/// Wire shape of a `Workload` before the one-variant invariant is checked
#[derive(Deserialize)]
pub struct WorkloadRecord {
    name: String,
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default)]
    labels: Labels,
    deployment: Option<Deployment>,
    statefulset: Option<StatefulSet>,
    cronjob: Option<CronJob>,
}

impl TryFrom<WorkloadRecord> for Workload {
    type Error = Error;

    fn try_from(record: WorkloadRecord) -> Result<Self, Self::Error> {
        let kind = match (record.deployment, record.statefulset, record.cronjob) {
            (Some(deployment), None, None) => WorkloadKind::Deployment(deployment),
            (None, Some(stateful_set), None) => WorkloadKind::StatefulSet(stateful_set),
            (None, None, Some(cron_job)) => WorkloadKind::CronJob(cron_job),
            _ => {
                return Err(Error::InvalidWorkload(format!(
                    "'{}' must carry exactly one of deployment, statefulset or cronjob",
                    record.name
                )))
            }
        };
        if kind.type_name() != record.type_name {
            return Err(Error::InvalidWorkload(format!(
                "'{}' has type '{}' but carries a {} payload",
                record.name,
                record.type_name,
                kind.type_name()
            )));
        }
        Ok(Workload {
            name: record.name,
            labels: record.labels,
            kind,
        })
    }
}
