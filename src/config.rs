use std::fmt;
use std::str::FromStr;

use log::LevelFilter;
use serde::Deserialize;

use crate::errors::Error;

pub const ENV_PREFIX: &str = "WORKLOAD_INSPECTOR_";

/// Which workload kinds a scan covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadType {
    All,
    Deployment,
    StatefulSet,
    CronJob,
}

impl WorkloadType {
    /// Concrete kinds in scan order
    pub fn kinds(self) -> &'static [WorkloadType] {
        match self {
            WorkloadType::All => &[WorkloadType::Deployment, WorkloadType::StatefulSet, WorkloadType::CronJob],
            WorkloadType::Deployment => &[WorkloadType::Deployment],
            WorkloadType::StatefulSet => &[WorkloadType::StatefulSet],
            WorkloadType::CronJob => &[WorkloadType::CronJob],
        }
    }
}

impl FromStr for WorkloadType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(WorkloadType::All),
            "deployment" => Ok(WorkloadType::Deployment),
            "statefulset" => Ok(WorkloadType::StatefulSet),
            "cronjob" => Ok(WorkloadType::CronJob),
            _ => Err(Error::InvalidWorkloadType(s.to_owned())),
        }
    }
}

impl fmt::Display for WorkloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkloadType::All => "all",
            WorkloadType::Deployment => "deployment",
            WorkloadType::StatefulSet => "statefulset",
            WorkloadType::CronJob => "cronjob",
        };
        f.write_str(name)
    }
}

/// How the QoS tier of a workload's pod is determined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QosPolicy {
    /// Derived from the declared container requests and limits
    Declarative,
    /// Read from the status of a live pod
    Observed,
}

impl FromStr for QosPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "declarative" => Ok(QosPolicy::Declarative),
            "observed" => Ok(QosPolicy::Observed),
            _ => Err(Error::InvalidQosPolicy(s.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(Error::InvalidOutputFormat(s.to_owned())),
        }
    }
}

/// Defaults read from `WORKLOAD_INSPECTOR_*` environment variables
#[derive(Deserialize, Debug, Clone, Default)]
pub struct EnvironmentConfig {
    pub namespace: Option<String>,
    pub workload_type: Option<String>,
    pub qos_policy: Option<String>,
    pub output: Option<String>,
}

impl EnvironmentConfig {
    pub fn from_env() -> Result<Self, Error> {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I>(vars: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::prefixed(ENV_PREFIX).from_iter::<_, EnvironmentConfig>(vars)?)
    }
}

/// Values given on the command line; each one overrides the environment
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub namespace: Option<String>,
    pub workload_type: Option<String>,
    pub qos_policy: Option<String>,
    pub output: Option<String>,
    pub verbose: bool,
}

/// Validated settings of a single scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// `None` scans every namespace
    pub namespace: Option<String>,
    pub workload_type: WorkloadType,
    pub qos_policy: QosPolicy,
    pub output: OutputFormat,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            namespace: None,
            workload_type: WorkloadType::All,
            qos_policy: QosPolicy::Declarative,
            output: OutputFormat::Table,
        }
    }
}

impl ScanConfig {
    /// Merge command line over environment over defaults, rejecting unknown values.
    pub fn resolve(cli: &CliOverrides, env: &EnvironmentConfig) -> Result<Self, Error> {
        let defaults = ScanConfig::default();

        let namespace = cli
            .namespace
            .clone()
            .or_else(|| env.namespace.clone())
            .filter(|ns| !ns.is_empty());

        let workload_type = match cli.workload_type.as_ref().or(env.workload_type.as_ref()) {
            Some(value) => value.parse()?,
            None => defaults.workload_type,
        };
        let qos_policy = match cli.qos_policy.as_ref().or(env.qos_policy.as_ref()) {
            Some(value) => value.parse()?,
            None => defaults.qos_policy,
        };
        let output = match cli.output.as_ref().or(env.output.as_ref()) {
            Some(value) => value.parse()?,
            None => defaults.output,
        };

        Ok(ScanConfig {
            namespace,
            workload_type,
            qos_policy,
            output,
        })
    }
}

/// Process-wide logging setup, built once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogConfig {
    pub level: LevelFilter,
}

impl LogConfig {
    pub fn from_verbosity(verbose: bool) -> Self {
        let level = if verbose { LevelFilter::Info } else { LevelFilter::Error };
        LogConfig { level }
    }
}

/// Install the logger; `RUST_LOG` still takes precedence over `config.level`.
pub fn init_logging(config: &LogConfig) {
    env_logger::Builder::new()
        .filter_level(config.level)
        .parse_default_env()
        .init();
}
