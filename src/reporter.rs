//! Best-practice rules evaluated over a `Workload`, and the renderers printing them.
use std::fmt;
use std::io::Write;

use colored::Colorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::errors::Error;
use crate::quantity;
use crate::workload::{Container, CronJob, Pod, QosClass, Workload, WorkloadKind};

const PROBES_DOCS: &str = "https://kubernetes.io/docs/tasks/configure-pod-container/configure-liveness-readiness-startup-probes";
const RESOURCES_DOCS: &str = "https://kubernetes.io/docs/concepts/configuration/manage-resources-containers/#resource-requests-and-limits-of-pod-and-container";

/// Consumer of fully built workloads
pub trait Reporter {
    fn report(&mut self, workload: &Workload) -> Result<(), Error>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Compliance {
    Compliant,
    NonCompliant,
}

impl Compliance {
    fn from_bool(compliant: bool) -> Self {
        if compliant {
            Compliance::Compliant
        } else {
            Compliance::NonCompliant
        }
    }
}

impl fmt::Display for Compliance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compliance::Compliant => f.write_str("✔️"),
            Compliance::NonCompliant => f.write_str("✖️"),
        }
    }
}

#[derive(Tabled, Clone, Debug, PartialEq, Eq)]
pub struct ContainerCheck {
    #[tabled(rename = "Container Name")]
    pub container: String,
    #[tabled(rename = "Rule")]
    pub rule: String,
    #[tabled(rename = "Compliance")]
    pub compliance: Compliance,
    #[tabled(rename = "Reason")]
    pub reason: String,
}

#[derive(Tabled, Clone, Debug, PartialEq, Eq)]
pub struct Check {
    #[tabled(rename = "Rule")]
    pub rule: String,
    #[tabled(rename = "Compliance")]
    pub compliance: Compliance,
    #[tabled(rename = "Reason")]
    pub reason: String,
}

impl Check {
    fn new(rule: &str, compliant: bool, reason: impl Into<String>) -> Self {
        Check {
            rule: rule.to_owned(),
            compliance: Compliance::from_bool(compliant),
            reason: reason.into(),
        }
    }
}

/// Rule outcomes for one workload
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Report {
    pub name: String,
    pub type_name: &'static str,
    pub container_checks: Vec<ContainerCheck>,
    pub pod_checks: Vec<Check>,
    pub workload_checks: Vec<Check>,
}

impl Report {
    pub fn non_compliant(&self) -> usize {
        let container = self.container_checks.iter().map(|c| c.compliance);
        let rest = self.pod_checks.iter().chain(self.workload_checks.iter()).map(|c| c.compliance);
        container.chain(rest).filter(|c| *c == Compliance::NonCompliant).count()
    }
}

pub fn evaluate(workload: &Workload) -> Report {
    let pod = workload.pod();
    let workload_checks = match &workload.kind {
        WorkloadKind::Deployment(d) => replica_checks(d.replicas, d.hpa_set, d.vpa_set, d.pdb_set),
        WorkloadKind::StatefulSet(s) => replica_checks(s.replicas, s.hpa_set, s.vpa_set, s.pdb_set),
        WorkloadKind::CronJob(cron_job) => cron_job_checks(cron_job),
    };
    Report {
        name: workload.name.clone(),
        type_name: workload.type_name(),
        container_checks: pod.containers.iter().flat_map(container_checks).collect(),
        pod_checks: pod_checks(pod),
        workload_checks,
    }
}

fn container_checks(container: &Container) -> Vec<ContainerCheck> {
    let resource = &container.resource;
    let mut checks = Vec::with_capacity(6);

    checks.push(if container.liveness_probe_set {
        Check::new("Liveness Probe Set", true, "Liveness Probe set")
    } else {
        Check::new(
            "Liveness Probe Set",
            false,
            format!("Liveness Probe not set, should be set. {}", PROBES_DOCS),
        )
    });
    checks.push(if container.readiness_probe_set {
        Check::new("Readiness Probe Set", true, "Readiness Probe set")
    } else {
        Check::new(
            "Readiness Probe Set",
            false,
            format!("Readiness Probe not set, should be set. {}", PROBES_DOCS),
        )
    });
    checks.push(if quantity::is_zero(&resource.limits.cpu) {
        Check::new("CPU Limits Not Set", true, "CPU Limits not set.")
    } else {
        Check::new(
            "CPU Limits Set",
            false,
            "CPU Limits should not be set, see https://home.robusta.dev/blog/stop-using-cpu-limits for more information.",
        )
    });
    checks.push(if quantity::is_zero(&resource.limits.memory) {
        Check::new(
            "Memory Limits Not Set",
            false,
            format!("You should set a memory limit for your container. See {} for more information.", RESOURCES_DOCS),
        )
    } else {
        Check::new("Memory Limits Set", true, "Memory Limits should be set.")
    });
    checks.push(if quantity::is_zero(&resource.requests.cpu) {
        Check::new(
            "CPU Requests Not Set",
            false,
            format!("You should set a CPU request for your container. See {} for more information.", RESOURCES_DOCS),
        )
    } else {
        Check::new("CPU Requests Set", true, "CPU Requests should be set.")
    });
    checks.push(if quantity::is_zero(&resource.requests.memory) {
        Check::new(
            "Memory Requests Not Set",
            false,
            format!("You should set a memory request for your container. See {} for more information.", RESOURCES_DOCS),
        )
    } else {
        Check::new("Memory Requests Set", true, "Memory Requests should be set.")
    });

    checks
        .into_iter()
        .map(|check| ContainerCheck {
            container: container.name.clone(),
            rule: check.rule,
            compliance: check.compliance,
            reason: check.reason,
        })
        .collect()
}

fn pod_checks(pod: &Pod) -> Vec<Check> {
    let check = match pod.qos {
        QosClass::Guaranteed => Check::new(
            "Pod QoS",
            true,
            "Pod QoS is Guaranteed, this will get the highest priority with the scheduler, but it comes at the expense of having to set the CPU limit, which is not recommended.",
        ),
        QosClass::Burstable => Check::new(
            "Pod QoS",
            true,
            "Pod QoS as Burstable is pretty reasonable. It means that the pod has a memory limit and a memory request, but no CPU limit.",
        ),
        QosClass::BestEffort => Check::new(
            "Pod QoS",
            false,
            "Pod QoS as BestEffort is the lowest priority and should be avoided. See https://kubernetes.io/docs/tasks/configure-pod-container/quality-service-pod/ for more information",
        ),
        QosClass::NoActivePods => Check::new(
            "Pod QoS",
            false,
            "No active pods were found, so the QoS class could not be observed.",
        ),
    };
    vec![check]
}

fn replica_checks(replicas: i32, hpa_set: bool, vpa_set: bool, pdb_set: bool) -> Vec<Check> {
    vec![
        if replicas > 1 {
            Check::new("Replicas", true, "You have more than one replica, which is good for high availability.")
        } else {
            Check::new("Replicas", false, "You only have one replica, which is not recommended for high availability.")
        },
        if hpa_set {
            Check::new("HPA Set", true, "You have an HPA set, which is good for autoscaling.")
        } else {
            Check::new(
                "HPA Set",
                false,
                "You do not have an HPA set, which is not recommended for autoscaling. We recommend to use Keda, please check the docs here: https://keda.sh/",
            )
        },
        if vpa_set {
            Check::new("VPA Set", true, "You have a VPA set, which is good for autoscaling.")
        } else {
            Check::new(
                "VPA Set",
                false,
                "You do not have a VPA set, which would be fine if you have any autoscaling set such as HPA's.",
            )
        },
        if pdb_set {
            Check::new("PDB Set", true, "You have a PDB set, which is good for high availability.")
        } else {
            Check::new(
                "PDB Set",
                false,
                "You do not have a PDB set, which is not recommended for high availability. See https://kubernetes.io/docs/concepts/workloads/pods/disruptions/ for more information.",
            )
        },
    ]
}

fn cron_job_checks(cron_job: &CronJob) -> Vec<Check> {
    vec![
        if cron_job.concurrency_policy == "Allow" {
            Check::new(
                "Concurrency Policy",
                false,
                "Concurrent runs are allowed, consider `Forbid` or `Replace` to avoid overlapping jobs.",
            )
        } else {
            Check::new(
                "Concurrency Policy",
                true,
                format!("Concurrency policy is `{}`, runs will not overlap.", cron_job.concurrency_policy),
            )
        },
        if cron_job.active_deadline_seconds > 0 {
            Check::new("Active Deadline Set", true, "Jobs are bounded by an active deadline.")
        } else {
            Check::new(
                "Active Deadline Set",
                false,
                "Jobs have no active deadline and may run forever. See https://kubernetes.io/docs/concepts/workloads/controllers/job/#job-termination-and-cleanup for more information.",
            )
        },
        if cron_job.failed_jobs_history_limit > 0 {
            Check::new("Failed Jobs History Kept", true, "Failed jobs are kept for inspection.")
        } else {
            Check::new(
                "Failed Jobs History Kept",
                false,
                "Failed jobs are not kept, which makes debugging failures harder.",
            )
        },
        if cron_job.suspended {
            Check::new("Not Suspended", false, "The CronJob is suspended, no jobs will be scheduled.")
        } else {
            Check::new("Not Suspended", true, "The CronJob is active.")
        },
    ]
}

/// Renders each workload as colored tables of rule outcomes
pub struct TableReporter<W: Write> {
    out: W,
}

impl<W: Write> TableReporter<W> {
    pub fn new(out: W) -> Self {
        TableReporter { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn heading(&mut self, text: &str) -> Result<(), Error> {
        writeln!(self.out, "{}\n", text.magenta().bold().underline())?;
        Ok(())
    }

    fn table<T: Tabled>(&mut self, rows: &[T]) -> Result<(), Error> {
        writeln!(self.out, "{}\n", Table::new(rows).with(Style::rounded()))?;
        Ok(())
    }
}

impl<W: Write> Reporter for TableReporter<W> {
    fn report(&mut self, workload: &Workload) -> Result<(), Error> {
        let report = evaluate(workload);

        writeln!(self.out)?;
        self.heading(&format!("Report for {} {}", report.type_name, report.name))?;
        self.heading("Container-specific checks")?;
        self.table(&report.container_checks)?;
        self.heading("Pod-specific checks")?;
        self.table(&report.pod_checks)?;
        self.heading(&format!("{}-specific checks", report.type_name))?;
        self.table(&report.workload_checks)?;
        Ok(())
    }
}

/// Writes each workload as pretty printed JSON
pub struct JsonReporter<W: Write> {
    out: W,
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        JsonReporter { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn report(&mut self, workload: &Workload) -> Result<(), Error> {
        serde_json::to_writer_pretty(&mut self.out, workload)?;
        writeln!(self.out)?;
        Ok(())
    }
}
