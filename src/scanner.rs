use kube::ResourceExt;
use log::{debug, info, warn};

use crate::builder::{Companions, RawWorkload};
use crate::config::{QosPolicy, ScanConfig, WorkloadType};
use crate::errors::Error;
use crate::lister::ClusterLister;
use crate::reporter::Reporter;
use crate::utils::plural_str;
use crate::workload::Workload;

pub const DEFAULT_NAMESPACE: &str = "default";

/// Scan every selected workload kind one workload at a time, handing each built
/// `Workload` to `reporter`. The first listing or build error aborts the scan.
///
/// Returns the number of workloads reported.
pub async fn scan_cluster<L, R>(lister: &L, config: &ScanConfig, reporter: &mut R) -> Result<usize, Error>
where
    L: ClusterLister,
    R: Reporter,
{
    let namespace = config.namespace.as_deref();
    let mut reported = 0;

    for kind in config.workload_type.kinds() {
        reported += match kind {
            WorkloadType::Deployment => {
                let items = lister.list_deployments(namespace).await?;
                scan_workloads(lister, &items, config, reporter).await?
            }
            WorkloadType::StatefulSet => {
                let items = lister.list_stateful_sets(namespace).await?;
                scan_workloads(lister, &items, config, reporter).await?
            }
            WorkloadType::CronJob => {
                let items = lister.list_cron_jobs(namespace).await?;
                scan_workloads(lister, &items, config, reporter).await?
            }
            WorkloadType::All => 0,
        };
    }
    Ok(reported)
}

async fn scan_workloads<L, R, K>(lister: &L, items: &[K], config: &ScanConfig, reporter: &mut R) -> Result<usize, Error>
where
    L: ClusterLister,
    R: Reporter,
    K: RawWorkload,
{
    info!("Found {} {}", items.len(), plural_str(items.len(), &format!("{}s", K::TYPE)));

    for item in items {
        let namespace = item
            .namespace()
            .or_else(|| config.namespace.clone())
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_owned());
        let companions = fetch_companions(lister, item, &namespace, config.qos_policy).await?;
        let workload = item.build(&companions, config.qos_policy)?;
        log_workload(&workload);
        reporter.report(&workload)?;
    }
    Ok(items.len())
}

/// List the companion resources `item` may correlate with, in its own namespace
pub async fn fetch_companions<L, K>(
    lister: &L,
    item: &K,
    namespace: &str,
    policy: QosPolicy,
) -> Result<Companions, Error>
where
    L: ClusterLister,
    K: RawWorkload,
{
    let mut companions = Companions::default();
    if K::TAKES_COMPANIONS {
        companions.hpas = lister.list_hpas(namespace).await?;
        companions.vpas = lister.list_vpas(namespace).await?;
        companions.pdbs = lister.list_pdbs(namespace).await?;
    }
    if policy == QosPolicy::Observed {
        match item.pod_selector() {
            Some(selector) => companions.pods = lister.list_pods(namespace, &selector).await?,
            None => debug!("'{}' has no pod selector, not listing pods", item.name_any()),
        }
    }
    Ok(companions)
}

/// Dump the workload to the log; failing to serialize it is not fatal.
pub fn log_workload(workload: &Workload) {
    debug!("{:#?}", workload);
    match serde_json::to_string_pretty(workload) {
        Ok(json) => info!("{}", json),
        Err(err) => warn!("Failed to serialize workload '{}': {}", workload.name, err),
    }
}
