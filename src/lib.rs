pub mod builder;
pub mod classifier;
pub mod config;
pub mod correlator;
pub mod crd;
pub mod errors;
pub mod lister;
pub mod quantity;
pub mod reporter;
pub mod scanner;
pub mod utils;
pub mod workload;

pub use builder::{Companions, RawWorkload};
pub use classifier::{classify_qos, observed_qos};
pub use config::{LogConfig, OutputFormat, QosPolicy, ScanConfig, WorkloadType};
pub use correlator::{labels_match_any, Correlate, WorkloadRef};
pub use lister::{ClusterLister, KubeLister};
pub use scanner::scan_cluster;
pub use workload::{QosClass, Workload, WorkloadKind};
