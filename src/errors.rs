use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Key '{0}' is empty")]
    MissingKey(&'static str),

    #[error("Kube API Error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Invalid workload type: {0}, please either use `all`, `deployment`, `statefulset`, or `cronjob`")]
    InvalidWorkloadType(String),

    #[error("Invalid QoS policy: {0}, expected `declarative` or `observed`")]
    InvalidQosPolicy(String),

    #[error("Invalid output format: {0}, expected `table` or `json`")]
    InvalidOutputFormat(String),

    #[error("Invalid quantity: '{0}'")]
    InvalidQuantity(String),

    #[error("Invalid workload: {0}")]
    InvalidWorkload(String),

    #[error("Environment config error: {0}")]
    ConfigError(#[from] envy::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
