use std::fmt::Debug;

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{Deployment, StatefulSet};
use k8s_openapi::api::autoscaling::v2::HorizontalPodAutoscaler;
use k8s_openapi::api::batch::v1::CronJob;
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::api::policy::v1::PodDisruptionBudget;
use k8s_openapi::NamespaceResourceScope;
use kube::api::{Api, ListParams};
use kube::{Client, Resource, ResourceExt};
use log::debug;
use serde::de::DeserializeOwned;

use crate::crd::vpa::VerticalPodAutoscaler;
use crate::errors::Error;

/// Source of raw workloads and their companion resources.
///
/// `namespace: None` lists across all namespaces. Any error is fatal to the scan.
#[async_trait]
pub trait ClusterLister: Sync {
    async fn list_deployments(&self, namespace: Option<&str>) -> Result<Vec<Deployment>, Error>;
    async fn list_stateful_sets(&self, namespace: Option<&str>) -> Result<Vec<StatefulSet>, Error>;
    async fn list_cron_jobs(&self, namespace: Option<&str>) -> Result<Vec<CronJob>, Error>;
    async fn list_hpas(&self, namespace: &str) -> Result<Vec<HorizontalPodAutoscaler>, Error>;
    async fn list_vpas(&self, namespace: &str) -> Result<Vec<VerticalPodAutoscaler>, Error>;
    async fn list_pdbs(&self, namespace: &str) -> Result<Vec<PodDisruptionBudget>, Error>;
    async fn list_pods(&self, namespace: &str, label_selector: &str) -> Result<Vec<Pod>, Error>;
}

/// Get a `Client` from the local kube config, falling back to the in-cluster config
pub async fn load_client() -> Result<Client, Error> {
    Ok(Client::try_default().await?)
}

/// `ClusterLister` backed by the Kubernetes API
#[derive(Clone)]
pub struct KubeLister {
    client: Client,
}

impl KubeLister {
    pub fn new(client: Client) -> Self {
        KubeLister { client }
    }

    fn api<K>(&self, namespace: Option<&str>) -> Api<K>
    where
        K: Resource<DynamicType = (), Scope = NamespaceResourceScope>,
    {
        match namespace {
            Some(namespace) => Api::namespaced(self.client.clone(), namespace),
            None => Api::all(self.client.clone()),
        }
    }

    async fn list<K>(&self, namespace: Option<&str>, params: &ListParams) -> Result<Vec<K>, Error>
    where
        K: Resource<DynamicType = (), Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Debug,
    {
        let list = self.api::<K>(namespace).list(params).await?;
        for item in &list.items {
            debug!(" * {} {}", K::kind(&()), item.name_any());
        }
        Ok(list.items)
    }
}

#[async_trait]
impl ClusterLister for KubeLister {
    async fn list_deployments(&self, namespace: Option<&str>) -> Result<Vec<Deployment>, Error> {
        self.list(namespace, &ListParams::default()).await
    }

    async fn list_stateful_sets(&self, namespace: Option<&str>) -> Result<Vec<StatefulSet>, Error> {
        self.list(namespace, &ListParams::default()).await
    }

    async fn list_cron_jobs(&self, namespace: Option<&str>) -> Result<Vec<CronJob>, Error> {
        self.list(namespace, &ListParams::default()).await
    }

    async fn list_hpas(&self, namespace: &str) -> Result<Vec<HorizontalPodAutoscaler>, Error> {
        self.list(Some(namespace), &ListParams::default()).await
    }

    async fn list_vpas(&self, namespace: &str) -> Result<Vec<VerticalPodAutoscaler>, Error> {
        self.list(Some(namespace), &ListParams::default()).await
    }

    async fn list_pdbs(&self, namespace: &str) -> Result<Vec<PodDisruptionBudget>, Error> {
        self.list(Some(namespace), &ListParams::default()).await
    }

    async fn list_pods(&self, namespace: &str, label_selector: &str) -> Result<Vec<Pod>, Error> {
        self.list(Some(namespace), &ListParams::default().labels(label_selector)).await
    }
}
