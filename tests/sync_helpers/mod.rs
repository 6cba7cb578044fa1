#![allow(dead_code)]

use topo_sync::catalog::{Dataset, Resource, PUBLIC_TRANSIT};
use topo_sync::config::Settings;
use topo_sync::sync::SyncContext;

pub const PAGE_BASE: &str = "https://www.data.gouv.fr/fr/datasets/";
pub const PROPERTY: &str = "P17";

pub fn page(id: &str) -> String {
    format!("{PAGE_BASE}{id}")
}

pub fn context() -> SyncContext {
    SyncContext::new(Settings {
        property_id: Some(PROPERTY.to_string()),
        ..Default::default()
    })
}

pub fn resource(url: &str, format: &str, title: &str) -> Resource {
    Resource {
        url: Some(url.to_string()),
        format: Some(format.to_string()),
        title: Some(title.to_string()),
    }
}

pub fn transit_dataset(id: &str, resources: Vec<Resource>) -> Dataset {
    Dataset {
        title: Some(format!("Dataset {id}")),
        datagouv_id: id.to_string(),
        kind: Some(PUBLIC_TRANSIT.to_string()),
        resources,
    }
}
