//! Disk-backed order store.
//!
//! The storefront owns `orders.json` and may rewrite it at any time, so
//! nothing is cached: every call reads the file, and every write is a
//! read-modify-write under one lock that touches only `status` and
//! `shipment` of the target order. The new document goes to a temp file in
//! the same directory and is renamed over the old one.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::domain::{Order, OrderStatus, TrackingUpdate};
use crate::shipment::CreatedShipment;

use super::{OrderStore, StoreError, apply_shipment, apply_tracking};

/// Fields of an order document this store writes.
const OWNED_FIELDS: [&str; 2] = ["status", "shipment"];

/// Order store persisted as a JSON array.
#[derive(Debug, Clone)]
pub struct JsonFileOrderStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl JsonFileOrderStore {
    /// Open a store, checking that an existing file parses.
    ///
    /// A missing file is an empty store.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self {
            path: path.into(),
            write_lock: Arc::default(),
        };
        let documents = store.load().await?;
        debug!(path = %store.path.display(), orders = documents.len(), "order store opened");
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Vec<Value>, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => serde_json::from_str(&contents).map_err(|source| self.json_error(source)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(source) => Err(StoreError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    async fn orders(&self) -> Result<Vec<Order>, StoreError> {
        let documents = self.load().await?;
        let mut orders = Vec::with_capacity(documents.len());
        for document in documents {
            match serde_json::from_value::<Order>(document) {
                Ok(order) => orders.push(order),
                Err(e) => warn!(path = %self.path.display(), error = %e, "skipping unreadable order"),
            }
        }
        Ok(orders)
    }

    /// Apply `change` to one order and write the file back.
    ///
    /// Nothing is written if `change` fails.
    async fn modify<F>(&self, order_id: &str, change: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Order) -> Result<(), StoreError>,
    {
        let _guard = self.write_lock.lock().await;

        let mut documents = self.load().await?;
        let document = documents
            .iter_mut()
            .find(|d| d.get("id").and_then(Value::as_str) == Some(order_id))
            .ok_or_else(|| StoreError::NotFound(order_id.to_string()))?;

        let mut order: Order =
            serde_json::from_value(document.clone()).map_err(|source| self.json_error(source))?;
        change(&mut order)?;

        let updated = serde_json::to_value(&order).map_err(|source| self.json_error(source))?;
        if let Value::Object(target) = document {
            for field in OWNED_FIELDS {
                if let Some(value) = updated.get(field) {
                    merge(target.entry(field).or_insert(Value::Null), value);
                }
            }
        }

        self.persist(&documents).await
    }

    async fn persist(&self, documents: &[Value]) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(documents).map_err(|source| self.json_error(source))?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || replace_file(&path, &json))
            .await
            .map_err(|e| StoreError::Io {
                path: self.path.clone(),
                source: std::io::Error::other(e),
            })?
            .map_err(|source| StoreError::Io {
                path: self.path.clone(),
                source,
            })
    }

    fn json_error(&self, source: serde_json::Error) -> StoreError {
        StoreError::Json {
            path: self.path.clone(),
            source,
        }
    }
}

/// Write `contents` to a sibling temp file and rename it over `path`.
fn replace_file(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Overlay `patch` onto `target`, keeping object keys `patch` lacks.
fn merge(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (&mut Value::Object(ref mut target), &Value::Object(ref patch)) => {
            for (key, value) in patch {
                merge(target.entry(key.as_str()).or_insert(Value::Null), value);
            }
        }
        (target, patch) => *target = patch.clone(),
    }
}

impl OrderStore for JsonFileOrderStore {
    async fn orders_with_status(&self, statuses: &[OrderStatus]) -> Result<Vec<Order>, StoreError> {
        Ok(self
            .orders()
            .await?
            .into_iter()
            .filter(|o| statuses.contains(&o.status))
            .collect())
    }

    async fn get(&self, order_id: &str) -> Result<Option<Order>, StoreError> {
        Ok(self.orders().await?.into_iter().find(|o| o.id == order_id))
    }

    async fn attach_shipment(
        &self,
        order_id: &str,
        shipment: &CreatedShipment,
    ) -> Result<(), StoreError> {
        self.modify(order_id, |order| apply_shipment(order, shipment))
            .await
    }

    async fn record_tracking(&self, order_id: &str, update: &TrackingUpdate) -> Result<(), StoreError> {
        self.modify(order_id, |order| {
            if apply_tracking(order, update) {
                Ok(())
            } else {
                Err(StoreError::NotFound(format!("{order_id} (no shipment)")))
            }
        })
        .await
    }
}
