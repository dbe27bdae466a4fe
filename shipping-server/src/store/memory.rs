//! In-memory order store.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::{Order, OrderStatus, TrackingUpdate};
use crate::shipment::CreatedShipment;

use super::{OrderStore, StoreError, apply_shipment, apply_tracking};

/// Orders held in a map, for tests and demos.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<String, Order>>>,
    writes: Arc<RwLock<Vec<(String, TrackingUpdate)>>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_orders(orders: impl IntoIterator<Item = Order>) -> Self {
        let map = orders.into_iter().map(|o| (o.id.clone(), o)).collect();
        Self {
            orders: Arc::new(RwLock::new(map)),
            writes: Arc::default(),
        }
    }

    /// Every tracking update recorded so far, in order.
    pub async fn tracking_writes(&self) -> Vec<(String, TrackingUpdate)> {
        self.writes.read().await.clone()
    }
}

impl OrderStore for InMemoryOrderStore {
    async fn orders_with_status(&self, statuses: &[OrderStatus]) -> Result<Vec<Order>, StoreError> {
        let guard = self.orders.read().await;
        let mut orders: Vec<Order> = guard
            .values()
            .filter(|o| statuses.contains(&o.status))
            .cloned()
            .collect();
        orders.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(orders)
    }

    async fn get(&self, order_id: &str) -> Result<Option<Order>, StoreError> {
        Ok(self.orders.read().await.get(order_id).cloned())
    }

    async fn attach_shipment(
        &self,
        order_id: &str,
        shipment: &CreatedShipment,
    ) -> Result<(), StoreError> {
        let mut guard = self.orders.write().await;
        let order = guard
            .get_mut(order_id)
            .ok_or_else(|| StoreError::NotFound(order_id.to_string()))?;
        apply_shipment(order, shipment)
    }

    async fn record_tracking(&self, order_id: &str, update: &TrackingUpdate) -> Result<(), StoreError> {
        let mut guard = self.orders.write().await;
        let order = guard
            .get_mut(order_id)
            .ok_or_else(|| StoreError::NotFound(order_id.to_string()))?;
        if !apply_tracking(order, update) {
            return Err(StoreError::NotFound(format!("{order_id} (no shipment)")));
        }
        self.writes
            .write()
            .await
            .push((order_id.to_string(), update.clone()));
        Ok(())
    }
}
