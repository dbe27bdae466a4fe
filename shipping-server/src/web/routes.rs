//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::error::ShippingError;
use crate::envioclick::CarrierApi;
use crate::quote::QuoteRequest;
use crate::shipment::ShipmentRequest;
use crate::store::{OrderStore, StoreError};
use crate::tracking::map_carrier_status;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router<A, S>(state: AppState<A, S>) -> Router
where
    A: CarrierApi + 'static,
    S: OrderStore + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/geo/resolve", get(resolve::<A, S>))
        .route("/shipping/quote", post(quote::<A, S>))
        .route("/shipping/create", post(create_shipment::<A, S>))
        .route("/shipping/track", post(track::<A, S>))
        .route("/tracking/sync", post(run_sync::<A, S>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Resolve a free-text destination to DANE codes.
async fn resolve<A: CarrierApi, S: OrderStore>(
    State(state): State<AppState<A, S>>,
    Query(query): Query<ResolveQuery>,
) -> Result<Json<ResolveResponse>, AppError> {
    let destination = state
        .quotes
        .quoter()
        .resolve(&query.city, &query.department)?;

    Ok(Json(ResolveResponse {
        success: true,
        destination,
    }))
}

/// Quote shipping for a basket at checkout.
async fn quote<A: CarrierApi, S: OrderStore>(
    State(state): State<AppState<A, S>>,
    Json(body): Json<QuoteBody>,
) -> Result<Json<QuoteResponse>, AppError> {
    let request = QuoteRequest::new(body.city, body.department, body.items, body.total);
    let quotes = state.quotes.quote(&request).await?;

    Ok(Json(QuoteResponse {
        success: true,
        quotes: quotes.as_ref().clone(),
    }))
}

/// Generate a shipment and label.
async fn create_shipment<A: CarrierApi, S: OrderStore>(
    State(state): State<AppState<A, S>>,
    Json(body): Json<CreateBody>,
) -> Result<Json<CreateResponse>, AppError> {
    let order = match body.order_id.as_deref() {
        Some(id) => Some(
            state
                .store
                .get(id)
                .await
                .map_err(ShippingError::from)?
                .ok_or_else(|| AppError::NotFound {
                    message: format!("order not found: {id}"),
                })?,
        ),
        None => None,
    };

    if let Some(existing) = order.as_ref().and_then(|o| o.tracking_number()) {
        return Err(AppError::Conflict {
            message: format!("order already shipped with tracking number {existing}"),
        });
    }

    let customer = body
        .customer
        .or_else(|| order.as_ref().map(|o| o.customer.clone()))
        .ok_or_else(|| AppError::BadRequest {
            message: "customer is required without an orderId".to_string(),
        })?;
    let items = body
        .items
        .or_else(|| order.as_ref().map(|o| o.items.clone()))
        .unwrap_or_default();
    let order_total = body
        .total
        .or_else(|| order.as_ref().map(|o| o.total))
        .unwrap_or_default();

    let request = ShipmentRequest {
        customer,
        items,
        order_total,
        rate: body.rate,
    };
    let shipment = state.shipments.create(&request).await?;

    // The label is already bought; a failed write-back must not hide it.
    let order_updated = match body.order_id.as_deref() {
        Some(id) => match state.store.attach_shipment(id, &shipment).await {
            Ok(()) => true,
            Err(e) => {
                error!(
                    order_id = id,
                    tracking_number = %shipment.tracking_number,
                    error = %e,
                    "shipment created but not recorded on order"
                );
                false
            }
        },
        None => false,
    };

    Ok(Json(CreateResponse {
        success: true,
        shipment,
        order_updated,
    }))
}

/// Look up one tracking code.
async fn track<A: CarrierApi, S: OrderStore>(
    State(state): State<AppState<A, S>>,
    Json(body): Json<TrackBody>,
) -> Result<Json<TrackResponse>, AppError> {
    let tracking = state.tracker.track(&body.tracking_number).await?;
    let mapped_status = map_carrier_status(&tracking.status);

    Ok(Json(TrackResponse {
        success: true,
        tracking,
        mapped_status,
    }))
}

/// Run one tracking sync pass now.
async fn run_sync<A: CarrierApi, S: OrderStore>(
    State(state): State<AppState<A, S>>,
) -> Result<Json<SyncResponse>, AppError> {
    info!("tracking sync requested");
    let report = state.sync.run_once().await?;

    Ok(Json(SyncResponse {
        success: true,
        report,
    }))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Conflict { message: String },
    Unprocessable { message: String },
    BadGateway { message: String },
    Internal { message: String },
}

impl From<ShippingError> for AppError {
    fn from(e: ShippingError) -> Self {
        let message = e.to_string();
        match e {
            ShippingError::InvalidRequest(_) => AppError::BadRequest { message },
            ShippingError::Coverage { .. } => AppError::Unprocessable { message },
            ShippingError::Store(StoreError::NotFound(_)) => AppError::NotFound { message },
            ShippingError::Store(StoreError::ShipmentExists { .. })
            | ShippingError::SyncInProgress => AppError::Conflict { message },
            ShippingError::Store(_) => AppError::Internal { message },
            ShippingError::Quote(_) | ShippingError::Shipment { .. } | ShippingError::Carrier(_) => {
                AppError::BadGateway { message }
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Conflict { message } => (StatusCode::CONFLICT, message),
            AppError::Unprocessable { message } => (StatusCode::UNPROCESSABLE_ENTITY, message),
            AppError::BadGateway { message } => (StatusCode::BAD_GATEWAY, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            warn!(%status, %message, "request rejected");
        }

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}
