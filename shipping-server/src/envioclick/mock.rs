//! Scripted in-memory carrier for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::domain::RateId;

use super::CarrierApi;
use super::error::EnvioclickError;
use super::types::{QuotationRequest, RateDto, ShipmentData, ShipmentRequestDto, TrackData};

/// Carrier fake with queued responses and call counters.
///
/// Unscripted quotation calls return no rates; unscripted shipment calls are
/// rejected; tracking answers from the per-code map.
#[derive(Default)]
pub(crate) struct MockCarrier {
    quotes: Mutex<VecDeque<Result<Vec<RateDto>, String>>>,
    shipments: Mutex<VecDeque<Result<ShipmentData, String>>>,
    tracking: Mutex<HashMap<String, Result<TrackData, String>>>,
    track_delay: Mutex<Option<Duration>>,
    pub quotation_requests: Mutex<Vec<QuotationRequest>>,
    pub shipment_requests: Mutex<Vec<ShipmentRequestDto>>,
    quotation_calls: AtomicUsize,
    shipment_calls: AtomicUsize,
    track_calls: AtomicUsize,
}

impl MockCarrier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_quote(&self, result: Result<Vec<RateDto>, &str>) -> &Self {
        self.quotes
            .lock()
            .unwrap()
            .push_back(result.map_err(str::to_string));
        self
    }

    pub fn push_shipment(&self, result: Result<ShipmentData, &str>) -> &Self {
        self.shipments
            .lock()
            .unwrap()
            .push_back(result.map_err(str::to_string));
        self
    }

    pub fn set_tracking(&self, code: &str, result: Result<TrackData, &str>) -> &Self {
        self.tracking
            .lock()
            .unwrap()
            .insert(code.to_string(), result.map_err(str::to_string));
        self
    }

    /// Make every tracking call sleep first, so concurrent callers interleave.
    pub fn set_track_delay(&self, delay: Duration) -> &Self {
        *self.track_delay.lock().unwrap() = Some(delay);
        self
    }

    pub fn quotation_calls(&self) -> usize {
        self.quotation_calls.load(Ordering::SeqCst)
    }

    pub fn shipment_calls(&self) -> usize {
        self.shipment_calls.load(Ordering::SeqCst)
    }

    pub fn track_calls(&self) -> usize {
        self.track_calls.load(Ordering::SeqCst)
    }
}

impl CarrierApi for MockCarrier {
    async fn quotation(&self, request: &QuotationRequest) -> Result<Vec<RateDto>, EnvioclickError> {
        self.quotation_calls.fetch_add(1, Ordering::SeqCst);
        self.quotation_requests.lock().unwrap().push(request.clone());
        let next = self.quotes.lock().unwrap().pop_front();
        match next {
            Some(Ok(rates)) => Ok(rates),
            Some(Err(message)) => Err(EnvioclickError::Rejected { message }),
            None => Ok(vec![]),
        }
    }

    async fn create_shipment(
        &self,
        request: &ShipmentRequestDto,
    ) -> Result<ShipmentData, EnvioclickError> {
        self.shipment_calls.fetch_add(1, Ordering::SeqCst);
        self.shipment_requests.lock().unwrap().push(request.clone());
        let next = self.shipments.lock().unwrap().pop_front();
        match next {
            Some(Ok(data)) => Ok(data),
            Some(Err(message)) => Err(EnvioclickError::Rejected { message }),
            None => Err(EnvioclickError::Rejected {
                message: "no scripted shipment".into(),
            }),
        }
    }

    async fn track(&self, tracking_code: &str) -> Result<TrackData, EnvioclickError> {
        self.track_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.track_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let entry = self.tracking.lock().unwrap().get(tracking_code).cloned();
        match entry {
            Some(Ok(data)) => Ok(data),
            Some(Err(message)) => Err(EnvioclickError::Status {
                status: 500,
                message,
            }),
            None => Err(EnvioclickError::Status {
                status: 404,
                message: format!("unknown tracking code {tracking_code}"),
            }),
        }
    }
}

/// Build a rate offer.
pub(crate) fn rate(id: &str, carrier: &str, flete: f64) -> RateDto {
    RateDto {
        id_rate: RateId::new(id),
        id_product: Some("1".into()),
        product: "Mensajería".into(),
        carrier: carrier.into(),
        flete,
        delivery_days: Some(2),
    }
}

/// Build a successful shipment.
pub(crate) fn shipped(tracker: &str) -> ShipmentData {
    ShipmentData {
        tracker: tracker.into(),
        url: format!("https://labels.example/{tracker}.pdf"),
    }
}

/// Build a tracking status.
pub(crate) fn tracked(status: &str) -> TrackData {
    TrackData {
        status: status.into(),
        status_detail: None,
    }
}
