use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::cart::{Cart, CartLine, CartQuote};
use crate::comparison::{self, ProductComparison, SimilarProduct};
use crate::error::VendorlyError;
use crate::geo::{format_distance, Coordinates, ProximityBand};
use crate::location::{builtin_locality_list, LocalityInfo, LocationError, ResolvedLocation};
use crate::proximity::{check_radius, estimate_delivery_time, quick_delivery_estimate, NearbyVendor, ProximitySearch, VendorSort};

use super::state::AppState;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: u16,
}

pub(super) struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.1,
            code: self.0.as_u16(),
        };
        (self.0, Json(body)).into_response()
    }
}

impl From<VendorlyError> for ApiError {
    fn from(e: VendorlyError) -> Self {
        let status = match &e {
            VendorlyError::InvalidCoordinates { .. }
            | VendorlyError::InvalidQuantity { .. }
            | VendorlyError::InvalidRadius(_)
            | VendorlyError::Usage(_)
            | VendorlyError::Location(LocationError::QueryTooShort(_)) => StatusCode::BAD_REQUEST,
            VendorlyError::UnknownVendor(_)
            | VendorlyError::UnknownProduct(_)
            | VendorlyError::Location(LocationError::NotFound(_)) => StatusCode::NOT_FOUND,
            VendorlyError::Location(LocationError::Network(_))
            | VendorlyError::Location(LocationError::InvalidResponse(_)) => StatusCode::BAD_GATEWAY,
            VendorlyError::Config { .. } | VendorlyError::Io(_) | VendorlyError::Json(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        ApiError(status, e.to_string())
    }
}

impl From<LocationError> for ApiError {
    fn from(e: LocationError) -> Self {
        VendorlyError::from(e).into()
    }
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    ApiError(status, msg.into())
}

type ApiResult<T> = Result<Json<T>, ApiError>;

fn require_origin(lat: Option<f64>, lng: Option<f64>) -> Result<Coordinates, ApiError> {
    match (lat, lng) {
        (Some(lat), Some(lng)) => Ok(Coordinates::new(lat, lng)?),
        _ => Err(api_error(StatusCode::BAD_REQUEST, "Provide 'lat' and 'lng' parameters")),
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

// ─── GET /health ─────────────────────────────────────────────────

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub vendors: usize,
    pub products: usize,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        vendors: state.catalog.vendors.len(),
        products: state.catalog.products.len(),
    })
}

// ─── GET /api/distance ───────────────────────────────────────────

#[derive(Deserialize)]
pub struct DistanceQuery {
    pub lat1: Option<f64>,
    pub lng1: Option<f64>,
    pub lat2: Option<f64>,
    pub lng2: Option<f64>,
}

#[derive(Serialize)]
pub struct DistanceResponse {
    pub distance_km: f64,
    pub formatted: String,
    pub label: String,
    pub band: ProximityBand,
    pub estimated_delivery_minutes: Option<u32>,
    pub quick_estimate_minutes: u32,
}

pub async fn distance(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DistanceQuery>,
) -> ApiResult<DistanceResponse> {
    let from = require_origin(params.lat1, params.lng1)?;
    let to = require_origin(params.lat2, params.lng2)?;
    let km = from.distance_to(&to);

    Ok(Json(DistanceResponse {
        distance_km: km,
        formatted: format_distance(km),
        label: ProximityBand::label(km),
        band: ProximityBand::of(km),
        estimated_delivery_minutes: estimate_delivery_time(km, &state.config.delivery),
        quick_estimate_minutes: quick_delivery_estimate(km),
    }))
}

// ─── GET /api/vendors/nearby ─────────────────────────────────────

#[derive(Deserialize)]
pub struct NearbyQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius: Option<f64>,
    pub sort: Option<String>,
    pub delivery_only: Option<bool>,
    pub min_rating: Option<f64>,
    pub max_fee: Option<f64>,
    pub open_now: Option<bool>,
}

#[derive(Serialize)]
pub struct VendorListResponse {
    pub origin: Coordinates,
    pub count: usize,
    pub vendors: Vec<NearbyVendor>,
}

pub async fn nearby_vendors(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NearbyQuery>,
) -> ApiResult<VendorListResponse> {
    let start = Instant::now();
    let origin = require_origin(params.lat, params.lng)?;

    let mut filter = state.config.default_filter();
    if let Some(radius) = params.radius {
        filter.radius_km = check_radius(radius)?;
    }
    if let Some(ref sort) = params.sort {
        filter.sort_by = sort
            .parse::<VendorSort>()
            .map_err(|e| api_error(StatusCode::BAD_REQUEST, e))?;
    }
    filter.delivery_only = params.delivery_only.unwrap_or(false);
    if let Some(r) = params.min_rating {
        filter.min_rating = r;
    }
    if let Some(fee) = params.max_fee {
        filter.max_delivery_fee = fee;
    }
    if params.open_now.unwrap_or(false) {
        filter.open_at = Some(state.config.local_now()?);
    }

    let search = ProximitySearch::new(origin).with_delivery(state.config.delivery);
    let vendors = search.apply_filter(&state.catalog.vendors, &filter);

    tracing::info!(
        path = "/api/vendors/nearby",
        origin = %origin,
        radius_km = filter.radius_km,
        sort = %filter.sort_by,
        count = vendors.len(),
        elapsed_ms = elapsed_ms(start),
        "request"
    );

    Ok(Json(VendorListResponse {
        origin,
        count: vendors.len(),
        vendors,
    }))
}

// ─── GET /api/vendors/deliverable ────────────────────────────────

#[derive(Deserialize)]
pub struct OriginQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

pub async fn deliverable_vendors(
    State(state): State<Arc<AppState>>,
    Query(params): Query<OriginQuery>,
) -> ApiResult<VendorListResponse> {
    let origin = require_origin(params.lat, params.lng)?;
    let search = ProximitySearch::new(origin).with_delivery(state.config.delivery);
    let vendors = search.deliverable(&state.catalog.vendors);
    tracing::info!(path = "/api/vendors/deliverable", origin = %origin, count = vendors.len(), "request");

    Ok(Json(VendorListResponse {
        origin,
        count: vendors.len(),
        vendors,
    }))
}

// ─── GET /api/compare ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CompareQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius: Option<f64>,
    /// Product name filter. Without it every shared product is compared.
    pub q: Option<String>,
}

#[derive(Serialize)]
pub struct CompareResponse {
    pub count: usize,
    pub comparisons: Vec<ProductComparison>,
}

pub async fn compare(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CompareQuery>,
) -> ApiResult<CompareResponse> {
    let start = Instant::now();
    let origin = require_origin(params.lat, params.lng)?;
    let search = ProximitySearch::new(origin).with_delivery(state.config.delivery);

    let comparisons = match params.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        Some(q) => comparison::compare_product(&search, &state.catalog, q),
        None => {
            let radius = check_radius(params.radius.unwrap_or(state.config.search.radius_km))?;
            comparison::compare_nearby(&search, &state.catalog, radius)
        }
    };

    tracing::info!(
        path = "/api/compare",
        origin = %origin,
        query = params.q.as_deref().unwrap_or(""),
        groups = comparisons.len(),
        elapsed_ms = elapsed_ms(start),
        "request"
    );

    Ok(Json(CompareResponse {
        count: comparisons.len(),
        comparisons,
    }))
}

// ─── GET /api/products/{id}/similar ──────────────────────────────

#[derive(Deserialize)]
pub struct SimilarQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub threshold: Option<f64>,
}

#[derive(Serialize)]
pub struct SimilarResponse {
    pub product_id: String,
    pub product_name: String,
    pub similar: Vec<SimilarProduct>,
}

pub async fn similar_products(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<SimilarQuery>,
) -> ApiResult<SimilarResponse> {
    let target = state.catalog.require_product(&id)?;
    let threshold = params.threshold.unwrap_or(state.config.search.similarity_threshold);

    let similar = match (params.lat, params.lng) {
        (None, None) => {
            let active: Vec<_> = state.catalog.products.iter().filter(|p| p.is_active).cloned().collect();
            comparison::find_similar_products(&active, target, threshold)
        }
        (lat, lng) => {
            let search = ProximitySearch::new(require_origin(lat, lng)?);
            comparison::similar_nearby(&search, &state.catalog, target, threshold)
        }
    };

    tracing::info!(path = "/api/products/{id}/similar", product = %id, count = similar.len(), "request");

    Ok(Json(SimilarResponse {
        product_id: target.id.clone(),
        product_name: target.name.clone(),
        similar,
    }))
}

// ─── GET /api/locate ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LocateQuery {
    pub q: Option<String>,
    /// Return every candidate for a search box instead of the best match.
    pub suggest: Option<bool>,
}

#[derive(Serialize)]
pub struct LocateResponse {
    pub query: String,
    pub count: usize,
    pub locations: Vec<ResolvedLocation>,
}

pub async fn locate(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LocateQuery>,
) -> ApiResult<LocateResponse> {
    let start = Instant::now();
    let query = params.q.as_deref().unwrap_or("").trim().to_string();
    if query.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Missing 'q' parameter"));
    }
    let suggest = params.suggest.unwrap_or(false);

    let q = query.clone();
    let shared = Arc::clone(&state);
    let locations = tokio::task::spawn_blocking(move || {
        if suggest {
            shared.resolver.search(&q)
        } else {
            shared.resolver.resolve(&q).map(|loc| vec![loc])
        }
    })
    .await
    .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("Geocoding task failed: {}", e)))??;

    tracing::info!(
        path = "/api/locate",
        query = %query,
        count = locations.len(),
        elapsed_ms = elapsed_ms(start),
        "request"
    );

    Ok(Json(LocateResponse {
        query,
        count: locations.len(),
        locations,
    }))
}

// ─── GET /api/reverse ────────────────────────────────────────────

pub async fn reverse(
    State(state): State<Arc<AppState>>,
    Query(params): Query<OriginQuery>,
) -> ApiResult<ResolvedLocation> {
    let start = Instant::now();
    let origin = require_origin(params.lat, params.lng)?;

    let shared = Arc::clone(&state);
    let location = tokio::task::spawn_blocking(move || shared.resolver.reverse(origin.lat, origin.lng))
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("Geocoding task failed: {}", e)))?;

    tracing::info!(
        path = "/api/reverse",
        origin = %origin,
        name = %location.name,
        source = %location.source,
        elapsed_ms = elapsed_ms(start),
        "request"
    );
    Ok(Json(location))
}

// ─── GET /api/localities ─────────────────────────────────────────

pub async fn locality_list() -> Json<Vec<LocalityInfo>> {
    Json(builtin_locality_list())
}

// ─── POST /api/cart/quote ────────────────────────────────────────

#[derive(Deserialize)]
pub struct QuoteRequest {
    pub lines: Vec<CartLine>,
}

pub async fn cart_quote(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QuoteRequest>,
) -> ApiResult<CartQuote> {
    let cart = Cart::from_lines(&state.catalog, &request.lines)?;
    let quote = cart.quote(&state.catalog)?;
    tracing::info!(path = "/api/cart/quote", lines = request.lines.len(), total = quote.total, "request");
    Ok(Json(quote))
}
