//! HTTP/JSON API
//!
//! Mutating routes go through the command actor; read routes query the
//! service directly.

use crate::actor::CommandHandle;
use crate::service::{CreditService, PurchaseRequest};
use crate::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use ledger_core::{
    CreditBalance, EmissionsProfile, EmissionsReport, NewProject, OrganizationId, Project,
    ProjectId, Transaction,
};
use marketplace::{CreditPortfolio, NgoSummary, OffsetReport, PartnerSummary, RevenueOverview};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Shared handler state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Read side
    pub service: Arc<CreditService>,
    /// Write side
    pub commands: CommandHandle,
}

impl AppState {
    /// Create state
    pub fn new(service: Arc<CreditService>, commands: CommandHandle) -> Self {
        Self { service, commands }
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

#[derive(Debug, Deserialize)]
struct ApproveRequest {
    verified_hectares: Decimal,
}

#[derive(Debug, Deserialize)]
struct RejectRequest {
    reason: String,
}

#[derive(Debug, Deserialize)]
struct RetireRequest {
    amount: u64,
}

#[derive(Debug, Deserialize)]
struct PortfolioQuery {
    unit_price: Option<Decimal>,
}

#[derive(Debug, Serialize)]
struct PurchaseResponse {
    #[serde(flatten)]
    transaction: Transaction,
    total_value: Decimal,
}

/// Build the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/projects", post(register_project))
        .route("/projects/:id", get(get_project))
        .route("/projects/:id/submit", post(submit_project))
        .route("/projects/:id/approve", post(approve_project))
        .route("/projects/:id/reject", post(reject_project))
        .route("/organizations/:org/projects", get(list_projects))
        .route("/organizations/:org/balance", get(get_balance))
        .route("/organizations/:org/transactions", get(get_transactions))
        .route("/organizations/:org/retire", post(retire_credits))
        .route("/organizations/:org/summary", get(ngo_summary))
        .route("/organizations/:org/portfolio", get(credit_portfolio))
        .route("/organizations/:org/partners", get(corporate_partners))
        .route("/organizations/:org/revenue", get(revenue_overview))
        .route(
            "/organizations/:org/emissions",
            get(get_emissions).put(record_emissions),
        )
        .route("/organizations/:org/offsets", get(offset_report))
        .route("/purchases", post(purchase_credits))
        .with_state(state)
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "credit-gateway",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn metrics_handler(State(state): State<AppState>) -> Result<String> {
    state.service.export_metrics()
}

async fn register_project(
    State(state): State<AppState>,
    Json(data): Json<NewProject>,
) -> Result<(StatusCode, Json<Project>)> {
    let project = state.commands.register_project(data).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

async fn get_project(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Project>> {
    tracing::debug!(project = %id, "Fetching project");
    Ok(Json(state.service.get_project(ProjectId::from(id))?))
}

async fn submit_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Project>> {
    Ok(Json(state.commands.submit_project(ProjectId::from(id)).await?))
}

async fn approve_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ApproveRequest>,
) -> Result<Json<Project>> {
    let project = state
        .commands
        .approve_project(ProjectId::from(id), body.verified_hectares)
        .await?;
    Ok(Json(project))
}

async fn reject_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<RejectRequest>,
) -> Result<Json<Project>> {
    let project = state
        .commands
        .reject_project(ProjectId::from(id), body.reason)
        .await?;
    Ok(Json(project))
}

async fn list_projects(
    State(state): State<AppState>,
    Path(org): Path<String>,
) -> Json<Vec<Project>> {
    Json(state.service.list_projects(&OrganizationId::new(org)))
}

async fn get_balance(State(state): State<AppState>, Path(org): Path<String>) -> Json<CreditBalance> {
    Json(state.service.get_balance(&OrganizationId::new(org)))
}

async fn get_transactions(
    State(state): State<AppState>,
    Path(org): Path<String>,
) -> Json<Vec<Transaction>> {
    Json(state.service.get_transaction_history(&OrganizationId::new(org)))
}

async fn retire_credits(
    State(state): State<AppState>,
    Path(org): Path<String>,
    Json(body): Json<RetireRequest>,
) -> Result<Json<CreditBalance>> {
    let balance = state
        .commands
        .retire_credits(OrganizationId::new(org), body.amount)
        .await?;
    Ok(Json(balance))
}

async fn ngo_summary(State(state): State<AppState>, Path(org): Path<String>) -> Json<NgoSummary> {
    Json(state.service.ngo_summary(&OrganizationId::new(org)))
}

async fn credit_portfolio(
    State(state): State<AppState>,
    Path(org): Path<String>,
    Query(query): Query<PortfolioQuery>,
) -> Result<Json<CreditPortfolio>> {
    let portfolio = state
        .service
        .credit_portfolio(&OrganizationId::new(org), query.unit_price)?;
    Ok(Json(portfolio))
}

async fn corporate_partners(
    State(state): State<AppState>,
    Path(org): Path<String>,
) -> Json<Vec<PartnerSummary>> {
    Json(state.service.corporate_partners(&OrganizationId::new(org)))
}

async fn revenue_overview(
    State(state): State<AppState>,
    Path(org): Path<String>,
) -> Json<RevenueOverview> {
    Json(state.service.revenue_overview(&OrganizationId::new(org)))
}

async fn record_emissions(
    State(state): State<AppState>,
    Path(org): Path<String>,
    Json(report): Json<EmissionsReport>,
) -> Result<Json<EmissionsProfile>> {
    let profile = state
        .commands
        .record_emissions(OrganizationId::new(org), report)
        .await?;
    Ok(Json(profile))
}

async fn get_emissions(
    State(state): State<AppState>,
    Path(org): Path<String>,
) -> Result<Json<EmissionsProfile>> {
    Ok(Json(state.service.get_emissions(&OrganizationId::new(org))?))
}

async fn offset_report(
    State(state): State<AppState>,
    Path(org): Path<String>,
) -> Result<Json<OffsetReport>> {
    Ok(Json(state.service.offset_report(&OrganizationId::new(org))?))
}

async fn purchase_credits(
    State(state): State<AppState>,
    Json(request): Json<PurchaseRequest>,
) -> Result<(StatusCode, Json<PurchaseResponse>)> {
    let transaction = state.commands.purchase_credits(request).await?;
    let total_value = transaction.total_value();
    Ok((
        StatusCode::CREATED,
        Json(PurchaseResponse {
            transaction,
            total_value,
        }),
    ))
}
