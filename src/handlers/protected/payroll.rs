// GET /api/payroll?start=YYYY-MM-DD&end=YYYY-MM-DD[&closed=true]

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::payroll::{PayrollSummary, SalaryPeriod};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct PayrollQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default)]
    pub closed: bool,
}

pub async fn payroll_summary(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    query: Result<Query<PayrollQuery>, QueryRejection>,
) -> ApiResult<PayrollSummary> {
    let Query(query) = query?;
    let mut period = SalaryPeriod::new(query.start, query.end).map_err(ApiError::bad_request)?;
    if query.closed {
        period = period.closed();
    }
    Ok(ApiResponse::success(state.service.payroll(&actor, period).await?))
}
