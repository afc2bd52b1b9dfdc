// Astro handler
// Ecliptic longitudes for a calendar moment

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::{debug, info};

use crate::{
    ephemeris::julian_day,
    error::{ApiError, ApiResult},
    models::astro::AstroRequest,
    state::AppState,
};

/// Compute planetary positions
/// POST /api/astro
pub async fn compute_positions(
    State(state): State<AppState>,
    payload: Result<Json<AstroRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    let moment = request.validate().map_err(ApiError::Validation)?;

    if let Some(ref is_red) = request.is_red {
        debug!("isRed flag received ({}); it does not affect the computation", is_red);
    }

    let jd = julian_day(moment.year, moment.month, moment.day, moment.fractional_hour());
    if !jd.is_finite() {
        return Err(ApiError::Computation("Failed to compute Julian day".to_string()));
    }

    info!("Computing positions for JD (UT): {}", jd);

    let positions = state.chart.positions(jd).await;

    Ok((StatusCode::OK, Json(positions)))
}
