// Chart aggregation: fan out one ephemeris request per body, wait for all of
// them, then append the derived points.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::time::timeout;
use tracing::{debug, error, warn};

use crate::ephemeris::{Body, Ephemeris};
use crate::models::astro::{CelestialPosition, Degree};

/// Computes the longitudes reported by `POST /api/astro`.
#[derive(Clone)]
pub struct ChartCalculator {
    ephemeris: Arc<dyn Ephemeris>,
    body_timeout: Duration,
}

impl ChartCalculator {
    pub fn new(ephemeris: Arc<dyn Ephemeris>, body_timeout: Duration) -> Self {
        ChartCalculator { ephemeris, body_timeout }
    }

    /// Positions of every computed body in `Body::COMPUTED` order, followed
    /// by Earth and Ketu. A body whose request fails, returns a non-finite
    /// value or exceeds the timeout is reported with a null degree.
    pub async fn positions(&self, julian_day: f64) -> Vec<CelestialPosition> {
        let requests = Body::COMPUTED
            .iter()
            .map(|&body| self.position(body, julian_day));

        let mut positions = join_all(requests).await;
        add_derived_points(&mut positions);

        debug!(?positions, "Chart computed for JD {}", julian_day);
        positions
    }

    async fn position(&self, body: Body, julian_day: f64) -> CelestialPosition {
        let ephemeris = Arc::clone(&self.ephemeris);
        let request = tokio::task::spawn_blocking(move || {
            ephemeris.ecliptic_longitude(body, julian_day)
        });

        // An expired request keeps its blocking thread until the engine
        // returns; only its result is discarded.
        let degree = match timeout(self.body_timeout, request).await {
            Ok(Ok(Ok(longitude))) => {
                let degree = Degree::from_longitude(longitude);
                if degree.is_none() {
                    warn!("Ephemeris returned invalid longitude for {}: {}", body, longitude);
                }
                degree
            }
            Ok(Ok(Err(e))) => {
                warn!("Ephemeris failed for {}: {}", body, e);
                None
            }
            Ok(Err(e)) => {
                error!("Ephemeris task for {} aborted: {}", body, e);
                None
            }
            Err(_) => {
                warn!("Ephemeris request for {} timed out after {:?}", body, self.body_timeout);
                None
            }
        };

        CelestialPosition::new(body, degree)
    }
}

/// Appends Earth (opposite the Sun) and Ketu (opposite Rahu). A derived
/// point is null when its source is missing or null. Does nothing if Earth
/// is already present.
pub fn add_derived_points(positions: &mut Vec<CelestialPosition>) {
    if positions.iter().any(|p| p.planet == Body::Earth) {
        return;
    }

    let degree_of = |body: Body| {
        positions
            .iter()
            .find(|p| p.planet == body)
            .and_then(|p| p.degree)
    };

    let earth = degree_of(Body::Sun).map(Degree::opposite);
    let ketu = degree_of(Body::Rahu).map(Degree::opposite);

    positions.push(CelestialPosition::new(Body::Earth, earth));
    positions.push(CelestialPosition::new(Body::Ketu, ketu));
}
