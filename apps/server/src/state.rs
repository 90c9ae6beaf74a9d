//! Application state shared across handlers.
//!
//! ## Session Context
//! There are no ambient globals: every request carries the viewer's phone
//! explicitly, and per-viewer session data (the home coordinates behind the
//! distance filter) lives in a TTL cache here, keyed by canonical phone.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::debug;

use baraholka_core::Coordinates;
use baraholka_db::Database;

use crate::config::ServerConfig;
use crate::geocode::GeocodeClient;

/// Application state shared across all handlers. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    db: Database,
    geocoder: GeocodeClient,
    /// Canonical phone → geocoded home coordinates (None = address didn't
    /// resolve; cached too so we don't re-query the geocoder every feed).
    home_coords: Cache<String, Option<Coordinates>>,
}

impl AppState {
    pub fn new(config: ServerConfig, db: Database, geocoder: GeocodeClient) -> Self {
        let home_coords = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(Duration::from_secs(config.home_coords_ttl_secs))
            .build();

        AppState {
            inner: Arc::new(AppStateInner {
                config,
                db,
                geocoder,
                home_coords,
            }),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    pub fn db(&self) -> &Database {
        &self.inner.db
    }

    pub fn geocoder(&self) -> &GeocodeClient {
        &self.inner.geocoder
    }

    /// Resolves a viewer's home coordinates, at most once per cache TTL.
    ///
    /// Looks up the viewer's stored address and geocodes it. Viewers without
    /// an account, without an address, or with an unresolvable address get
    /// `None`, which makes the distance filter fail open downstream.
    pub async fn home_coords(&self, viewer_phone: &str) -> Option<Coordinates> {
        let key = viewer_phone.to_string();

        self.inner
            .home_coords
            .get_with(key, async {
                let user = match self.inner.db.users().find_by_phone(viewer_phone).await {
                    Ok(user) => user?,
                    Err(e) => {
                        debug!(error = %e, "Home lookup failed, distance filter degrades");
                        return None;
                    }
                };
                let address = user.address?;
                let coords = self.inner.geocoder.resolve(&address).await;
                debug!(viewer = %viewer_phone, resolved = coords.is_some(), "Resolved home coordinates");
                coords
            })
            .await
    }

    /// Drops a viewer's cached home coordinates (profile update).
    pub async fn invalidate_home(&self, viewer_phone: &str) {
        self.inner.home_coords.invalidate(viewer_phone).await;
    }
}
