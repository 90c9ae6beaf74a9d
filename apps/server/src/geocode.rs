//! # Geocoding Client
//!
//! Proxy client for the Yandex Geocoder HTTP API.
//!
//! ## Why a Proxy
//! The API key must never reach browsers. Clients call our
//! `GET /api/geocode?q=` and this module makes the keyed upstream request.
//!
//! ## Degradation
//! Geocoding is a convenience: every failure (no key, network error,
//! unexpected payload) logs a warning and yields an empty match list.
//! Address features then simply don't offer suggestions.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use baraholka_core::Coordinates;

const DEFAULT_BASE_URL: &str = "https://geocode-maps.yandex.ru/1.x/";
const MAX_RESULTS: u32 = 5;

/// One geocoder suggestion.
#[derive(Debug, Clone, serde::Serialize)]
pub struct GeocodeMatch {
    /// Human-readable address line.
    pub text: String,
    pub coords: Coordinates,
}

/// Client for the Yandex Geocoder API.
#[derive(Debug, Clone)]
pub struct GeocodeClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl GeocodeClient {
    /// Creates a new geocoding client. A missing key disables lookups.
    ///
    /// ## Errors
    /// Fails when the TLS backend cannot initialize.
    pub fn new(api_key: Option<String>) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(GeocodeClient {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
        })
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Resolves a free-text address to up to [`MAX_RESULTS`] suggestions.
    ///
    /// Never fails: degraded conditions produce an empty list.
    pub async fn search(&self, query: &str) -> Vec<GeocodeMatch> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let Some(api_key) = &self.api_key else {
            debug!("Geocoder disabled (no API key)");
            return Vec::new();
        };

        let request = self.http.get(&self.base_url).query(&[
            ("apikey", api_key.as_str()),
            ("format", "json"),
            ("geocode", query),
            ("results", &MAX_RESULTS.to_string()),
            ("lang", "ru_RU"),
        ]);

        let response = match request.send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(error = %e, "Geocoder request failed");
                return Vec::new();
            }
        };

        if !response.status().is_success() {
            warn!(status = %response.status(), "Geocoder answered with error status");
            return Vec::new();
        }

        let payload: GeocoderResponse = match response.json().await {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Geocoder payload failed to parse");
                return Vec::new();
            }
        };

        let matches = extract_matches(payload);
        debug!(query = %query, count = matches.len(), "Geocoder matches");
        matches
    }

    /// Resolves an address to its single best coordinate, if any.
    pub async fn resolve(&self, address: &str) -> Option<Coordinates> {
        self.search(address).await.into_iter().next().map(|m| m.coords)
    }
}

// =============================================================================
// Upstream Payload
// =============================================================================
//
// The geocoder nests results deeply:
//   response.GeoObjectCollection.featureMember[].GeoObject
//     .metaDataProperty.GeocoderMetaData.text   ← full address line
//     .Point.pos                                ← "lon lat" (space separated)

#[derive(Debug, Deserialize)]
struct GeocoderResponse {
    response: GeoResponse,
}

#[derive(Debug, Deserialize)]
struct GeoResponse {
    #[serde(rename = "GeoObjectCollection")]
    collection: GeoObjectCollection,
}

#[derive(Debug, Deserialize)]
struct GeoObjectCollection {
    #[serde(rename = "featureMember", default)]
    members: Vec<FeatureMember>,
}

#[derive(Debug, Deserialize)]
struct FeatureMember {
    #[serde(rename = "GeoObject")]
    geo_object: GeoObject,
}

#[derive(Debug, Deserialize)]
struct GeoObject {
    #[serde(rename = "metaDataProperty")]
    meta: MetaDataProperty,
    #[serde(rename = "Point")]
    point: Point,
}

#[derive(Debug, Deserialize)]
struct MetaDataProperty {
    #[serde(rename = "GeocoderMetaData")]
    geocoder: GeocoderMetaData,
}

#[derive(Debug, Deserialize)]
struct GeocoderMetaData {
    text: String,
}

#[derive(Debug, Deserialize)]
struct Point {
    pos: String,
}

fn extract_matches(payload: GeocoderResponse) -> Vec<GeocodeMatch> {
    payload
        .response
        .collection
        .members
        .into_iter()
        .filter_map(|member| {
            let coords = parse_pos(&member.geo_object.point.pos)?;
            Some(GeocodeMatch {
                text: member.geo_object.meta.geocoder.text,
                coords,
            })
        })
        .collect()
}

/// Parses the geocoder's "lon lat" coordinate string.
fn parse_pos(pos: &str) -> Option<Coordinates> {
    let mut parts = pos.split_whitespace();
    let lon: f64 = parts.next()?.parse().ok()?;
    let lat: f64 = parts.next()?.parse().ok()?;
    Some(Coordinates::new(lat, lon))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pos_lon_lat_order() {
        let coords = parse_pos("37.6173 55.7558").unwrap();
        assert_eq!(coords.lat, 55.7558);
        assert_eq!(coords.lon, 37.6173);
    }

    #[test]
    fn test_parse_pos_rejects_garbage() {
        assert!(parse_pos("").is_none());
        assert!(parse_pos("abc def").is_none());
        assert!(parse_pos("37.6173").is_none());
    }

    #[test]
    fn test_extract_matches_from_payload() {
        let payload: GeocoderResponse = serde_json::from_value(serde_json::json!({
            "response": {
                "GeoObjectCollection": {
                    "featureMember": [
                        {
                            "GeoObject": {
                                "metaDataProperty": {
                                    "GeocoderMetaData": { "text": "Москва, Тверская улица, 1" }
                                },
                                "Point": { "pos": "37.6173 55.7558" }
                            }
                        }
                    ]
                }
            }
        }))
        .unwrap();

        let matches = extract_matches(payload);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].text, "Москва, Тверская улица, 1");
        assert_eq!(matches[0].coords.lat, 55.7558);
    }

    #[test]
    fn test_empty_feature_member_is_tolerated() {
        let payload: GeocoderResponse = serde_json::from_value(serde_json::json!({
            "response": { "GeoObjectCollection": {} }
        }))
        .unwrap();
        assert!(extract_matches(payload).is_empty());
    }

    #[tokio::test]
    async fn test_search_without_key_is_empty() {
        let client = GeocodeClient::new(None).unwrap();
        assert!(client.search("Москва").await.is_empty());
    }

    #[tokio::test]
    async fn test_search_against_unreachable_upstream_degrades() {
        // Nothing listens on this port; the request errors and we degrade
        let client = GeocodeClient::new(Some("key".to_string()))
            .unwrap()
            .with_base_url("http://127.0.0.1:9/1.x/");
        assert!(client.search("Москва").await.is_empty());
    }
}
