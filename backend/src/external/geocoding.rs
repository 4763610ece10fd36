//! Reverse geocoding for registration locations
//!
//! Talks to a Nominatim-compatible `/reverse` endpoint. Lookups are best
//! effort: any failure resolves to an "Unknown" place.

use reqwest::Client;
use serde::Deserialize;
use shared::{Coordinates, PlaceName};
use std::time::Duration;

use crate::config::ServicesConfig;

const USER_AGENT: &str = "CropAdvisory/1.0";

/// Reverse geocoding client
#[derive(Clone)]
pub struct GeocodingClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    address: Option<Address>,
}

#[derive(Debug, Default, Deserialize)]
struct Address {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    county: Option<String>,
    state: Option<String>,
    region: Option<String>,
}

impl Address {
    fn into_place(self) -> PlaceName {
        let city = self
            .city
            .or(self.town)
            .or(self.village)
            .or(self.county)
            .unwrap_or_default();
        let state = self.state.or(self.region).unwrap_or_default();
        PlaceName { city, state }
    }
}

impl GeocodingClient {
    pub fn new(config: &ServicesConfig) -> Self {
        Self::with_base_url(config.geocoding_url.clone(), config.geocoding_timeout())
    }

    /// Create a client with a custom base URL (for testing)
    pub fn with_base_url(base_url: String, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url,
            timeout,
        }
    }

    /// Resolve city and state for a coordinate pair, never failing
    pub async fn reverse(&self, coords: Coordinates) -> PlaceName {
        match self.try_reverse(coords).await {
            Ok(place) => place,
            Err(e) => {
                tracing::warn!("Reverse geocoding failed: {}", e);
                PlaceName::unknown()
            }
        }
    }

    async fn try_reverse(&self, coords: Coordinates) -> Result<PlaceName, reqwest::Error> {
        let url = format!(
            "{}/reverse?format=jsonv2&lat={}&lon={}",
            self.base_url.trim_end_matches('/'),
            coords.latitude,
            coords.longitude
        );

        let data: ReverseResponse = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(data.address.unwrap_or_default().into_place())
    }
}
