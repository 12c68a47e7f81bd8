// Geocoding + time-zone lookup (Google Maps web services).
//
// Only two calls are used: address → coordinates, and coordinates →
// IANA time-zone id. Both report failures through a `status` field in an
// HTTP 200 body, which is surfaced as `Error::Geocode`.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::Error;
use crate::transport::TransportConfig;

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/";

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimeZoneResponse {
    status: String,
    #[serde(default)]
    time_zone_id: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
}

/// Async client for the geocoding and time-zone services.
pub struct GeocodeClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: SecretString,
}

impl GeocodeClient {
    pub fn new(api_key: SecretString, transport: &TransportConfig) -> Result<Self, Error> {
        Self::with_base_url(DEFAULT_BASE_URL, api_key, transport)
    }

    pub fn with_base_url(
        base_url: &str,
        api_key: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            http: transport.build_client()?,
            base_url,
            api_key,
        })
    }

    /// Coordinates of the first match for a street address.
    pub async fn geocode(&self, address: &str) -> Result<LatLng, Error> {
        let url = self.base_url.join("geocode/json")?;
        debug!("GET {url} address={address:?}");

        let resp: GeocodeResponse = self
            .http
            .get(url)
            .query(&[("address", address), ("key", self.api_key.expose_secret())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if resp.status != "OK" {
            return Err(Error::Geocode {
                message: resp
                    .error_message
                    .unwrap_or_else(|| format!("no result for {address:?}")),
                status: resp.status,
            });
        }

        resp.results
            .into_iter()
            .next()
            .map(|r| r.geometry.location)
            .ok_or_else(|| Error::Geocode {
                status: "ZERO_RESULTS".into(),
                message: format!("no result for {address:?}"),
            })
    }

    /// IANA time-zone id at a location for the given UNIX timestamp.
    pub async fn time_zone(&self, location: LatLng, timestamp: i64) -> Result<String, Error> {
        let url = self.base_url.join("timezone/json")?;
        let location = format!("{},{}", location.lat, location.lng);
        let timestamp = timestamp.to_string();
        debug!("GET {url} location={location}");

        let resp: TimeZoneResponse = self
            .http
            .get(url)
            .query(&[
                ("location", location.as_str()),
                ("timestamp", timestamp.as_str()),
                ("key", self.api_key.expose_secret()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if resp.status == "OK" {
            if let Some(id) = resp.time_zone_id {
                return Ok(id);
            }
        }

        Err(Error::Geocode {
            message: resp
                .error_message
                .unwrap_or_else(|| "no time zone for location".into()),
            status: resp.status,
        })
    }

    /// Geocode an address and resolve its current time zone.
    pub async fn time_zone_for_address(&self, address: &str, timestamp: i64) -> Result<String, Error> {
        let location = self.geocode(address).await?;
        self.time_zone(location, timestamp).await
    }
}
