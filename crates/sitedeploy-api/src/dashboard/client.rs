// Hand-crafted async HTTP client for the cloud dashboard REST API (v1).
//
// Base path: https://{shard}/api/v1/
// Auth: X-Cisco-Meraki-API-Key header

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, LINK, RETRY_AFTER};
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use super::Region;
use super::types::{
    ApplianceVlan, BindRequest, ConfigTemplate, Device, DeviceClaim, DeviceUpdate,
    ErrorResponse, InventoryClaim, InventoryDevice, Network, NetworkCreate, NetworkUpdate,
    Organization, UnbindRequest, VlanUpdate,
};
use crate::Error;
use crate::transport::{RetryPolicy, TransportConfig};

const API_KEY_HEADER: &str = "X-Cisco-Meraki-API-Key";
const NETWORKS_PER_PAGE: u32 = 1000;

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the dashboard API.
///
/// Every request is retried on HTTP 429 according to the configured
/// [`RetryPolicy`]; all other failures surface immediately.
pub struct DashboardClient {
    http: reqwest::Client,
    base_url: Url,
    retry: RetryPolicy,
}

impl DashboardClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from an API key and transport config against an explicit base URL.
    ///
    /// Injects the API key as a sensitive default header on every request.
    pub fn from_api_key(
        base_url: &str,
        api_key: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut key_value =
            HeaderValue::from_str(api_key.expose_secret()).map_err(|_| Error::InvalidApiKey)?;
        key_value.set_sensitive(true);
        headers.insert(API_KEY_HEADER, key_value);

        let http = transport.build_client_with_headers(headers)?;
        let base_url = Self::normalize_base_url(base_url)?;

        Ok(Self {
            http,
            base_url,
            retry: transport.retry.clone(),
        })
    }

    /// Build against the regional dashboard host.
    pub fn for_region(
        region: Region,
        api_key: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        Self::from_api_key(region.base_url(), api_key, transport)
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(
        base_url: &str,
        http: reqwest::Client,
        retry: RetryPolicy,
    ) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            retry,
        })
    }

    /// Ensure the base URL ends in `/api/v1/` so relative joins work.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();

        if path.ends_with("/api/v1") {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}/api/v1/"));
        }

        Ok(url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    // ── Transport with rate-limit retry ──────────────────────────────

    /// Send a request, retrying the identical request on HTTP 429.
    async fn send<B: Serialize + Sync>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<reqwest::Response, Error> {
        let mut attempt: u32 = 1;
        loop {
            debug!("{method} {url}");

            let mut req = self.http.request(method.clone(), url.clone());
            if let Some(body) = body {
                req = req.json(body);
            }
            let resp = req.send().await?;

            if resp.status() != StatusCode::TOO_MANY_REQUESTS {
                return Ok(resp);
            }

            if attempt >= self.retry.max_attempts {
                warn!(attempts = attempt, "rate limit persisted, giving up on {url}");
                return Err(Error::RateLimitExceeded { attempts: attempt });
            }

            let delay = self.retry.delay_for(attempt, retry_after(resp.headers()));
            warn!(
                attempt,
                delay_ms = delay.as_millis(),
                "rate limited by dashboard, retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        let resp = self.send::<()>(Method::GET, url, None).await?;
        self.handle_response(resp).await
    }

    /// GET that maps HTTP 404 to `Ok(None)` ("confirmed absent").
    async fn get_optional<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, Error> {
        let url = self.url(path)?;
        let resp = self.send::<()>(Method::GET, url, None).await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        self.handle_response(resp).await.map(Some)
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        let resp = self.send(Method::POST, url, Some(body)).await?;
        self.handle_response(resp).await
    }

    async fn post_no_response<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), Error> {
        let url = self.url(path)?;
        let resp = self.send(Method::POST, url, Some(body)).await?;
        self.handle_empty(resp).await
    }

    async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        let resp = self.send(Method::PUT, url, Some(body)).await?;
        self.handle_response(resp).await
    }

    // ── Pagination ───────────────────────────────────────────────────

    /// Collect every page of a list endpoint by following `Link: rel=next`.
    async fn get_all_pages<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<T>, Error> {
        let mut url = self.url(path)?;
        if !params.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));
        }

        let mut all = Vec::new();
        let mut next = Some(url);
        while let Some(page_url) = next.take() {
            let resp = self.send::<()>(Method::GET, page_url, None).await?;
            next = next_link(resp.headers());
            let page: Vec<T> = self.handle_response(resp).await?;
            debug!(received = page.len(), more = next.is_some(), "page fetched");
            all.extend(page);
        }

        Ok(all)
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn handle_empty(&self, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn parse_error(&self, status: StatusCode, resp: reqwest::Response) -> Error {
        if status == StatusCode::UNAUTHORIZED {
            return Error::InvalidApiKey;
        }

        let raw = resp.text().await.unwrap_or_default();

        let message = match serde_json::from_str::<ErrorResponse>(&raw) {
            Ok(err) if !err.errors.is_empty() => err.errors.join("; "),
            _ if raw.is_empty() => status.to_string(),
            _ => raw,
        };

        Error::Api {
            status: status.as_u16(),
            message,
        }
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── Organizations ────────────────────────────────────────────────

    pub async fn list_organizations(&self) -> Result<Vec<Organization>, Error> {
        self.get("organizations").await
    }

    // ── Networks ─────────────────────────────────────────────────────

    /// Every network in the organization, across all pages.
    pub async fn list_networks(&self, org_id: &str) -> Result<Vec<Network>, Error> {
        self.get_all_pages(
            &format!("organizations/{org_id}/networks"),
            &[("perPage", NETWORKS_PER_PAGE.to_string())],
        )
        .await
    }

    pub async fn create_network(
        &self,
        org_id: &str,
        body: &NetworkCreate,
    ) -> Result<Network, Error> {
        self.post(&format!("organizations/{org_id}/networks"), body)
            .await
    }

    pub async fn update_network(
        &self,
        network_id: &str,
        body: &NetworkUpdate,
    ) -> Result<Network, Error> {
        self.put(&format!("networks/{network_id}"), body).await
    }

    // ── Configuration templates ──────────────────────────────────────

    pub async fn list_config_templates(&self, org_id: &str) -> Result<Vec<ConfigTemplate>, Error> {
        self.get(&format!("organizations/{org_id}/configTemplates"))
            .await
    }

    pub async fn bind_network(&self, network_id: &str, body: &BindRequest) -> Result<(), Error> {
        self.post_no_response(&format!("networks/{network_id}/bind"), body)
            .await
    }

    pub async fn unbind_network(&self, network_id: &str, retain_configs: bool) -> Result<(), Error> {
        self.post_no_response(
            &format!("networks/{network_id}/unbind"),
            &UnbindRequest { retain_configs },
        )
        .await
    }

    // ── Inventory ────────────────────────────────────────────────────

    /// Claim serials or license keys into the organization inventory.
    pub async fn claim_into_organization(
        &self,
        org_id: &str,
        body: &InventoryClaim,
    ) -> Result<(), Error> {
        self.post_no_response(&format!("organizations/{org_id}/inventory/claim"), body)
            .await
    }

    /// Inventory record for a serial; `None` when the dashboard has no such device.
    pub async fn get_inventory_device(
        &self,
        org_id: &str,
        serial: &str,
    ) -> Result<Option<InventoryDevice>, Error> {
        self.get_optional(&format!("organizations/{org_id}/inventory/devices/{serial}"))
            .await
    }

    // ── Devices ──────────────────────────────────────────────────────

    pub async fn claim_into_network(
        &self,
        network_id: &str,
        serials: &[String],
    ) -> Result<(), Error> {
        self.post_no_response(
            &format!("networks/{network_id}/devices/claim"),
            &DeviceClaim {
                serials: serials.to_vec(),
            },
        )
        .await
    }

    pub async fn get_device(&self, serial: &str) -> Result<Option<Device>, Error> {
        self.get_optional(&format!("devices/{serial}")).await
    }

    pub async fn update_device(&self, serial: &str, body: &DeviceUpdate) -> Result<Device, Error> {
        self.put(&format!("devices/{serial}"), body).await
    }

    pub async fn list_network_devices(&self, network_id: &str) -> Result<Vec<Device>, Error> {
        self.get(&format!("networks/{network_id}/devices")).await
    }

    // ── Appliance VLANs ──────────────────────────────────────────────

    pub async fn list_appliance_vlans(&self, network_id: &str) -> Result<Vec<ApplianceVlan>, Error> {
        self.get(&format!("networks/{network_id}/appliance/vlans"))
            .await
    }

    pub async fn update_appliance_vlan(
        &self,
        network_id: &str,
        vlan_id: u16,
        body: &VlanUpdate,
    ) -> Result<ApplianceVlan, Error> {
        self.put(
            &format!("networks/{network_id}/appliance/vlans/{vlan_id}"),
            body,
        )
        .await
    }
}

// ── Header helpers ───────────────────────────────────────────────────

/// `Retry-After` in (possibly fractional) seconds.
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    let raw = headers.get(RETRY_AFTER)?.to_str().ok()?;
    let secs: f64 = raw.trim().parse().ok()?;
    if !(secs.is_finite() && secs >= 0.0) {
        return None;
    }
    // Out-of-range values saturate; the retry policy caps them anyway.
    Some(Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX))
}

/// Extract the `rel=next` target from an RFC 8288 `Link` header.
fn next_link(headers: &HeaderMap) -> Option<Url> {
    let raw = headers.get(LINK)?.to_str().ok()?;
    raw.split(',').find_map(|part| {
        let mut segments = part.split(';');
        let target = segments.next()?.trim();
        let is_next = segments.any(|param| {
            let param = param.trim().replace('"', "");
            param.eq_ignore_ascii_case("rel=next")
        });
        if !is_next {
            return None;
        }
        let target = target.strip_prefix('<')?.strip_suffix('>')?;
        Url::parse(target).ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(name: reqwest::header::HeaderName, value: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(name, HeaderValue::from_str(value).expect("header value"));
        map
    }

    #[test]
    fn next_link_picks_rel_next() {
        let map = headers(
            LINK,
            "<https://api.example.com/api/v1/organizations/1/networks?startingAfter=A>; rel=first, \
             <https://api.example.com/api/v1/organizations/1/networks?startingAfter=N>; rel=next",
        );
        let next = next_link(&map).expect("next link");
        assert_eq!(next.query(), Some("startingAfter=N"));
    }

    #[test]
    fn next_link_absent_on_last_page() {
        let map = headers(
            LINK,
            "<https://api.example.com/api/v1/x?startingAfter=A>; rel=\"first\"",
        );
        assert!(next_link(&map).is_none());
    }

    #[test]
    fn retry_after_parses_fractional_seconds() {
        let map = headers(RETRY_AFTER, "1.5");
        assert_eq!(retry_after(&map), Some(Duration::from_millis(1500)));
        assert_eq!(retry_after(&headers(RETRY_AFTER, "soon")), None);
    }

    #[test]
    fn retry_after_saturates_huge_values() {
        assert_eq!(retry_after(&headers(RETRY_AFTER, "1e30")), Some(Duration::MAX));
        assert_eq!(retry_after(&headers(RETRY_AFTER, "-1")), None);
    }

    #[test]
    fn base_url_gains_api_prefix() {
        let url = DashboardClient::normalize_base_url("http://127.0.0.1:9000").expect("url");
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/api/v1/");
        let url = DashboardClient::normalize_base_url("https://api.meraki.com/api/v1").expect("url");
        assert_eq!(url.as_str(), "https://api.meraki.com/api/v1/");
    }
}
