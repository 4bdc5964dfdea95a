// # Azure DNS Zone Provider
//
// ZoneApi implementation backed by the Azure Resource Manager DNS API.
//
// - One HTTP request per call (plus `nextLink` continuation pages on list)
// - Full error propagation to the mutation engine
// - HTTP timeout configured (30 seconds)
// - Specific error handling for HTTP status codes (401/403, 404, 409, 429, 5xx)
// - NO retry logic (intentionally omitted - owned by the caller)
// - NO caching (the sync pipeline lists fresh state per run)
// - NO background tasks
//
// ## Security Requirements
//
// - The access token NEVER appears in logs or Debug output
// - The access token is provided by the caller (environment or token broker)
//
// ## API Reference
//
// - Azure DNS REST API, api-version 2018-05-01
// - List all record sets: GET
//   `/subscriptions/{sub}/resourceGroups/{rg}/providers/Microsoft.Network/dnsZones/{zone}/all`
// - Create or update: PUT `.../dnsZones/{zone}/{TYPE}/{relativeName}`
// - Delete: DELETE `.../dnsZones/{zone}/{TYPE}/{relativeName}`

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use zonesync_core::error::{Error, Result};
use zonesync_core::schema::RecordType;
use zonesync_core::traits::{RemoteRecordSet, ZoneApi};

/// Azure Resource Manager base URL
const ARM_BASE: &str = "https://management.azure.com";

/// DNS API version used for every request
const API_VERSION: &str = "2018-05-01";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// One page of the record set listing
#[derive(Debug, Deserialize)]
struct RecordSetPage {
    value: Vec<RemoteRecordSet>,
    #[serde(rename = "nextLink")]
    next_link: Option<String>,
}

/// Azure DNS zone client.
///
/// Stateless and single-shot: every call is one request (list follows
/// continuation pages), every failure is propagated.
pub struct AzureZoneApi {
    /// ARM bearer token. NEVER log this value.
    access_token: String,

    /// Azure subscription the zone lives in
    subscription_id: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// The Debug implementation intentionally does NOT expose the access token.
impl std::fmt::Debug for AzureZoneApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureZoneApi")
            .field("access_token", &"<REDACTED>")
            .field("subscription_id", &self.subscription_id)
            .finish()
    }
}

impl AzureZoneApi {
    /// Create a client for one subscription.
    ///
    /// Fails fast on an empty token; an unauthenticated client can only
    /// produce confusing 401s later.
    pub fn new(access_token: impl Into<String>, subscription_id: impl Into<String>) -> Result<Self> {
        let access_token = access_token.into();
        if access_token.is_empty() {
            return Err(Error::config("Azure access token cannot be empty"));
        }

        let subscription_id = subscription_id.into();
        if subscription_id.is_empty() {
            return Err(Error::config("Azure subscription ID cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::provider("azure", format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            access_token,
            subscription_id,
            client,
        })
    }

    fn zone_url(&self, resource_group: &str, zone_name: &str) -> String {
        format!(
            "{ARM_BASE}/subscriptions/{}/resourceGroups/{resource_group}/providers/Microsoft.Network/dnsZones/{zone_name}",
            self.subscription_id
        )
    }

    /// URL of one record set resource. The URL uses the short type name
    /// (`A`, `MX`, ...), unlike the payload's fully-qualified type.
    fn record_set_url(
        &self,
        resource_group: &str,
        zone_name: &str,
        path: &str,
        record_type: RecordType,
    ) -> String {
        format!(
            "{}/{}/{path}?api-version={API_VERSION}",
            self.zone_url(resource_group, zone_name),
            record_type.name()
        )
    }

    /// Map a non-success response to an error, consuming the body for the
    /// message.
    async fn response_error(&self, operation: &str, response: reqwest::Response) -> Error {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unable to read error response".to_string());

        match status.as_u16() {
            401 | 403 => Error::provider(
                "azure",
                format!("authentication failed: invalid token or insufficient permissions (status {status})"),
            ),
            404 => Error::provider("azure", format!("{operation}: resource not found (status {status})")),
            409 => Error::provider(
                "azure",
                format!("{operation}: conflicting concurrent modification (status {status})"),
            ),
            429 => Error::provider("azure", format!("{operation}: rate limit exceeded (status {status})")),
            500..=599 => Error::provider(
                "azure",
                format!("{operation}: Azure server error (transient): {status} - {body}"),
            ),
            _ => Error::provider("azure", format!("{operation} failed: {status} - {body}")),
        }
    }
}

#[async_trait]
impl ZoneApi for AzureZoneApi {
    /// List every record set in the zone, following `nextLink` pages until
    /// the listing is complete.
    async fn list_all(&self, resource_group: &str, zone_name: &str) -> Result<Vec<RemoteRecordSet>> {
        let mut url = format!(
            "{}/all?api-version={API_VERSION}",
            self.zone_url(resource_group, zone_name)
        );
        let mut record_sets = Vec::new();

        loop {
            tracing::debug!(%zone_name, "listing record sets");

            let response = self
                .client
                .get(&url)
                .bearer_auth(&self.access_token)
                .send()
                .await
                .map_err(|e| Error::provider("azure", format!("HTTP request failed: {e}")))?;

            if !response.status().is_success() {
                return Err(self.response_error("list record sets", response).await);
            }

            let page: RecordSetPage = response
                .json()
                .await
                .map_err(|e| Error::provider("azure", format!("failed to parse listing: {e}")))?;

            record_sets.extend(page.value);

            match page.next_link {
                Some(next) => url = next,
                None => break,
            }
        }

        tracing::debug!(count = record_sets.len(), %zone_name, "zone listed");
        Ok(record_sets)
    }

    async fn create_or_update(
        &self,
        resource_group: &str,
        zone_name: &str,
        path: &str,
        record_type: RecordType,
        record_set: RemoteRecordSet,
    ) -> Result<()> {
        let url = self.record_set_url(resource_group, zone_name, path, record_type);

        tracing::info!(%path, %record_type, %zone_name, "submitting record set");

        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.access_token)
            .json(&record_set)
            .send()
            .await
            .map_err(|e| Error::provider("azure", format!("HTTP request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(self.response_error("create or update record set", response).await);
        }

        Ok(())
    }

    async fn delete(
        &self,
        resource_group: &str,
        zone_name: &str,
        path: &str,
        record_type: RecordType,
    ) -> Result<()> {
        let url = self.record_set_url(resource_group, zone_name, path, record_type);

        tracing::info!(%path, %record_type, %zone_name, "deleting record set");

        let response = self
            .client
            .delete(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| Error::provider("azure", format!("HTTP request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(self.response_error("delete record set", response).await);
        }

        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "azure"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_credentials_are_rejected() {
        assert!(AzureZoneApi::new("", "sub").is_err());
        assert!(AzureZoneApi::new("token", "").is_err());
        assert!(AzureZoneApi::new("token", "sub").is_ok());
    }

    #[test]
    fn access_token_not_exposed_in_debug() {
        let api = AzureZoneApi::new("secret_token_12345", "sub-id").unwrap();
        let debug_str = format!("{api:?}");
        assert!(!debug_str.contains("secret_token_12345"));
        assert!(debug_str.contains("AzureZoneApi"));
        assert!(debug_str.contains("sub-id"));
    }

    #[test]
    fn record_set_urls_use_the_short_type_name() {
        let api = AzureZoneApi::new("token", "sub-id").unwrap();
        let url = api.record_set_url("my-rg", "example.com", "www", RecordType::Aaaa);
        assert_eq!(
            url,
            "https://management.azure.com/subscriptions/sub-id/resourceGroups/my-rg\
             /providers/Microsoft.Network/dnsZones/example.com/AAAA/www?api-version=2018-05-01"
        );
    }

    #[test]
    fn listing_pages_deserialize_with_and_without_next_link() {
        let page: RecordSetPage = serde_json::from_value(serde_json::json!({
            "value": [{
                "name": "www",
                "type": "Microsoft.Network/dnszones/A",
                "properties": { "TTL": 300, "aRecords": [{ "ipv4Address": "1.2.3.4" }] }
            }],
            "nextLink": "https://management.azure.com/page2"
        }))
        .unwrap();
        assert_eq!(page.value.len(), 1);
        assert_eq!(page.next_link.as_deref(), Some("https://management.azure.com/page2"));

        let last: RecordSetPage =
            serde_json::from_value(serde_json::json!({ "value": [] })).unwrap();
        assert!(last.next_link.is_none());
    }
}
