//! Azure-backed blob driver.

use crate::driver::{Driver, ObjectStoreDriver};
use crate::{CloudError, Result};
use object_store::azure::MicrosoftAzureBuilder;
use object_store::ClientOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Fixed connect/read timeout applied to the underlying client.
const CLIENT_TIMEOUT: Duration = Duration::from_secs(300);

/// The parsed pieces of an Azure storage connection string.
///
/// The string is a `;`-separated list of `Key=Value` pairs, e.g.
/// `DefaultEndpointsProtocol=https;AccountName=acme;AccountKey=...`.
/// Unrecognized keys are ignored.
#[derive(Debug, Default, Clone)]
struct ConnectionString {
    account_name: Option<String>,
    account_key: Option<String>,
    blob_endpoint: Option<String>,
    endpoints_protocol: Option<String>,
    use_development_storage: bool,
}

impl ConnectionString {
    fn parse(raw: &str) -> Result<Self> {
        let mut parsed = ConnectionString::default();

        for pair in raw.split(';') {
            let pair = pair.trim();
            if pair.is_empty() {
                continue;
            }
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                CloudError::InvalidConnectionString(format!(
                    "expected Key=Value pairs separated by ';', got '{}'",
                    pair
                ))
            })?;

            match key {
                "AccountName" => parsed.account_name = Some(value.to_string()),
                "AccountKey" => parsed.account_key = Some(value.to_string()),
                "BlobEndpoint" => parsed.blob_endpoint = Some(value.to_string()),
                "DefaultEndpointsProtocol" => {
                    parsed.endpoints_protocol = Some(value.to_string())
                }
                "UseDevelopmentStorage" => {
                    parsed.use_development_storage = value.eq_ignore_ascii_case("true")
                }
                _ => {}
            }
        }

        if parsed.account_name.is_none() && !parsed.use_development_storage {
            return Err(CloudError::InvalidConnectionString(
                "missing AccountName".to_string(),
            ));
        }

        Ok(parsed)
    }

    fn allows_http(&self) -> bool {
        self.endpoints_protocol.as_deref() == Some("http")
            || self
                .blob_endpoint
                .as_deref()
                .is_some_and(|e| e.starts_with("http://"))
    }
}

/// [`Driver`] bound to one Azure storage account and container.
///
/// Single "bound" state after construction; construction fails fast when the
/// connection string or container is empty and leaves no partial state.
#[derive(Debug)]
pub struct AzureBlobDriver {
    inner: ObjectStoreDriver,
}

impl AzureBlobDriver {
    /// Bind a driver to `(connection_string, container)`, writing pulled
    /// blobs under `output_folder`.
    pub fn new(
        connection_string: &str,
        container: &str,
        output_folder: impl Into<PathBuf>,
    ) -> Result<Self> {
        if connection_string.is_empty() || container.is_empty() {
            return Err(CloudError::Configuration(
                "Both connection string and container are mandatory.".to_string(),
            ));
        }

        let parsed = ConnectionString::parse(connection_string)?;

        let mut builder = MicrosoftAzureBuilder::new()
            .with_container_name(container)
            .with_client_options(
                ClientOptions::new()
                    .with_timeout(CLIENT_TIMEOUT)
                    .with_connect_timeout(CLIENT_TIMEOUT),
            );

        if parsed.use_development_storage {
            builder = builder.with_use_emulator(true);
        }
        if let Some(account) = &parsed.account_name {
            builder = builder.with_account(account);
        }
        if let Some(key) = &parsed.account_key {
            builder = builder.with_access_key(key);
        }
        if let Some(endpoint) = &parsed.blob_endpoint {
            builder = builder.with_endpoint(endpoint.trim_end_matches('/').to_string());
        }
        if parsed.allows_http() {
            builder = builder.with_allow_http(true);
        }

        let store = builder.build()?;

        Ok(AzureBlobDriver {
            inner: ObjectStoreDriver::new(Arc::new(store), output_folder)?,
        })
    }
}

impl Driver for AzureBlobDriver {
    fn pull(&self, remote_name: &str) -> Result<PathBuf> {
        self.inner.pull(remote_name)
    }

    fn push(&self, local_path: &Path, remote_name: Option<&str>) -> Result<String> {
        self.inner.push(local_path, remote_name)
    }

    fn list_blobs(&self, filter: Option<&str>) -> Result<Vec<String>> {
        self.inner.list_blobs(filter)
    }
}
