//! HTTP implementation of [`AdminApi`] against the gateway's `/admin/user` resource.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use rgwuser_core::AccessLevel;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use time::OffsetDateTime;
use url::Url;

use crate::error::{AdminError, NOT_FOUND_CODES};
use crate::signing::{SigningRequest, canonical_query, sign};
use crate::traits::{AdminApi, AdminClientFactory, DynAdminApi, EndpointContext};
use crate::types::{NewUser, QuotaSettings, RemoteUser, UserCap, UserChanges};

const ADMIN_USER_PATH: &str = "/admin/user";

/// Transport settings shared by every client built from one factory.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Upper bound for a single request, including connect.
    pub timeout: Duration,
    /// Signing region; gateways accept any region that matches their zonegroup.
    pub region: String,
    pub insecure_skip_verify: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            region: "us-east-1".to_string(),
            insecure_skip_verify: false,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(rename = "Code", default)]
    code: String,
}

/// Admin API client speaking signed HTTP to one gateway endpoint.
pub struct HttpAdminClient {
    http: reqwest::Client,
    base: Url,
    access_key: String,
    secret_key: String,
    region: String,
}

impl HttpAdminClient {
    pub fn new(context: &EndpointContext, settings: &ClientSettings) -> Result<Self, AdminError> {
        let endpoint = context.endpoint.trim();
        let endpoint = if endpoint.contains("://") {
            endpoint.to_string()
        } else {
            format!("http://{endpoint}")
        };
        let base = Url::parse(&endpoint).map_err(|e| {
            AdminError::invalid_request(format!("invalid endpoint {endpoint:?}: {e}"))
        })?;
        if base.host_str().is_none() {
            return Err(AdminError::invalid_request(format!(
                "endpoint {endpoint:?} has no host"
            )));
        }
        if context.access_key.is_empty() || context.secret_key.is_empty() {
            return Err(AdminError::invalid_request(
                "admin credentials must not be empty",
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .danger_accept_invalid_certs(settings.insecure_skip_verify)
            .build()?;

        Ok(Self {
            http,
            base,
            access_key: context.access_key.clone(),
            secret_key: context.secret_key.clone(),
            region: settings.region.clone(),
        })
    }

    fn admin_path(&self) -> String {
        format!("{}{ADMIN_USER_PATH}", self.base.path().trim_end_matches('/'))
    }

    fn host_header(&self) -> String {
        let host = self.base.host_str().unwrap_or_default();
        match self.base.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        }
    }

    /// Sends one signed request and returns the response body.
    ///
    /// `target` names the addressed entity for `NotFound` errors.
    async fn call(
        &self,
        method: Method,
        mut params: Vec<(&str, String)>,
        target: (&str, &str),
    ) -> Result<String, AdminError> {
        params.push(("format", "json".to_string()));
        let query = canonical_query(&params);
        let path = self.admin_path();

        let mut url = self.base.clone();
        url.set_path(&path);
        url.set_query(Some(&query));

        let host = self.host_header();
        let signed = sign(
            &SigningRequest {
                method: method.as_str(),
                host: &host,
                path: &path,
                query: &query,
                access_key: &self.access_key,
                secret_key: &self.secret_key,
                region: &self.region,
            },
            OffsetDateTime::now_utc(),
        );

        tracing::debug!(method = %method, path = %path, query = %query, "admin API request");

        let resp = self
            .http
            .request(method, url)
            .header("x-amz-date", signed.amz_date)
            .header("x-amz-content-sha256", crate::signing::EMPTY_PAYLOAD_SHA256)
            .header("Authorization", signed.authorization)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if status.is_success() {
            return Ok(body);
        }

        let code = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.code)
            .unwrap_or_default();
        if status == StatusCode::NOT_FOUND || NOT_FOUND_CODES.contains(&code.as_str()) {
            let (kind, id) = target;
            return Err(AdminError::not_found(kind, id));
        }
        Err(AdminError::http(status.as_u16(), code, body))
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, AdminError> {
    serde_json::from_str(body).map_err(|e| AdminError::decode(e.to_string()))
}

fn decode_caps(body: &str) -> Result<Vec<UserCap>, AdminError> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    decode(body)
}

fn subuser_id(id: &str, name: &str) -> String {
    format!("{id}:{name}")
}

#[async_trait]
impl AdminApi for HttpAdminClient {
    async fn get_user(&self, id: &str) -> Result<Option<RemoteUser>, AdminError> {
        match self
            .call(Method::GET, vec![("uid", id.to_string())], ("user", id))
            .await
        {
            Ok(body) => decode(&body).map(Some),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create_user(&self, user: &NewUser) -> Result<RemoteUser, AdminError> {
        let params = vec![
            ("uid", user.id.clone()),
            ("display-name", user.display_name.clone()),
            ("max-buckets", user.max_buckets.to_string()),
        ];
        let body = self.call(Method::PUT, params, ("user", &user.id)).await?;
        decode(&body)
    }

    async fn modify_user(
        &self,
        id: &str,
        changes: &UserChanges,
    ) -> Result<RemoteUser, AdminError> {
        let mut params = vec![("uid", id.to_string())];
        if let Some(display_name) = &changes.display_name {
            params.push(("display-name", display_name.clone()));
        }
        if let Some(max_buckets) = changes.max_buckets {
            params.push(("max-buckets", max_buckets.to_string()));
        }
        let body = self.call(Method::POST, params, ("user", id)).await?;
        decode(&body)
    }

    async fn delete_user(&self, id: &str, purge_data: bool) -> Result<(), AdminError> {
        let params = vec![("uid", id.to_string()), ("purge-data", purge_data.to_string())];
        self.call(Method::DELETE, params, ("user", id)).await?;
        Ok(())
    }

    async fn set_user_quota(&self, id: &str, quota: &QuotaSettings) -> Result<(), AdminError> {
        let params = vec![
            ("quota", String::new()),
            ("uid", id.to_string()),
            ("quota-type", "user".to_string()),
            ("enabled", quota.enabled.to_string()),
            ("max-objects", quota.max_objects.to_string()),
            ("max-size", quota.max_size.to_string()),
        ];
        self.call(Method::PUT, params, ("user", id)).await?;
        Ok(())
    }

    async fn add_user_caps(&self, id: &str, caps: &str) -> Result<Vec<UserCap>, AdminError> {
        let params = vec![
            ("caps", String::new()),
            ("uid", id.to_string()),
            ("user-caps", caps.to_string()),
        ];
        let body = self.call(Method::PUT, params, ("user", id)).await?;
        decode_caps(&body)
    }

    async fn remove_user_caps(&self, id: &str, caps: &str) -> Result<Vec<UserCap>, AdminError> {
        let params = vec![
            ("caps", String::new()),
            ("uid", id.to_string()),
            ("user-caps", caps.to_string()),
        ];
        let body = self.call(Method::DELETE, params, ("user", id)).await?;
        decode_caps(&body)
    }

    async fn create_subuser(
        &self,
        id: &str,
        name: &str,
        access: AccessLevel,
    ) -> Result<(), AdminError> {
        let mut params = vec![("uid", id.to_string()), ("subuser", name.to_string())];
        if access != AccessLevel::None {
            params.push(("access", access.as_request_str().to_string()));
        }
        self.call(Method::PUT, params, ("user", id)).await?;
        Ok(())
    }

    async fn modify_subuser(
        &self,
        id: &str,
        name: &str,
        access: AccessLevel,
    ) -> Result<(), AdminError> {
        let params = vec![
            ("uid", id.to_string()),
            ("subuser", name.to_string()),
            ("access", access.as_request_str().to_string()),
        ];
        self.call(Method::POST, params, ("subuser", &subuser_id(id, name)))
            .await?;
        Ok(())
    }

    async fn remove_subuser(&self, id: &str, name: &str) -> Result<(), AdminError> {
        let params = vec![
            ("uid", id.to_string()),
            ("subuser", name.to_string()),
            ("purge-keys", "true".to_string()),
        ];
        self.call(Method::DELETE, params, ("subuser", &subuser_id(id, name)))
            .await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "http"
    }
}

/// Production factory: one signed HTTP client per endpoint context.
#[derive(Debug, Clone, Default)]
pub struct HttpAdminClientFactory {
    settings: ClientSettings,
}

impl HttpAdminClientFactory {
    pub fn new(settings: ClientSettings) -> Self {
        Self { settings }
    }
}

impl AdminClientFactory for HttpAdminClientFactory {
    fn build(&self, context: &EndpointContext) -> Result<DynAdminApi, AdminError> {
        Ok(std::sync::Arc::new(HttpAdminClient::new(
            context,
            &self.settings,
        )?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(endpoint: &str) -> EndpointContext {
        EndpointContext {
            namespace: "rook-ceph".into(),
            store: "my-store".into(),
            endpoint: endpoint.into(),
            access_key: "53S6B9S809NUP19IJ2K3".into(),
            secret_key: "1bXPegzsGClvoGAiJdHQD1uOW2sQBLAZM9j9VtXR".into(),
        }
    }

    #[test]
    fn test_endpoint_without_scheme_defaults_to_http() {
        let client =
            HttpAdminClient::new(&context("rook-ceph-rgw-my-store.rook-ceph.svc"), &ClientSettings::default())
                .unwrap();
        assert_eq!(client.base.scheme(), "http");
        assert_eq!(client.host_header(), "rook-ceph-rgw-my-store.rook-ceph.svc");
        assert_eq!(client.admin_path(), "/admin/user");
    }

    #[test]
    fn test_host_header_keeps_non_default_port() {
        let client = HttpAdminClient::new(&context("http://rgw.local:8080/"), &ClientSettings::default())
            .unwrap();
        assert_eq!(client.host_header(), "rgw.local:8080");
    }

    #[test]
    fn test_rejects_empty_credentials() {
        let mut ctx = context("http://rgw.local");
        ctx.secret_key.clear();
        let err = HttpAdminClient::new(&ctx, &ClientSettings::default())
            .err()
            .unwrap();
        assert!(matches!(err, AdminError::InvalidRequest(_)));
    }

    #[test]
    fn test_rejects_malformed_endpoint() {
        assert!(HttpAdminClient::new(&context("http://"), &ClientSettings::default()).is_err());
    }
}
