use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::Client;
use sha2::{Digest, Sha256};
use url::Url;

use crate::config::ObjectStorageSettings;

type HmacSha256 = Hmac<Sha256>;

const AWS_URI_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Blob store for rendered results documents. Uploading returns the stable
/// URL under which the document stays retrievable.
#[async_trait]
pub trait DocumentStorage: Send + Sync {
    async fn upload(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String>;
}

/// S3-compatible client signing uploads with AWS Signature V4.
#[derive(Clone, Debug)]
pub struct ObjectStorageClient {
    bucket: String,
    region: String,
    endpoint: Url,
    access_key: String,
    secret_key: String,
    prefix: String,
    http: Client,
}

impl ObjectStorageClient {
    pub fn new(settings: ObjectStorageSettings) -> Result<Self> {
        let endpoint = settings
            .endpoint
            .unwrap_or_else(|| "https://storage.yandexcloud.net".to_string());

        let endpoint = Url::parse(&endpoint).context("Invalid object storage endpoint URL")?;
        if endpoint.host_str().is_none() {
            bail!("Object storage endpoint must include a host");
        }

        // Enforce HTTPS in production mode (check APP_ENV at runtime)
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "prod".to_string());
        if app_env == "prod" && endpoint.scheme() != "https" {
            bail!(
                "Object storage endpoint must use HTTPS in production mode. Got: {}",
                endpoint.scheme()
            );
        }

        if endpoint.scheme() != "https" && endpoint.scheme() != "http" {
            bail!(
                "Invalid endpoint scheme: {}. Must be http or https.",
                endpoint.scheme()
            );
        }

        Ok(Self {
            bucket: settings.bucket,
            region: settings.region,
            access_key: settings.access_key,
            secret_key: settings.secret_key,
            endpoint,
            prefix: sanitize_prefix(&settings.documents_prefix),
            http: Client::new(),
        })
    }

    /// Stable retrieval URL of an object; documents are uploaded
    /// world-readable under an unguessable name, so no signing is involved.
    pub fn public_url(&self, key: &str) -> String {
        let object_key = self.full_key(key);
        let mut url = self.endpoint.clone();
        url.set_path(&format!("{}/{}", self.bucket, encode_key(&object_key)));
        url.to_string()
    }

    fn full_key(&self, key: &str) -> String {
        let cleaned = key.trim_matches('/');
        if self.prefix.is_empty() {
            cleaned.to_string()
        } else if cleaned.is_empty() {
            self.prefix.clone()
        } else {
            format!("{}/{}", self.prefix, cleaned)
        }
    }

    fn canonical_uri(&self, key: &str) -> String {
        format!("/{}/{}", self.bucket, encode_key(key))
    }
}

#[async_trait]
impl DocumentStorage for ObjectStorageClient {
    async fn upload(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        let object_key = self.full_key(key);
        let canonical_uri = self.canonical_uri(&object_key);

        let payload_hash = hex::encode(Sha256::digest(&bytes));
        let now = Utc::now();
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date_stamp = now.format("%Y%m%d").to_string();
        let scope = format!("{}/{}/s3/aws4_request", date_stamp, self.region);

        let host = self
            .endpoint
            .host_str()
            .ok_or_else(|| anyhow!("Object storage endpoint missing host"))?
            .to_lowercase();

        let canonical_headers = format!(
            "host:{}\nx-amz-content-sha256:{}\nx-amz-date:{}\n",
            host, payload_hash, amz_date
        );
        let signed_headers = "host;x-amz-content-sha256;x-amz-date";

        let canonical_request = format!(
            "PUT\n{}\n\n{}\n{}\n{}",
            canonical_uri, canonical_headers, signed_headers, payload_hash
        );

        let hashed_canonical_request = hex::encode(Sha256::digest(canonical_request.as_bytes()));
        let string_to_sign = format!(
            "AWS4-HMAC-SHA256\n{}\n{}\n{}",
            amz_date, scope, hashed_canonical_request
        );

        let signing_key = derive_signing_key(&self.secret_key, &date_stamp, &self.region, "s3");
        let signature = hex::encode(hmac_sign(&signing_key, string_to_sign.as_bytes()));

        let authorization = format!(
            "AWS4-HMAC-SHA256 Credential={}/{}, SignedHeaders={}, Signature={}",
            self.access_key, scope, signed_headers, signature
        );

        let mut upload_url = self.endpoint.clone();
        upload_url.set_path(&format!("{}/{}", self.bucket, encode_key(&object_key)));

        self.http
            .put(upload_url)
            .header("Authorization", authorization)
            .header("x-amz-date", amz_date)
            .header("x-amz-content-sha256", payload_hash)
            .header("content-type", content_type)
            .body(bytes)
            .send()
            .await
            .with_context(|| format!("Failed to upload object {}", object_key))?
            .error_for_status()
            .context("Object storage upload returned error status")?;

        Ok(self.public_url(key))
    }
}

fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|segment| utf8_percent_encode(segment, AWS_URI_ENCODE_SET).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

fn sanitize_prefix(prefix: &str) -> String {
    prefix
        .trim_matches('/')
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

fn derive_signing_key(secret: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    let mut key = format!("AWS4{}", secret).into_bytes();
    key = hmac_sign(&key, date);
    key = hmac_sign(&key, region);
    key = hmac_sign(&key, service);
    hmac_sign(&key, b"aws4_request")
}

fn hmac_sign(key: &[u8], message: impl AsRef<[u8]>) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(message.as_ref());
    mac.finalize().into_bytes().to_vec()
}
