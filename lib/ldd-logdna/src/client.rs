/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use anyhow::{Context, anyhow};
use bytes::Bytes;
use chrono::Utc;
use http::{Request, Uri, header};
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use log::warn;
use serde::Serialize;
use serde_json::Value;

use super::LogDnaClientConfig;

#[derive(Serialize)]
struct IngestBody<'a> {
    lines: &'a [Value],
}

pub(crate) struct IngestClient {
    config: Arc<LogDnaClientConfig>,
    client: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    auth: String,
}

impl IngestClient {
    pub(crate) fn new(config: Arc<LogDnaClientConfig>) -> anyhow::Result<Self> {
        let mut roots = rustls::RootCertStore::empty();
        let native = rustls_native_certs::load_native_certs();
        let (added, _ignored) = roots.add_parsable_certificates(native.certs);
        if added == 0 && config.is_https() {
            warn!("no usable native root certificate found, logdna ingest over https will fail");
        }

        let tls_config = rustls::ClientConfig::builder_with_provider(
            rustls::crypto::ring::default_provider().into(),
        )
        .with_safe_default_protocol_versions()
        .context("failed to build tls client config")?
        .with_root_certificates(roots)
        .with_no_client_auth();

        let mut http_connector = HttpConnector::new();
        http_connector.enforce_http(false);
        let connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_tls_config(tls_config)
            .https_or_http()
            .enable_http1()
            .wrap_connector(http_connector);

        let client = Client::builder(TokioExecutor::new()).build(connector);
        let auth = config.basic_auth();
        Ok(IngestClient {
            config,
            client,
            auth,
        })
    }

    /// Post one batch, returns the encoded body size on success.
    pub(crate) async fn send(&self, lines: &[Value]) -> anyhow::Result<usize> {
        let body = serde_json::to_vec(&IngestBody { lines })
            .map_err(|e| anyhow!("failed to encode ingest body: {e}"))?;
        let size = body.len();

        let url = self.config.ingest_url(Utc::now().timestamp_millis());
        let uri: Uri = url
            .as_str()
            .parse()
            .map_err(|e| anyhow!("invalid ingest uri {url}: {e}"))?;
        let req = Request::post(uri)
            .header(header::AUTHORIZATION, self.auth.as_str())
            .header(header::CONTENT_TYPE, "application/json; charset=UTF-8")
            .header(header::USER_AGENT, concat!("ldd-logdna/", env!("CARGO_PKG_VERSION")))
            .body(Full::new(Bytes::from(body)))
            .map_err(|e| anyhow!("failed to build ingest request: {e}"))?;

        let rsp = tokio::time::timeout(self.config.timeout, self.client.request(req))
            .await
            .map_err(|_| anyhow!("timed out to send ingest request"))?
            .map_err(|e| anyhow!("failed to send ingest request: {e}"))?;

        let status = rsp.status();
        // the body is drained so the connection can be reused
        let _ = tokio::time::timeout(self.config.timeout, rsp.into_body().collect()).await;
        if status.is_success() {
            Ok(size)
        } else {
            Err(anyhow!("ingest request rejected with status {status}"))
        }
    }
}
