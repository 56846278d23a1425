//! A [`Transport`] over `reqwest`.
//!
//! [`ReqwestTransport`] owns one `reqwest::Client` with the credentials baked
//! into its default headers. It never retries and never interprets status
//! codes: every response that arrives is handed back as a
//! [`TransportResponse`] and classified by the gateway client.
//!
//! ## Error Handling
//!
//! - request build failures → [`TransportFailure::Unexpected`]
//! - connect and timeout failures → [`TransportFailure::Network`]
//! - body read failures after a status arrived → a response with a `Null` body

use cardpay::config::SdkConfig;
use cardpay::gateway::GatewayClient;
use cardpay::transport::{
    BoxFuture, HttpMethod, Transport, TransportFailure, TransportRequest, TransportResponse,
};
use cardpay::ErrorRecord;
use http::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde_json::Value;
use url::Url;

#[cfg(feature = "telemetry")]
use tracing::instrument;

use crate::constants::{JSON_CONTENT_TYPE, MERCHANT_ID_HEADER, USER_AGENT};
use crate::error::TransportBuildError;

/// `reqwest` implementation of [`Transport`].
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    /// Base URL, e.g. `https://sandbox.api.cardpay.dev/v1`
    base_url: Url,
    /// Client carrying the authentication headers and timeout
    client: Client,
}

impl ReqwestTransport {
    /// Builds a transport from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportBuildError`] if the base URL is unusable, a
    /// credential is not a valid header value, or the client fails to build.
    pub fn try_new(config: &SdkConfig) -> Result<Self, TransportBuildError> {
        let base_url = parse_base_url(config.base_url())?;

        let mut headers = HeaderMap::new();
        let mut authorization = HeaderValue::from_str(&format!("Bearer {}", config.api_key()))
            .map_err(|source| TransportBuildError::InvalidHeader {
                name: "Authorization",
                source,
            })?;
        authorization.set_sensitive(true);
        headers.insert(AUTHORIZATION, authorization);
        let merchant_id = HeaderValue::from_str(config.merchant_id()).map_err(|source| {
            TransportBuildError::InvalidHeader {
                name: MERCHANT_ID_HEADER,
                source,
            }
        })?;
        headers.insert(HeaderName::from_static(MERCHANT_ID_HEADER), merchant_id);
        headers.insert(ACCEPT, HeaderValue::from_static(JSON_CONTENT_TYPE));

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .timeout(config.timeout())
            .build()
            .map_err(|source| TransportBuildError::Client { source })?;

        Ok(Self { base_url, client })
    }

    /// Returns the base URL requests are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves a gateway path and query against the base URL.
    ///
    /// Each path segment is percent-encoded on its own. Empty, `.` and `..`
    /// segments are dropped; the gateway client rejects such identifiers
    /// before they get here.
    #[must_use]
    pub fn endpoint(&self, path: &str, query: &[(String, String)]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(path.split('/').filter(|segment| !segment.is_empty()));
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        url
    }

    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "cardpay.http.send", skip_all, err, fields(
            method = %request.method,
            path = %request.path,
            status = tracing::field::Empty,
        ))
    )]
    async fn execute(
        &self,
        request: TransportRequest,
    ) -> Result<TransportResponse, TransportFailure> {
        let url = self.endpoint(&request.path, &request.query);
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url),
        };
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(send_failure)?;
        let status = response.status().as_u16();

        #[cfg(feature = "telemetry")]
        tracing::Span::current().record("status", status);

        Ok(read_response(status, response.text().await))
    }
}

impl Transport for ReqwestTransport {
    fn send(
        &self,
        request: TransportRequest,
    ) -> BoxFuture<'_, Result<TransportResponse, TransportFailure>> {
        Box::pin(self.execute(request))
    }
}

/// Builds a gateway client over a [`ReqwestTransport`] for `config`.
///
/// # Errors
///
/// Returns a `CONFIGURATION` record if the transport cannot be built.
pub fn connect(config: &SdkConfig) -> Result<GatewayClient<ReqwestTransport>, ErrorRecord> {
    let transport = ReqwestTransport::try_new(config)?;
    Ok(GatewayClient::new(transport))
}

fn parse_base_url(raw: &str) -> Result<Url, TransportBuildError> {
    let url = Url::parse(raw).map_err(|source| TransportBuildError::UrlParse {
        context: "Failed to parse gateway base URL",
        source,
    })?;
    if url.cannot_be_a_base() {
        return Err(TransportBuildError::CannotBeABase(raw.to_owned()));
    }
    Ok(url)
}

fn send_failure(err: reqwest::Error) -> TransportFailure {
    if err.is_builder() {
        TransportFailure::Unexpected {
            message: Some(err.to_string()),
        }
    } else {
        TransportFailure::Network {
            message: err.to_string(),
        }
    }
}

/// Pairs a status with its body. A status line that arrived still counts
/// as a response when the body cannot be read; the body is then `Null`.
fn read_response<E: std::fmt::Display>(status: u16, text: Result<String, E>) -> TransportResponse {
    let body = match text {
        Ok(text) => parse_body(&text),
        Err(e) => {
            #[cfg(feature = "telemetry")]
            tracing::warn!(status, error = %e, "Failed to read response body");
            #[cfg(not(feature = "telemetry"))]
            let _ = e;
            Value::Null
        }
    };
    TransportResponse { status, body }
}

/// Parses a response body: empty is `Null`, non-JSON text is kept as a string.
fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardpay::ErrorKind;
    use cardpay::classify::{API_ERROR_MESSAGE, AUTHENTICATION_FAILED_MESSAGE};
    use cardpay::config::Environment;
    use cardpay::proto::{
        CardPayload, PaymentRequest, PaymentStatus, RefundRequest, RefundStatus, TransactionQuery,
    };
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: &str) -> SdkConfig {
        SdkConfig::new("sk_test_123", "m_1", Environment::Sandbox)
            .unwrap()
            .with_base_url(base_url)
    }

    async fn client_for(server: &MockServer) -> GatewayClient<ReqwestTransport> {
        connect(&config(&format!("{}/v1", server.uri()))).unwrap()
    }

    fn payment_request() -> PaymentRequest {
        PaymentRequest {
            amount: 4999,
            currency: "XCD".into(),
            source_id: None,
            destination_id: None,
            order_id: None,
            description: None,
            metadata: None,
            card: CardPayload {
                number: "4111111111111111".into(),
                expiry_month: "12".into(),
                expiry_year: "30".into(),
                cvc: "123".into(),
                holder_name: "Jane Doe".into(),
            },
        }
    }

    #[test]
    fn test_endpoint_joins_paths() {
        let transport = ReqwestTransport::try_new(&config("https://api.example/v1/")).unwrap();
        assert_eq!(
            transport.endpoint("/payments", &[]).as_str(),
            "https://api.example/v1/payments"
        );
        assert_eq!(
            transport
                .endpoint(
                    "/transactions",
                    &[("limit".into(), "5".into()), ("status".into(), "approved".into())]
                )
                .as_str(),
            "https://api.example/v1/transactions?limit=5&status=approved"
        );
        assert_eq!(
            transport.endpoint("/transactions/txn 1?x", &[]).as_str(),
            "https://api.example/v1/transactions/txn%201%3Fx"
        );
    }

    #[test]
    fn test_rejects_unusable_base_urls() {
        let err = ReqwestTransport::try_new(&config("not a url")).unwrap_err();
        assert!(matches!(err, TransportBuildError::UrlParse { .. }));

        let err = ReqwestTransport::try_new(&config("mailto:ops@example.com")).unwrap_err();
        assert!(matches!(err, TransportBuildError::CannotBeABase(_)));

        let err = connect(&config("not a url")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_rejects_header_unsafe_credentials() {
        let config = SdkConfig::new("sk_test\n123", "m_1", Environment::Sandbox).unwrap();
        let err = ReqwestTransport::try_new(&config).unwrap_err();
        assert!(matches!(
            err,
            TransportBuildError::InvalidHeader {
                name: "Authorization",
                ..
            }
        ));
    }

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body(""), Value::Null);
        assert_eq!(parse_body("  \n"), Value::Null);
        assert_eq!(parse_body(r#"{"a":1}"#), json!({"a": 1}));
        assert_eq!(parse_body("Bad Gateway"), json!("Bad Gateway"));
    }

    #[test]
    fn test_unreadable_body_keeps_status() {
        let response = read_response(502, Err("connection reset"));
        assert_eq!(response.status, 502);
        assert_eq!(response.body, Value::Null);

        let response = read_response::<&str>(200, Ok(r#"{"id":"txn_1"}"#.to_owned()));
        assert_eq!(response.status, 200);
        assert_eq!(response.body, json!({"id": "txn_1"}));
    }

    #[tokio::test]
    async fn test_process_payment_sends_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/payments"))
            .and(header("authorization", "Bearer sk_test_123"))
            .and(header("x-merchant-id", "m_1"))
            .and(body_partial_json(json!({
                "amount": 4999,
                "currency": "XCD",
                "card": {"number": "4111111111111111", "expiryMonth": "12", "expiryYear": "30"},
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "transactionId": "txn_1",
                "status": "approved",
                "amount": 4999,
                "currency": "XCD",
                "createdAt": "2026-10-16T12:00:00Z",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let response = client.process_payment(&payment_request()).await.unwrap();
        assert_eq!(response.transaction_id, "txn_1");
        assert_eq!(response.status, PaymentStatus::Approved);
    }

    #[tokio::test]
    async fn test_401_is_authentication() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/transactions/txn_1"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"message": "token expired"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .get_transaction("txn_1")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert_eq!(err.message(), AUTHENTICATION_FAILED_MESSAGE);
        assert_eq!(err.status_code(), Some(401));
    }

    #[tokio::test]
    async fn test_400_keeps_gateway_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/refunds"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "message": "refund exceeds captured amount",
                "errors": [{"field": "amount"}],
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .process_refund(&RefundRequest::full("txn_1").with_amount(10_000))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.message(), "refund exceeds captured amount");
        assert_eq!(err.details(), Some(&json!([{"field": "amount"}])));
    }

    #[tokio::test]
    async fn test_server_error_is_scoped_to_operation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/payments"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .process_payment(&payment_request())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PaymentProcessing);
        assert_eq!(err.message(), API_ERROR_MESSAGE);
        assert_eq!(err.status_code(), Some(502));
    }

    #[tokio::test]
    async fn test_list_transactions_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/transactions"))
            .and(query_param("limit", "2"))
            .and(query_param("status", "approved"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{
                    "id": "txn_1",
                    "status": "approved",
                    "amount": 100,
                    "currency": "XCD",
                    "createdAt": "2026-10-01T00:00:00Z",
                }],
                "total": 3,
                "limit": 2,
                "offset": 0,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let query = TransactionQuery::default()
            .with_limit(2)
            .with_status(PaymentStatus::Approved);
        let list = client_for(&server)
            .await
            .list_transactions(&query)
            .await
            .unwrap();
        assert_eq!(list.data.len(), 1);
        assert!(list.has_more());
    }

    #[tokio::test]
    async fn test_refund_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/refunds"))
            .and(body_partial_json(json!({"transactionId": "txn_1", "reason": "duplicate"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "refundId": "re_1",
                "transactionId": "txn_1",
                "status": "succeeded",
                "amount": 4999,
                "currency": "XCD",
                "createdAt": "2026-10-16T12:05:00Z",
            })))
            .mount(&server)
            .await;

        let refund = client_for(&server)
            .await
            .process_refund(&RefundRequest::full("txn_1").with_reason("duplicate"))
            .await
            .unwrap();
        assert_eq!(refund.refund_id, "re_1");
        assert_eq!(refund.status, RefundStatus::Succeeded);
    }

    #[tokio::test]
    async fn test_connection_refused_is_network() {
        let client = connect(&config("http://127.0.0.1:1/v1")).unwrap();
        let err = client.process_payment(&payment_request()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
        assert!(err.details().is_some());
    }
}
