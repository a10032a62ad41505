//! API 密钥访问控制中间件。

use axum::extract::Extension;
use axum::http::{HeaderName, HeaderValue, Request};
use axum::{body::Body as AxumBody, middleware, response::Response};
use axum_extra::extract::TypedHeader;
use axum_extra::headers::{self, Header};
use std::sync::Arc;
use tracing::warn;

use crate::config::API_KEY_HEADER;
use crate::error::ApiError;

static X_API_KEY: HeaderName = HeaderName::from_static(API_KEY_HEADER);

#[derive(Debug)]
pub struct AccessConfig {
    pub api_key: String,
}

/// `x-api-key` 请求头。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XApiKey(pub String);

impl Header for XApiKey {
    fn name() -> &'static HeaderName {
        &X_API_KEY
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, headers::Error>
    where
        I: Iterator<Item = &'i HeaderValue>,
    {
        values
            .next()
            .map(|value| XApiKey(String::from_utf8_lossy(value.as_bytes()).into_owned()))
            .ok_or_else(headers::Error::invalid)
    }

    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        if let Ok(value) = HeaderValue::from_str(&self.0) {
            values.extend(std::iter::once(value));
        }
    }
}

/// 访问控制中间件：请求头必须与配置的密钥完全一致。
pub async fn api_key_middleware(
    Extension(access): Extension<Arc<AccessConfig>>,
    api_key: Option<TypedHeader<XApiKey>>,
    req: Request<AxumBody>,
    next: middleware::Next,
) -> Result<Response, ApiError> {
    if let Some(TypedHeader(XApiKey(key))) = api_key
        && is_authorized(&access, &key)
    {
        return Ok(next.run(req).await);
    }

    warn!(method = %req.method(), path = req.uri().path(), "rejected request without valid api key");
    Err(ApiError::Forbidden("Forbidden - Invalid API key".into()))
}

fn is_authorized(access: &AccessConfig, key: &str) -> bool {
    !key.is_empty() && key == access.api_key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_key_never_matches() {
        let access = AccessConfig {
            api_key: String::new(),
        };
        assert!(!is_authorized(&access, ""));
    }

    #[test]
    fn key_must_match_exactly() {
        let access = AccessConfig {
            api_key: "Galau-xyeik49w8ncw8jq".into(),
        };
        assert!(is_authorized(&access, "Galau-xyeik49w8ncw8jq"));
        assert!(!is_authorized(&access, "galau-xyeik49w8ncw8jq"));
        assert!(!is_authorized(&access, "Galau-xyeik49w8ncw8jq "));
    }

    #[test]
    fn header_decodes_first_value() {
        let values = [HeaderValue::from_static("abc")];
        let decoded = XApiKey::decode(&mut values.iter()).expect("decode");
        assert_eq!(decoded, XApiKey("abc".into()));
    }
}
