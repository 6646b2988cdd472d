//! HTTP-surface authentication
//!
//! The generic [`AuthenticationManager`](super::AuthenticationManager) stack is
//! strategy-parameterised for arbitrary transports; the HTTP connection manager
//! only ever needs "is this request allowed in" decided from headers and query
//! parameters, so this module exposes that narrower contract directly.

use std::collections::HashMap;

use async_trait::async_trait;
use axum::http::HeaderMap;

use super::strategies::apikey::types::{ApiKeyRequest, ApiKeySource};
use super::strategies::apikey::validator::ApiKeyValidator;

/// Outcome of authenticating one HTTP request.
#[derive(Debug, Clone, Default)]
pub struct HttpAuthResult {
    pub succeeded: bool,
    pub user_id: Option<String>,
    pub claims: HashMap<String, String>,
    pub failure_reason: Option<String>,
}

impl HttpAuthResult {
    pub fn success(user_id: impl Into<String>) -> Self {
        Self {
            succeeded: true,
            user_id: Some(user_id.into()),
            claims: HashMap::new(),
            failure_reason: None,
        }
    }

    pub fn anonymous() -> Self {
        Self {
            succeeded: true,
            user_id: None,
            claims: HashMap::new(),
            failure_reason: None,
        }
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            user_id: None,
            claims: HashMap::new(),
            failure_reason: Some(reason.into()),
        }
    }
}

/// Pluggable authentication for the SSE connect and message-POST entry points.
#[async_trait]
pub trait HttpAuthenticator: Send + Sync {
    async fn authenticate(&self, headers: &HeaderMap, query: &HashMap<String, String>) -> HttpAuthResult;
}

/// Always succeeds with an anonymous identity.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoneAuthenticator;

#[async_trait]
impl HttpAuthenticator for NoneAuthenticator {
    async fn authenticate(&self, _headers: &HeaderMap, _query: &HashMap<String, String>) -> HttpAuthResult {
        HttpAuthResult::anonymous()
    }
}

/// Looks for a key on a configured header (default `X-API-Key`), falling back
/// to a query parameter of the same name, and validates it against an
/// [`ApiKeyValidator`].
pub struct ApiKeyAuthenticator {
    header_name: String,
    query_param: String,
    validator: Box<dyn ApiKeyValidator>,
}

impl ApiKeyAuthenticator {
    pub fn new(validator: impl ApiKeyValidator + 'static) -> Self {
        Self {
            header_name: "X-API-Key".to_string(),
            query_param: "api_key".to_string(),
            validator: Box::new(validator),
        }
    }

    pub fn with_header_name(mut self, header_name: impl Into<String>) -> Self {
        self.header_name = header_name.into();
        self
    }

    pub fn with_query_param(mut self, query_param: impl Into<String>) -> Self {
        self.query_param = query_param.into();
        self
    }

    fn extract(&self, headers: &HeaderMap, query: &HashMap<String, String>) -> Option<(String, ApiKeySource)> {
        if let Some(value) = headers.get(self.header_name.as_str()).and_then(|v| v.to_str().ok()) {
            return Some((value.to_string(), ApiKeySource::Header(self.header_name.clone())));
        }
        if let Some(value) = query.get(&self.query_param) {
            return Some((value.clone(), ApiKeySource::QueryParameter(self.query_param.clone())));
        }
        None
    }
}

#[async_trait]
impl HttpAuthenticator for ApiKeyAuthenticator {
    async fn authenticate(&self, headers: &HeaderMap, query: &HashMap<String, String>) -> HttpAuthResult {
        let Some((api_key, source)) = self.extract(headers, query) else {
            return HttpAuthResult::failure("missing API key");
        };

        let request = ApiKeyRequest {
            api_key,
            source,
            metadata: HashMap::new(),
        };

        match self.validator.validate_api_key(&request).await {
            Ok(context) => {
                let mut result = HttpAuthResult::success(context.auth_data.key_id.clone());
                result.claims.insert("auth_method".to_string(), context.method.as_str().to_string());
                result
            }
            Err(err) => HttpAuthResult::failure(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authentication::strategies::apikey::validator::{ApiKeyAuthData, InMemoryApiKeyValidator};
    use crate::authentication::{AuthContext, AuthMethod};

    #[tokio::test]
    async fn none_authenticator_always_succeeds_anonymously() {
        let auth = NoneAuthenticator;
        let result = auth.authenticate(&HeaderMap::new(), &HashMap::new()).await;
        assert!(result.succeeded);
        assert!(result.user_id.is_none());
    }

    #[tokio::test]
    async fn api_key_authenticator_rejects_missing_key() {
        let validator = InMemoryApiKeyValidator::new(HashMap::new());
        let auth = ApiKeyAuthenticator::new(validator);
        let result = auth.authenticate(&HeaderMap::new(), &HashMap::new()).await;
        assert!(!result.succeeded);
    }

    #[tokio::test]
    async fn api_key_authenticator_accepts_header_key() {
        let mut valid_keys = HashMap::new();
        valid_keys.insert(
            "secret".to_string(),
            AuthContext::new(
                AuthMethod::new("apikey"),
                ApiKeyAuthData {
                    key_id: "alice".to_string(),
                    source: ApiKeySource::Header("X-API-Key".to_string()),
                },
            ),
        );
        let validator = InMemoryApiKeyValidator::new(valid_keys);
        let auth = ApiKeyAuthenticator::new(validator);

        let mut headers = HeaderMap::new();
        headers.insert("X-API-Key", "secret".parse().unwrap());

        let result = auth.authenticate(&headers, &HashMap::new()).await;
        assert!(result.succeeded);
    }

    #[tokio::test]
    async fn api_key_authenticator_accepts_query_fallback() {
        let mut valid_keys = HashMap::new();
        valid_keys.insert(
            "secret".to_string(),
            AuthContext::new(
                AuthMethod::new("apikey"),
                ApiKeyAuthData {
                    key_id: "alice".to_string(),
                    source: ApiKeySource::QueryParameter("api_key".to_string()),
                },
            ),
        );
        let validator = InMemoryApiKeyValidator::new(valid_keys);
        let auth = ApiKeyAuthenticator::new(validator);

        let mut query = HashMap::new();
        query.insert("api_key".to_string(), "secret".to_string());

        let result = auth.authenticate(&HeaderMap::new(), &query).await;
        assert!(result.succeeded);
    }
}
