use actix_web::{FromRequest, web};
use futures_util::future::LocalBoxFuture;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize, de::Deserializer};
use validator::Validate;

use crate::api::error;

/// Claims of an access token issued by the external identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: uuid::Uuid,
    pub exp: u64,
    #[serde(default)]
    pub iat: Option<u64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl Claims {
    pub fn decode(token: &str, secret: &[u8]) -> Result<Self, error::SystemError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        let token_data = decode::<Self>(token, &DecodingKey::from_secret(secret), &validation)?;
        Ok(token_data.claims)
    }

    /// Lowercased email of the caller, required by the friend request flow.
    pub fn require_email(&self) -> Result<String, error::SystemError> {
        self.email
            .as_deref()
            .map(normalize_email)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| error::SystemError::bad_request("Token does not carry an email"))
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Strips surrounding whitespace while deserializing, so validators see the
/// value the service works with.
pub fn trimmed<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(de).map(|s| s.trim().to_string())
}

pub fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}

pub struct ValidatedJson<T>(pub T);

impl<T> FromRequest for ValidatedJson<T>
where
    T: Validate + serde::de::DeserializeOwned + 'static,
{
    type Error = error::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        let fut = web::Json::<T>::from_request(req, payload);

        Box::pin(async move {
            let json = fut.await.map_err(|e| error::Error::BadRequest(e.to_string().into()))?;
            let model = json.into_inner();
            model.validate().map_err(|e| error::Error::BadRequest(e.to_string().into()))?;
            Ok(ValidatedJson(model))
        })
    }
}

pub struct ValidatedQuery<T>(pub T);

impl<T> FromRequest for ValidatedQuery<T>
where
    T: Validate + serde::de::DeserializeOwned + 'static,
{
    type Error = error::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        let fut = web::Query::<T>::from_request(req, payload);

        Box::pin(async move {
            let query = fut.await.map_err(|e| error::Error::BadRequest(e.to_string().into()))?;
            query.validate().map_err(|e| error::Error::BadRequest(e.to_string().into()))?;
            Ok(ValidatedQuery(query.into_inner()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    const SECRET: &[u8] = b"test-secret";

    fn token(claims: &serde_json::Value, secret: &[u8]) -> String {
        encode(&Header::new(Algorithm::HS256), claims, &EncodingKey::from_secret(secret)).unwrap()
    }

    fn future_exp() -> u64 {
        chrono::Utc::now().timestamp() as u64 + 600
    }

    #[test]
    fn decodes_identity_provider_token() {
        let sub = uuid::Uuid::new_v4();
        let raw = serde_json::json!({
            "sub": sub,
            "exp": future_exp(),
            "aud": "authenticated",
            "email": "Reader@Example.com",
            "role": "authenticated",
        });

        let claims = Claims::decode(&token(&raw, SECRET), SECRET).unwrap();
        assert_eq!(claims.sub, sub);
        assert_eq!(claims.role.as_deref(), Some("authenticated"));
        assert_eq!(claims.require_email().unwrap(), "reader@example.com");
    }

    #[test]
    fn rejects_wrong_secret_and_expired_tokens() {
        let sub = uuid::Uuid::new_v4();
        let valid = serde_json::json!({ "sub": sub, "exp": future_exp() });
        assert!(Claims::decode(&token(&valid, b"other"), SECRET).is_err());

        let expired = serde_json::json!({ "sub": sub, "exp": 1_000u64 });
        assert!(Claims::decode(&token(&expired, SECRET), SECRET).is_err());
    }

    #[derive(Deserialize, Validate)]
    struct Lookup {
        #[serde(deserialize_with = "trimmed")]
        #[validate(length(min = 3))]
        term: String,
    }

    #[test]
    fn trimmed_fields_are_validated_without_padding() {
        let lookup: Lookup = serde_json::from_str(r#"{"term": "  a  "}"#).unwrap();
        assert_eq!(lookup.term, "a");
        assert!(lookup.validate().is_err());

        let lookup: Lookup = serde_json::from_str(r#"{"term": " abc "}"#).unwrap();
        assert!(lookup.validate().is_ok());
    }

    #[test]
    fn missing_email_is_a_bad_request() {
        let claims =
            Claims { sub: uuid::Uuid::new_v4(), exp: 0, iat: None, email: None, role: None };
        assert!(matches!(claims.require_email(), Err(error::SystemError::BadRequest(_))));
    }
}
