// Request body and path helpers

use crate::http::error::ApiError;
use crate::store::Entity;
use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::header,
    response::{IntoResponse, Response},
    Form,
};
use serde_json::{Map, Value};

/// Request body as entity fields, read according to its Content-Type:
///
/// - `application/json`: an object's fields. An empty body or valid JSON that
///   is not an object contributes no fields.
/// - `application/x-www-form-urlencoded`: each pair becomes a string field,
///   in order, the last of a repeated key winning.
/// - anything else, or no Content-Type: no fields.
pub struct Payload(pub Entity);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    Json,
    Form,
    Ignored,
}

impl BodyFormat {
    /// Media type essence only; parameters such as `charset` are ignored
    pub fn from_content_type(value: Option<&str>) -> Self {
        let essence = value
            .and_then(|v| v.split(';').next())
            .map(|v| v.trim().to_ascii_lowercase());
        match essence.as_deref() {
            Some("application/json") => BodyFormat::Json,
            Some("application/x-www-form-urlencoded") => BodyFormat::Form,
            _ => BodyFormat::Ignored,
        }
    }
}

#[async_trait]
impl<S> FromRequest<S> for Payload
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok());

        // Body-limit rejections keep their own status (413)
        match BodyFormat::from_content_type(content_type) {
            BodyFormat::Json => {
                let bytes = Bytes::from_request(req, state)
                    .await
                    .map_err(IntoResponse::into_response)?;
                parse_payload(&bytes)
                    .map(Payload)
                    .map_err(IntoResponse::into_response)
            }
            BodyFormat::Form => {
                let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                    .await
                    .map_err(IntoResponse::into_response)?;
                Ok(Payload(form_fields(pairs)))
            }
            BodyFormat::Ignored => Ok(Payload(Entity::new())),
        }
    }
}

/// Keys are taken literally, `plan[tier]` stays one flat field
pub fn form_fields(pairs: Vec<(String, String)>) -> Entity {
    let mut fields = Map::new();
    for (key, value) in pairs {
        fields.insert(key, Value::String(value));
    }
    Entity::from(fields)
}

pub fn parse_payload(bytes: &[u8]) -> Result<Entity, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Entity::new());
    }

    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => Ok(Entity::from(map)),
        Ok(_) => Ok(Entity::new()),
        Err(err) => Err(ApiError::BadRequest(format!("Invalid JSON body: {}", err))),
    }
}

/// Percent-decode a path identifier, keeping the raw text if it does not
/// decode to valid UTF-8
pub fn decode_identifier(raw: &str) -> String {
    urlencoding::decode(raw)
        .unwrap_or_else(|_| raw.into())
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body_is_empty_object() {
        assert!(parse_payload(b"").unwrap().is_empty());
        assert!(parse_payload(b"  \n").unwrap().is_empty());
    }

    #[test]
    fn test_object_body() {
        let entity = parse_payload(br#"{"name":"Ann","age":30}"#).unwrap();
        assert_eq!(entity.name(), Some("Ann"));
        assert_eq!(entity.len(), 2);
    }

    #[test]
    fn test_non_object_body_has_no_fields() {
        assert!(parse_payload(b"[1,2]").unwrap().is_empty());
        assert!(parse_payload(b"\"Ann\"").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_body_is_bad_request() {
        assert!(matches!(parse_payload(b"{name:"), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_body_format_from_content_type() {
        assert_eq!(BodyFormat::from_content_type(Some("application/json")), BodyFormat::Json);
        assert_eq!(
            BodyFormat::from_content_type(Some("Application/JSON; charset=utf-8")),
            BodyFormat::Json
        );
        assert_eq!(
            BodyFormat::from_content_type(Some("application/x-www-form-urlencoded")),
            BodyFormat::Form
        );
        assert_eq!(BodyFormat::from_content_type(Some("text/plain")), BodyFormat::Ignored);
        assert_eq!(BodyFormat::from_content_type(None), BodyFormat::Ignored);
    }

    #[test]
    fn test_form_fields_keep_order_and_last_duplicate() {
        let entity = form_fields(vec![
            ("name".to_string(), "Ann Lee".to_string()),
            ("status".to_string(), "active".to_string()),
            ("status".to_string(), "inactive".to_string()),
            ("plan[tier]".to_string(), "gold".to_string()),
        ]);

        assert_eq!(entity.keys(), vec!["name", "status", "plan[tier]"]);
        assert_eq!(entity.get_str("status"), Some("inactive"));
        assert_eq!(entity.get_str("plan[tier]"), Some("gold"));
    }

    #[test]
    fn test_decode_identifier() {
        assert_eq!(decode_identifier("Ann%20Lee"), "Ann Lee");
        assert_eq!(decode_identifier("plain"), "plain");
        assert_eq!(decode_identifier("%FF"), "%FF");
    }
}
