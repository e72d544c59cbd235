//! Firestore REST backend for user profiles.
//!
//! Profiles live in the `users` collection, one document per uid. The REST
//! API wraps every value in a typed envelope (`{"integerValue": "3"}`), so
//! profiles are converted through `serde_json::Value` on the way in and out.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Map, Number, Value};
use tracing::instrument;

use studyquiz_core::profile::UserProfile;
use studyquiz_core::traits::ProfileStore;

use crate::error::{validate_key, StoreError};

pub const DEFAULT_FIRESTORE_URL: &str = "https://firestore.googleapis.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const USERS_COLLECTION: &str = "users";

/// Top-level profile fields stored as Firestore timestamps.
const TIMESTAMP_FIELDS: &[&str] = &["lastLogin", "createdAt"];

/// Firestore documents API client.
pub struct FirestoreStore {
    documents_url: String,
    api_key: Option<String>,
    id_token: Option<String>,
    client: reqwest::Client,
}

impl FirestoreStore {
    pub fn new(
        project_id: &str,
        base_url: Option<String>,
        api_key: Option<String>,
        id_token: Option<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client");

        let base_url = base_url.unwrap_or_else(|| DEFAULT_FIRESTORE_URL.to_string());
        Self {
            documents_url: format!(
                "{}/v1/projects/{project_id}/databases/(default)/documents",
                base_url.trim_end_matches('/')
            ),
            api_key: api_key.filter(|k| !k.is_empty()),
            id_token: id_token.filter(|t| !t.is_empty()),
            client,
        }
    }

    fn request(&self, method: reqwest::Method, uid: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{USERS_COLLECTION}/{uid}", self.documents_url);
        let mut req = self.client.request(method, url);
        if let Some(key) = &self.api_key {
            req = req.query(&[("key", key)]);
        }
        if let Some(token) = &self.id_token {
            req = req.bearer_auth(token);
        }
        req
    }
}

#[async_trait]
impl ProfileStore for FirestoreStore {
    fn name(&self) -> &str {
        "firestore"
    }

    #[instrument(skip(self))]
    async fn get(&self, uid: &str) -> anyhow::Result<Option<UserProfile>> {
        validate_key(uid)?;
        let response = self
            .request(reqwest::Method::GET, uid)
            .send()
            .await
            .map_err(|e| StoreError::NetworkError(e.to_string()))?;

        let status = response.status().as_u16();
        if status == 404 {
            return Ok(None);
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::ApiError {
                status,
                message: body,
            }
            .into());
        }

        let document: Value = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok(Some(decode_document(&document)?))
    }

    #[instrument(skip(self, profile), fields(uid = %profile.uid))]
    async fn put(&self, profile: &UserProfile) -> anyhow::Result<()> {
        validate_key(&profile.uid)?;
        let body = encode_document(profile)?;

        let response = self
            .request(reqwest::Method::PATCH, &profile.uid)
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::NetworkError(e.to_string()))?;

        let status = response.status().as_u16();
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::ApiError {
                status,
                message: body,
            }
            .into());
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Value codec
// ---------------------------------------------------------------------------

/// Encode a profile as a Firestore document body (`{"fields": {...}}`).
pub fn encode_document(profile: &UserProfile) -> Result<Value, StoreError> {
    let plain = serde_json::to_value(profile).map_err(|e| StoreError::Decode(e.to_string()))?;
    let Value::Object(fields) = plain else {
        return Err(StoreError::Decode("profile is not an object".into()));
    };

    let fields: Map<String, Value> = fields
        .into_iter()
        .map(|(key, value)| {
            let encoded = match value {
                Value::String(s) if TIMESTAMP_FIELDS.contains(&key.as_str()) => {
                    json!({ "timestampValue": s })
                }
                other => encode_value(&other),
            };
            (key, encoded)
        })
        .collect();

    Ok(json!({ "fields": fields }))
}

/// Decode a Firestore document into a profile.
pub fn decode_document(document: &Value) -> Result<UserProfile, StoreError> {
    let fields = document
        .get("fields")
        .and_then(Value::as_object)
        .ok_or_else(|| StoreError::Decode("document has no fields".into()))?;
    let plain = decode_fields(fields)?;
    serde_json::from_value(plain).map_err(|e| StoreError::Decode(e.to_string()))
}

pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                json!({ "integerValue": i.to_string() })
            } else if let Some(u) = n.as_u64() {
                json!({ "integerValue": u.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64().unwrap_or_default() })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => {
            let fields: Map<String, Value> = map
                .iter()
                .map(|(k, v)| (k.clone(), encode_value(v)))
                .collect();
            json!({ "mapValue": { "fields": fields } })
        }
    }
}

pub fn decode_value(value: &Value) -> Result<Value, StoreError> {
    let Some((kind, inner)) = value.as_object().and_then(|o| o.iter().next()) else {
        return Err(StoreError::Decode(format!("not a typed value: {value}")));
    };

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" | "doubleValue" => Ok(inner.clone()),
        "stringValue" | "timestampValue" | "referenceValue" => Ok(inner.clone()),
        "integerValue" => {
            let n = match inner {
                Value::String(s) => s
                    .parse::<i64>()
                    .map_err(|e| StoreError::Decode(format!("bad integerValue {s:?}: {e}")))?,
                Value::Number(n) => n
                    .as_i64()
                    .ok_or_else(|| StoreError::Decode(format!("bad integerValue {n}")))?,
                other => return Err(StoreError::Decode(format!("bad integerValue {other}"))),
            };
            Ok(Value::Number(Number::from(n)))
        }
        "arrayValue" => {
            let items = inner
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().map(decode_value).collect::<Result<Vec<_>, _>>())
                .transpose()?
                .unwrap_or_default();
            Ok(Value::Array(items))
        }
        "mapValue" => match inner.get("fields").and_then(Value::as_object) {
            Some(fields) => decode_fields(fields),
            None => Ok(Value::Object(Map::new())),
        },
        other => Err(StoreError::Decode(format!("unsupported value type: {other}"))),
    }
}

fn decode_fields(fields: &Map<String, Value>) -> Result<Value, StoreError> {
    fields
        .iter()
        .map(|(k, v)| Ok((k.clone(), decode_value(v)?)))
        .collect::<Result<Map<_, _>, StoreError>>()
        .map(Value::Object)
}
