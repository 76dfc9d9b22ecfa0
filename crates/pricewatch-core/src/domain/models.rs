use std::fmt::{Display, Formatter};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::validation::{validate_address, ValidationOutcome};
use crate::{Asset, UtcDateTime, ValidationError};

/// Validated price lookup input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    asset: Asset,
    notify_address: String,
}

impl LookupRequest {
    /// Builds a request from raw user input. The asset is checked against the
    /// supported set before the address is validated.
    pub fn parse(asset: &str, notify_address: &str) -> Result<Self, ValidationError> {
        let asset = asset.parse::<Asset>()?;
        Self::new(asset, notify_address)
    }

    pub fn new(asset: Asset, notify_address: &str) -> Result<Self, ValidationError> {
        match validate_address(notify_address) {
            ValidationOutcome::Valid => Ok(Self {
                asset,
                notify_address: notify_address.trim().to_owned(),
            }),
            ValidationOutcome::Invalid(reason) => Err(ValidationError::InvalidAddress { reason }),
        }
    }

    pub const fn asset(&self) -> Asset {
        self.asset
    }

    pub fn notify_address(&self) -> &str {
        &self.notify_address
    }

    /// JSON body for `POST /crypto/price`.
    pub fn to_wire(&self) -> serde_json::Value {
        serde_json::json!({
            "cryptocurrency": self.asset.as_str(),
            "email": self.notify_address,
        })
    }
}

/// Successful price lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupResult {
    pub asset: String,
    pub price: f64,
    pub change_24h: f64,
    pub retrieved_at: UtcDateTime,
}

impl LookupResult {
    pub fn new(
        asset: impl Into<String>,
        price: f64,
        change_24h: f64,
        retrieved_at: UtcDateTime,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("price", price)?;
        validate_finite("change_24h", change_24h)?;

        Ok(Self {
            asset: asset.into(),
            price,
            change_24h,
            retrieved_at,
        })
    }

    /// Decodes the `data` object of a successful price response. The requested
    /// asset fills in when the server omits `cryptocurrency`.
    pub fn from_wire(data: serde_json::Value, requested: Asset) -> Result<Self, LookupDecodeError> {
        let payload: PricePayload = serde_json::from_value(data)?;
        let asset = payload
            .cryptocurrency
            .unwrap_or_else(|| requested.as_str().to_owned());
        let result = Self::new(
            asset,
            payload.price,
            payload.change_24h.unwrap_or(0.0),
            UtcDateTime::now(),
        )?;
        Ok(result)
    }
}

/// Why a success-flagged price payload could not be turned into a [`LookupResult`].
#[derive(Debug, thiserror::Error)]
pub enum LookupDecodeError {
    #[error(transparent)]
    Shape(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

#[derive(Debug, Deserialize)]
struct PricePayload {
    #[serde(default)]
    cryptocurrency: Option<String>,
    price: f64,
    #[serde(default, rename = "change24h")]
    change_24h: Option<f64>,
}

/// Opaque server-assigned history id. String and numeric ids are both kept
/// as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct EntryId(String);

impl EntryId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for EntryId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<EntryId> for String {
    fn from(value: EntryId) -> Self {
        value.0
    }
}

/// Row-level identity used when rendering or diffing history.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntryKey<'a> {
    Id(&'a EntryId),
    Position(usize),
}

/// One past lookup as reported by the server. A field that is missing or
/// not in a recognised shape is `None`; it never fails the entry or the
/// sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(
        default,
        deserialize_with = "lenient_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<EntryId>,
    #[serde(default, rename = "cryptocurrency", deserialize_with = "lenient_text")]
    pub asset: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub price: Option<f64>,
    #[serde(default, rename = "change24h", deserialize_with = "lenient_number")]
    pub change_24h: Option<f64>,
    #[serde(default, rename = "email", deserialize_with = "lenient_text")]
    pub notify_address: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub timestamp: Option<UtcDateTime>,
}

impl HistoryEntry {
    /// Id when present, otherwise the entry's position in the server sequence.
    pub fn key(&self, index: usize) -> EntryKey<'_> {
        match &self.id {
            Some(id) => EntryKey::Id(id),
            None => EntryKey::Position(index),
        }
    }

    /// Decodes the `data` field of a history response; `null` means empty.
    pub fn decode_sequence(data: serde_json::Value) -> Result<Vec<Self>, serde_json::Error> {
        if data.is_null() {
            return Ok(Vec::new());
        }
        serde_json::from_value(data)
    }
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<EntryId>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => Some(EntryId(text)),
        Some(Value::Number(number)) => Some(EntryId(number.to_string())),
        _ => None,
    })
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => Some(text),
        _ => None,
    })
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(Value::as_f64)
        .filter(|number| number.is_finite()))
}

/// RFC3339 text or epoch milliseconds (fractional millis are truncated).
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<UtcDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let timestamp = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => UtcDateTime::parse(&text).ok(),
        Some(Value::Number(number)) => number
            .as_i64()
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|millis| millis.is_finite())
                    .map(|millis| millis.trunc() as i64)
            })
            .and_then(|millis| UtcDateTime::from_unix_millis(millis).ok()),
        _ => None,
    };
    Ok(timestamp)
}

fn validate_finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    Ok(())
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    validate_finite(field, value)?;
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}
