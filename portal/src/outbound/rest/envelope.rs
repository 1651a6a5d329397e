//! Response envelope normalisation.
//!
//! List endpoints answer with a bare array, `{<key>: [...]}`, `{data: [...]}`,
//! or `{items: [...]}`. Single-entity endpoints answer with the bare object or
//! `{<key>: {...}}`. Anything else is a decode error.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::ports::GatewayError;

const FALLBACK_LIST_KEYS: [&str; 2] = ["data", "items"];

pub(crate) fn decode_list<T: DeserializeOwned>(
    body: &[u8],
    key: &str,
) -> Result<Vec<T>, GatewayError> {
    let items = match parse(body)? {
        Value::Array(items) => items,
        Value::Object(mut map) => std::iter::once(key)
            .chain(FALLBACK_LIST_KEYS)
            .find_map(|candidate| match map.remove(candidate) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .ok_or_else(|| {
                GatewayError::decode(format!(
                    "expected a list under `{key}`, `data`, or `items`"
                ))
            })?,
        other => {
            return Err(GatewayError::decode(format!(
                "expected a list, found {}",
                kind(&other)
            )));
        }
    };
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item).map_err(|err| {
                GatewayError::decode(format!("item {index} under `{key}`: {err}"))
            })
        })
        .collect()
}

pub(crate) fn decode_item<T: DeserializeOwned>(body: &[u8], key: &str) -> Result<T, GatewayError> {
    let value = match parse(body)? {
        Value::Object(mut map) => match map.remove(key) {
            Some(inner @ Value::Object(_)) => inner,
            Some(other) => {
                map.insert(key.to_owned(), other);
                Value::Object(map)
            }
            None => Value::Object(map),
        },
        other => {
            return Err(GatewayError::decode(format!(
                "expected an object, found {}",
                kind(&other)
            )));
        }
    };
    serde_json::from_value(value)
        .map_err(|err| GatewayError::decode(format!("`{key}` payload: {err}")))
}

/// Decode a list and map every DTO into its domain record.
pub(crate) fn decode_records<D, T>(body: &[u8], key: &str) -> Result<Vec<T>, GatewayError>
where
    D: DeserializeOwned,
    T: TryFrom<D, Error = String>,
{
    decode_list::<D>(body, key)?
        .into_iter()
        .enumerate()
        .map(|(index, dto)| {
            T::try_from(dto)
                .map_err(|err| GatewayError::decode(format!("item {index} under `{key}`: {err}")))
        })
        .collect()
}

/// Decode a single entity and map it into its domain record.
pub(crate) fn decode_record<D, T>(body: &[u8], key: &str) -> Result<T, GatewayError>
where
    D: DeserializeOwned,
    T: TryFrom<D, Error = String>,
{
    T::try_from(decode_item::<D>(body, key)?).map_err(GatewayError::decode)
}

fn parse(body: &[u8]) -> Result<Value, GatewayError> {
    serde_json::from_slice(body)
        .map_err(|err| GatewayError::decode(format!("invalid JSON payload: {err}")))
}

const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
