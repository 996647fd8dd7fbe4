use serde::Serialize;

use crate::error::LookupError;

pub fn to_pretty<T: Serialize>(value: &T) -> Result<String, LookupError> {
    Ok(serde_json::to_string_pretty(value)?)
}
