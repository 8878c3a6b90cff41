#![forbid(unsafe_code)]

use serde::{Deserialize, Deserializer};

/// Reads an explicit JSON `null` as the empty string so it validates as missing.
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
