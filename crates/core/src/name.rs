//! Collection name and key validation.

use crate::MAX_COLLECTION_NAME_LEN;
use crate::error::{Error, Result};

/// Returns true when a key cell is empty or whitespace-only.
///
/// Blank cells in the key column never occupy an index slot.
pub fn is_blank_key(key: &str) -> bool {
    key.trim().is_empty()
}

/// Validate a key supplied by a caller for a write.
pub fn validate_key(key: &str) -> Result<()> {
    if is_blank_key(key) {
        return Err(Error::InvalidKey("key must not be blank".to_string()));
    }
    Ok(())
}

/// Validate a collection name.
///
/// Names double as file names in the filesystem backend, so separators,
/// control characters and the relative path components are rejected.
pub fn validate_collection_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidCollectionName(
            "name must not be blank".to_string(),
        ));
    }
    if name.chars().count() > MAX_COLLECTION_NAME_LEN {
        return Err(Error::InvalidCollectionName(format!(
            "name exceeds {MAX_COLLECTION_NAME_LEN} characters"
        )));
    }
    if name == "." || name == ".." {
        return Err(Error::InvalidCollectionName(format!(
            "reserved name: {name}"
        )));
    }
    if let Some(c) = name
        .chars()
        .find(|c| *c == '/' || *c == '\\' || c.is_control())
    {
        return Err(Error::InvalidCollectionName(format!(
            "name contains forbidden character {c:?}"
        )));
    }
    Ok(())
}
