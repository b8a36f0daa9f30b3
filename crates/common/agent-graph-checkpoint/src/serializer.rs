//! Binary encoding for stored checkpoint state.
//!
//! Savers keep state as MessagePack bytes rather than live values so a
//! snapshot can never be mutated through a shared reference after the write.

use serde::{Serialize, de::DeserializeOwned};

use crate::error::Result;

/// Encode a value as named-field MessagePack.
pub fn dumps<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    Ok(rmp_serde::to_vec_named(value)?)
}

/// Decode a value previously written with [`dumps`].
pub fn loads<T: DeserializeOwned>(data: &[u8]) -> Result<T> {
    Ok(rmp_serde::from_slice(data)?)
}
