use agora_core::Error;
use serde::{de::DeserializeOwned, Serialize};

/// Encode a value as a MessagePack map with field names kept.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, Error> {
    rmp_serde::to_vec_named(value).map_err(Error::codec)
}

/// Decode a MessagePack-encoded value back into `T`.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, Error> {
    rmp_serde::from_slice(bytes).map_err(Error::codec)
}

/// Decode into the dynamic `rmpv::Value` representation, used when the
/// top-level shape (service name) must be inspected before the payload
/// type is known.
pub fn decode_value(bytes: &[u8]) -> Result<rmpv::Value, Error> {
    rmpv::decode::read_value(&mut std::io::Cursor::new(bytes)).map_err(Error::codec)
}
