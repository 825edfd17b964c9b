//! Text encodings for binary payloads embedded in client config files.

pub mod byte_array;

pub use byte_array::{decode as decode_byte_array, encode as encode_byte_array, ByteArrayLiteral};
