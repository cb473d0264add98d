use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Errors that can occur when parsing a principal string.
#[derive(Debug, thiserror::Error)]
pub enum PrincipalError {
    #[error("principal must start with '0x'")]
    InvalidPrefix,
    #[error("principal must be {expected} characters, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("principal payload is not valid hexadecimal")]
    InvalidHex(#[from] hex::FromHexError),
    #[error("principal payload must be exactly 20 bytes")]
    InvalidPayloadLength,
}

/// Number of raw bytes identifying a principal.
pub const PRINCIPAL_BYTES: usize = 20;
/// Expected string length of an encoded principal (`0x` + 40 hex chars).
pub const PRINCIPAL_STRING_LENGTH: usize = 2 + PRINCIPAL_BYTES * 2;

/// Encode raw principal bytes into the `0x`-prefixed lower-case hex form.
pub fn encode_principal(bytes: &[u8; PRINCIPAL_BYTES]) -> String {
    let mut encoded = String::with_capacity(PRINCIPAL_STRING_LENGTH);
    encoded.push_str("0x");
    encoded.push_str(&hex::encode(bytes));
    encoded
}

/// Decode a `0x`-prefixed principal string. Hex digits may be of either case.
pub fn decode_principal(principal: &str) -> Result<[u8; PRINCIPAL_BYTES], PrincipalError> {
    let Some(payload) = principal.strip_prefix("0x") else {
        return Err(PrincipalError::InvalidPrefix);
    };

    if principal.len() != PRINCIPAL_STRING_LENGTH {
        return Err(PrincipalError::InvalidLength {
            expected: PRINCIPAL_STRING_LENGTH,
            actual: principal.len(),
        });
    }

    let decoded = hex::decode(payload)?;

    decoded
        .try_into()
        .map_err(|_| PrincipalError::InvalidPayloadLength)
}

/// Authenticated caller identity.
///
/// The registry never inspects a principal beyond equality; authentication
/// happens before a principal value is constructed and handed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Principal(pub [u8; PRINCIPAL_BYTES]);

impl Principal {
    pub fn new(bytes: [u8; PRINCIPAL_BYTES]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PRINCIPAL_BYTES] {
        &self.0
    }
}

impl From<[u8; PRINCIPAL_BYTES]> for Principal {
    fn from(value: [u8; PRINCIPAL_BYTES]) -> Self {
        Principal(value)
    }
}

impl From<Principal> for String {
    fn from(value: Principal) -> Self {
        encode_principal(&value.0)
    }
}

impl TryFrom<String> for Principal {
    type Error = PrincipalError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for Principal {
    type Err = PrincipalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_principal(s.trim()).map(Principal)
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode_principal(&self.0))
    }
}
