use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Length in bytes of an asset handle.
pub const ASSET_ID_LEN: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseIdError {
    #[error("account identifier must not be empty")]
    EmptyAccount,
    #[error("asset identifier must not be empty")]
    EmptyAsset,
    #[error("asset symbol '{0}' is longer than {ASSET_ID_LEN} bytes")]
    SymbolTooLong(String),
    #[error("asset symbol '{0}' contains non-printable characters")]
    InvalidSymbol(String),
}

/// Opaque identity of a party: sender, recipient or administrator.
///
/// The ledger never looks inside it beyond equality and ordering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Result<Self, ParseIdError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ParseIdError::EmptyAccount);
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AccountId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.trim())
    }
}

impl TryFrom<String> for AccountId {
    type Error = ParseIdError;

    fn try_from(id: String) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fixed-shape 32-byte handle of a fungible asset.
///
/// The textual form is either 64 hex characters carrying the raw bytes, or a
/// short printable symbol (`USDC`) stored right-padded with zero bytes.
/// `Display` prefers the symbol form whenever the bytes are one, so parsing
/// the rendered text always gives back the same handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssetId([u8; ASSET_ID_LEN]);

impl AssetId {
    pub const fn from_bytes(bytes: [u8; ASSET_ID_LEN]) -> Self {
        Self(bytes)
    }

    pub fn symbol(symbol: &str) -> Result<Self, ParseIdError> {
        if symbol.is_empty() {
            return Err(ParseIdError::EmptyAsset);
        }
        if symbol.len() > ASSET_ID_LEN {
            return Err(ParseIdError::SymbolTooLong(symbol.to_string()));
        }
        if !symbol.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(ParseIdError::InvalidSymbol(symbol.to_string()));
        }
        let mut bytes = [0u8; ASSET_ID_LEN];
        bytes[..symbol.len()].copy_from_slice(symbol.as_bytes());
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; ASSET_ID_LEN] {
        &self.0
    }

    fn as_symbol(&self) -> Option<&str> {
        let len = self.0.iter().position(|b| *b == 0).unwrap_or(ASSET_ID_LEN);
        let (symbol, padding) = self.0.split_at(len);
        if symbol.is_empty()
            || !padding.iter().all(|b| *b == 0)
            || !symbol.iter().all(|b| b.is_ascii_graphic())
        {
            return None;
        }
        std::str::from_utf8(symbol).ok()
    }
}

impl FromStr for AssetId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() == ASSET_ID_LEN * 2 {
            let mut bytes = [0u8; ASSET_ID_LEN];
            if hex::decode_to_slice(s, &mut bytes).is_ok() {
                return Ok(Self(bytes));
            }
        }
        Self::symbol(s)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_symbol() {
            Some(symbol) => f.write_str(symbol),
            None => f.write_str(&hex::encode(self.0)),
        }
    }
}

impl Serialize for AssetId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AssetId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Non-negative quantity of an asset.
///
/// Arithmetic is checked; callers decide what an overflow means.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u128);

impl Amount {
    pub const ZERO: Self = Self(0);
    pub const MAX: Self = Self(u128::MAX);

    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    pub const fn value(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

impl From<Amount> for u128 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
