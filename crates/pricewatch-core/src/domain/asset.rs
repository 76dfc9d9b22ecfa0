use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Crypto assets the price service accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Asset {
    #[default]
    Bitcoin,
    Ethereum,
    Solana,
    Cardano,
    Dogecoin,
    Ripple,
    Polkadot,
    Litecoin,
    Chainlink,
    Stellar,
}

impl Asset {
    pub const ALL: [Self; 10] = [
        Self::Bitcoin,
        Self::Ethereum,
        Self::Solana,
        Self::Cardano,
        Self::Dogecoin,
        Self::Ripple,
        Self::Polkadot,
        Self::Litecoin,
        Self::Chainlink,
        Self::Stellar,
    ];

    /// Identifier sent on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bitcoin => "bitcoin",
            Self::Ethereum => "ethereum",
            Self::Solana => "solana",
            Self::Cardano => "cardano",
            Self::Dogecoin => "dogecoin",
            Self::Ripple => "ripple",
            Self::Polkadot => "polkadot",
            Self::Litecoin => "litecoin",
            Self::Chainlink => "chainlink",
            Self::Stellar => "stellar",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Bitcoin => "Bitcoin (BTC)",
            Self::Ethereum => "Ethereum (ETH)",
            Self::Solana => "Solana (SOL)",
            Self::Cardano => "Cardano (ADA)",
            Self::Dogecoin => "Dogecoin (DOGE)",
            Self::Ripple => "Ripple (XRP)",
            Self::Polkadot => "Polkadot (DOT)",
            Self::Litecoin => "Litecoin (LTC)",
            Self::Chainlink => "Chainlink (LINK)",
            Self::Stellar => "Stellar (XLM)",
        }
    }
}

impl Display for Asset {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Asset {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|asset| asset.as_str() == normalized)
            .ok_or(ValidationError::UnsupportedAsset { value: normalized })
    }
}
