// Simulation configuration

use crate::consensus::{Target, DEFAULT_DIFFICULTY_BITS};
use serde::{Deserialize, Serialize};

/// Settings shared by every node in a network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Leading zero bits a block hash needs; 0 accepts the first nonce tried
    pub difficulty_bits: u32,
}

impl NetworkConfig {
    pub fn with_difficulty(difficulty_bits: u32) -> Self {
        Self { difficulty_bits }
    }

    /// Mining target derived from the difficulty
    pub fn target(&self) -> Target {
        Target::from_leading_zero_bits(self.difficulty_bits)
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            difficulty_bits: DEFAULT_DIFFICULTY_BITS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = NetworkConfig::default();
        assert_eq!(config.difficulty_bits, 8);
        assert_eq!(config.target(), Target::default());
    }

    #[test]
    fn test_config_from_json() {
        let config: NetworkConfig = serde_json::from_str(r#"{"difficulty_bits": 4}"#).unwrap();
        assert_eq!(config, NetworkConfig::with_difficulty(4));

        // Missing fields fall back to defaults
        let config: NetworkConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, NetworkConfig::default());
    }
}
