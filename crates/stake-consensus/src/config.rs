//! Consensus parameters

use crate::domain::{ConsensusError, ConsensusResult};
use serde::Deserialize;

/// Blocks a coinbase output must wait before it may be staked.
pub const COINBASE_MATURITY: u64 = 100;

/// Network consensus parameters
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ConsensusParams {
    /// Depth a coinbase must reach, measured from the parent of the
    /// staking block, before its outputs may be staked.
    pub coinbase_maturity: u64,

    /// Hard-coded activation height. When set, the activation gate starts
    /// latched at this height and the configuration channel is ignored.
    pub first_mandatory_stake_height: Option<u64>,
}

impl Default for ConsensusParams {
    fn default() -> Self {
        Self {
            coinbase_maturity: COINBASE_MATURITY,
            first_mandatory_stake_height: None,
        }
    }
}

impl ConsensusParams {
    /// Parse and validate parameters from JSON. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> ConsensusResult<Self> {
        let params: ConsensusParams = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> ConsensusResult<()> {
        if self.coinbase_maturity == 0 {
            return Err(ConsensusError::InvalidParams(
                "coinbase_maturity must be positive".into(),
            ));
        }
        if self.first_mandatory_stake_height == Some(u64::MAX) {
            return Err(ConsensusError::InvalidParams(
                "first_mandatory_stake_height must be below u64::MAX".into(),
            ));
        }
        Ok(())
    }
}
