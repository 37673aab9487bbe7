//! Decoded trade events
//!
//! A `SwapEvent` is the Uniswap-V2 style `Swap` log emitted by the monitored
//! pool. The engine only consumes decoded events; `from_log` is provided for
//! adapters that receive raw logs.

use alloy_primitives::{b256, Address, B256, U256};
use serde::{Deserialize, Serialize};

use crate::error::{CampaignError, CampaignResult};
use crate::identity::UserAddress;

/// `keccak256("Swap(address,uint256,uint256,uint256,uint256,address)")`
pub const SWAP_EVENT_TOPIC: B256 =
    b256!("d78ad95fa46c994b6551d0da85fc275fe613ce37657fb8d5e3d130840159d822");

const WORD: usize = 32;

/// A swap through the monitored pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapEvent {
    pub sender: Address,
    pub amount0_in: U256,
    pub amount1_in: U256,
    pub amount0_out: U256,
    pub amount1_out: U256,
    pub block_number: u64,
    pub tx_hash: B256,
}

impl SwapEvent {
    /// Decode a raw `Swap` log.
    ///
    /// `topics[1]` holds the indexed sender; `data` holds four 32-byte
    /// big-endian words: `amount0In, amount1In, amount0Out, amount1Out`.
    pub fn from_log(
        topics: &[B256],
        data: &[u8],
        block_number: u64,
        tx_hash: B256,
    ) -> CampaignResult<Self> {
        match topics.first() {
            Some(topic) if *topic == SWAP_EVENT_TOPIC => {}
            Some(topic) => {
                return Err(CampaignError::InvalidEvent(format!(
                    "unexpected topic {}",
                    topic
                )))
            }
            None => return Err(CampaignError::InvalidEvent("missing topics".to_string())),
        }

        let sender_topic = topics
            .get(1)
            .ok_or_else(|| CampaignError::InvalidEvent("missing sender topic".to_string()))?;

        if data.len() < 4 * WORD {
            return Err(CampaignError::InvalidEvent(format!(
                "data too short: {} bytes",
                data.len()
            )));
        }

        let word = |i: usize| U256::from_be_slice(&data[i * WORD..(i + 1) * WORD]);

        Ok(Self {
            sender: Address::from_slice(&sender_topic.as_slice()[12..]),
            amount0_in: word(0),
            amount1_in: word(1),
            amount0_out: word(2),
            amount1_out: word(3),
            block_number,
            tx_hash,
        })
    }

    /// The normalized user identifier of the sender
    pub fn user(&self) -> UserAddress {
        UserAddress::from(self.sender)
    }
}
