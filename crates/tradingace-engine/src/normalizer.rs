//! Trade amount normalization
//!
//! Only the reference-token side of the pool is read. Its "in" leg wins when
//! positive, otherwise its "out" leg; legs of the other side are ignored.

use alloy_primitives::U256;
use rust_decimal::Decimal;

use tradingace_types::{CampaignError, CampaignResult, RewardRules, SwapEvent, TokenSide};

/// Maximum scale supported by `Decimal`
const MAX_DECIMALS: u32 = 28;

/// Convert a swap into a decimal amount of the reference token.
///
/// Returns zero when neither reference leg is positive.
pub fn normalize_trade_amount(event: &SwapEvent, rules: &RewardRules) -> CampaignResult<Decimal> {
    let (leg_in, leg_out) = match rules.reference_side {
        TokenSide::Token0 => (event.amount0_in, event.amount0_out),
        TokenSide::Token1 => (event.amount1_in, event.amount1_out),
    };

    let raw = if !leg_in.is_zero() {
        leg_in
    } else if !leg_out.is_zero() {
        leg_out
    } else {
        return Ok(Decimal::ZERO);
    };

    if rules.token_decimals > MAX_DECIMALS {
        return Err(CampaignError::AmountOutOfRange(format!(
            "token decimals {} exceed {}",
            rules.token_decimals, MAX_DECIMALS
        )));
    }

    let out_of_range = || CampaignError::AmountOutOfRange(format!("{} (tx {})", raw, event.tx_hash));

    let mantissa = to_u128(raw)
        .and_then(|v| i128::try_from(v).ok())
        .ok_or_else(out_of_range)?;

    Decimal::try_from_i128_with_scale(mantissa, rules.token_decimals)
        .map(|d| d.normalize())
        .map_err(|_| out_of_range())
}

fn to_u128(value: U256) -> Option<u128> {
    let limbs = value.as_limbs();
    if limbs[2] != 0 || limbs[3] != 0 {
        return None;
    }
    Some(u128::from(limbs[0]) | (u128::from(limbs[1]) << 64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, B256};
    use rust_decimal_macros::dec;

    fn swap(a0_in: u64, a1_in: u64, a0_out: u64, a1_out: u64) -> SwapEvent {
        SwapEvent {
            sender: Address::ZERO,
            amount0_in: U256::from(a0_in),
            amount1_in: U256::from(a1_in),
            amount0_out: U256::from(a0_out),
            amount1_out: U256::from(a1_out),
            block_number: 1,
            tx_hash: B256::ZERO,
        }
    }

    #[test]
    fn test_in_leg_scaled_by_decimals() {
        let rules = RewardRules::default();
        let amount = normalize_trade_amount(&swap(5, 1_500_000_000, 0, 0), &rules).unwrap();
        assert_eq!(amount, dec!(1500));
    }

    #[test]
    fn test_out_leg_used_when_in_is_zero() {
        let rules = RewardRules::default();
        let amount = normalize_trade_amount(&swap(9, 0, 0, 250_500_000), &rules).unwrap();
        assert_eq!(amount, dec!(250.5));
    }

    #[test]
    fn test_zero_when_reference_side_is_empty() {
        let rules = RewardRules::default();
        let amount = normalize_trade_amount(&swap(1_000_000, 0, 2_000_000, 0), &rules).unwrap();
        assert_eq!(amount, Decimal::ZERO);
    }

    #[test]
    fn test_token0_reference_side_ignores_token1() {
        let rules = RewardRules {
            reference_side: TokenSide::Token0,
            token_decimals: 18,
            ..Default::default()
        };
        let amount =
            normalize_trade_amount(&swap(0, 7_000_000, 2_000_000_000_000_000_000, 0), &rules)
                .unwrap();
        assert_eq!(amount, dec!(2));
    }

    #[test]
    fn test_oversized_leg_is_rejected() {
        let mut event = swap(0, 0, 0, 0);
        event.amount1_in = U256::MAX;
        let err = normalize_trade_amount(&event, &RewardRules::default()).unwrap_err();
        assert!(matches!(err, CampaignError::AmountOutOfRange(_)));
    }
}
