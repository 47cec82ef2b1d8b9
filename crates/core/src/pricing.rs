use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Fixed-rate tax policy (IGV, 18%).
pub fn tax_rate() -> Decimal {
    Decimal::new(18, 2)
}

pub fn round2(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn tax(subtotal: Decimal) -> Decimal {
    round2(subtotal * tax_rate())
}

pub fn total(subtotal: Decimal) -> Decimal {
    round2(subtotal + tax(subtotal))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

pub fn breakdown(subtotal: Decimal) -> PriceBreakdown {
    PriceBreakdown { subtotal: round2(subtotal), tax: tax(subtotal), total: total(subtotal) }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{breakdown, tax, total};

    #[test]
    fn subtotal_1500_yields_tax_270_and_total_1770() {
        let subtotal = Decimal::new(1500, 0);
        assert_eq!(tax(subtotal), Decimal::new(27000, 2));
        assert_eq!(total(subtotal), Decimal::new(177000, 2));
    }

    #[test]
    fn zero_subtotal_yields_zero_tax_and_total() {
        let zero = breakdown(Decimal::ZERO);
        assert_eq!(zero.tax, Decimal::ZERO.round_dp(2));
        assert_eq!(zero.total, Decimal::ZERO.round_dp(2));
    }

    #[test]
    fn fractional_subtotals_round_half_away_from_zero() {
        // 1500.50 * 0.18 = 270.09
        let result = breakdown(Decimal::new(150050, 2));
        assert_eq!(result.tax, Decimal::new(27009, 2));
        assert_eq!(result.total, Decimal::new(177059, 2));
    }
}
