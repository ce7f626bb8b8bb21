use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Decimal payout of a standard -110 line: 1.91 returned per unit staked.
pub const STANDARD_DECIMAL_ODDS: f64 = 1.91;

/// Units won per unit staked at -110.
pub const PAYOUT_PER_UNIT: Decimal = dec!(0.91);

/// Expected value per unit staked when `probability` is the true win chance
/// and the bet pays standard -110 odds.
pub fn expected_value(probability: f64) -> f64 {
    probability * STANDARD_DECIMAL_ODDS - 1.0
}

/// Fair American odds for a win probability in (0, 1).
///
/// Favourites (p > 0.5) get negative odds, everything else positive.
pub fn fair_american_odds(probability: f64) -> i32 {
    let p = probability.clamp(0.01, 0.99);
    let odds = if p > 0.5 {
        (-100.0 * p) / (1.0 - p)
    } else {
        100.0 * (1.0 - p) / p
    };
    odds.round() as i32
}
