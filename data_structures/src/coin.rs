use std::fmt;
use std::iter::Sum;

use serde::{Deserialize, Serialize};

/// 1 unit is the minimal amount of value
/// 1 coin = 10^8 units
pub const UNITS_PER_COIN: u64 = 100_000_000;
// 10 ^ COIN_DECIMAL_PLACES
/// Number of decimal places used in the string representation of a coin value.
pub const COIN_DECIMAL_PLACES: u8 = 8;

/// Unit of value
#[derive(
    Clone, Copy, Debug, Deserialize, Default, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize,
)]
pub struct Coin(u64);

impl Coin {
    /// Create from whole coins
    #[inline]
    pub fn from_coins(coins: u64) -> Self {
        Self(coins.checked_mul(UNITS_PER_COIN).expect("overflow"))
    }

    /// Create from base units
    #[inline]
    pub fn from_units(units: u64) -> Self {
        Self(units)
    }

    /// Retrieve the base unit value within.
    #[inline]
    pub fn units(self) -> u64 {
        self.0
    }

    /// Checked addition, `None` on overflow
    #[inline]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Return integer and fractional part, useful for pretty printing
    pub fn coins_and_units(self) -> (u64, u64) {
        let units = self.0;
        let amount_coins = units / UNITS_PER_COIN;
        let amount_units = units % UNITS_PER_COIN;

        (amount_coins, amount_units)
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (amount_coins, amount_units) = self.coins_and_units();
        let width = usize::from(COIN_DECIMAL_PLACES);

        write!(f, "{}.{:0width$}", amount_coins, amount_units, width = width)
    }
}

impl std::ops::Add for Coin {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.units() + rhs.units())
    }
}

impl std::ops::Sub for Coin {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.units() - rhs.units())
    }
}

impl Sum for Coin {
    fn sum<I: Iterator<Item = Coin>>(iter: I) -> Self {
        iter.fold(Coin(0), std::ops::Add::add)
    }
}

impl num_traits::Zero for Coin {
    #[inline]
    fn zero() -> Self {
        Coin(0)
    }

    #[inline]
    fn is_zero(&self) -> bool {
        matches!(self, &Coin(0))
    }
}
