//! Czech koruna amounts.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An amount in Czech koruna (CZK), stored as `DECIMAL(10,2)`.
///
/// ```
/// use pandi_dorty_core::Czk;
///
/// let total = Czk::from_whole(190) * 3 + Czk::from_whole(100);
/// assert_eq!(total, Czk::from_whole(670));
/// assert_eq!(total.to_string(), "670 Kč");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Czk(Decimal);

impl Czk {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Whole crowns, the unit every catalog price is quoted in.
    #[must_use]
    pub fn from_whole(amount: i64) -> Self {
        Self(Decimal::from(amount))
    }

    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Czk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Kč", self.0.normalize())
    }
}

impl Add for Czk {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Mul<u32> for Czk {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self {
        Self(self.0 * Decimal::from(rhs))
    }
}

impl Sum for Czk {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Czk {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Czk {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        Ok(Self(<Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Czk {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
