//! Product catalog and payment rules.
//!
//! Prices are in whole crowns. Sweets are sold in units of 100 g.

use serde::Serialize;

use crate::types::{ChristmasSweets, Czk, OrderShapeError, SweetLine};

/// A Christmas sweet offered in the seasonal catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sweet {
    pub id: &'static str,
    pub name: &'static str,
    pub price_per_100g: i64,
    pub approx_pieces_per_100g: u32,
}

impl Sweet {
    /// Name of the form field carrying this sweet's quantity.
    #[must_use]
    pub fn quantity_field(&self) -> String {
        format!("quantity_{}", self.id)
    }

    #[must_use]
    pub fn line(&self, quantity: u32) -> SweetLine {
        SweetLine {
            sweet_id: self.id.to_owned(),
            name: self.name.to_owned(),
            quantity,
            price_per_100g: Czk::from_whole(self.price_per_100g),
        }
    }
}

const fn sweet(id: &'static str, name: &'static str, price: i64, pieces: u32) -> Sweet {
    Sweet {
        id,
        name,
        price_per_100g: price,
        approx_pieces_per_100g: pieces,
    }
}

pub const CHRISTMAS_SWEETS: [Sweet; 14] = [
    sweet("coko-skoricove-mini-tartaletky", "Čoko-skořicové mini tartaletky", 190, 8),
    sweet("vanilkove-rohlicky", "Vanilkové rohlíčky", 100, 15),
    sweet("orechovo-karamelove-trubicky", "Ořechovo-karamelové trubičky", 160, 14),
    sweet("medovnikove-koule", "Medovníkové koule", 150, 9),
    sweet("coko-pomerancove-crinkles", "Čoko-pomerančové crinkles", 160, 5),
    sweet("vosi-hnizda", "Vosí hnízda", 140, 6),
    sweet("iselske-dorticky", "Išelské dortíčky", 160, 8),
    sweet("rumove-kulicky", "Rumové kuličky", 130, 9),
    sweet("pernicky", "Perníčky", 120, 15),
    sweet("linecke-cukrovi", "Linecké cukroví", 110, 15),
    sweet("matcha-linecke", "Matcha linecké", 200, 14),
    sweet("pistaciove-cokomalinove-lanyzky", "Pistáciové a čokomalinové lanýžky", 250, 9),
    sweet("raffaello-kulicky", "Raffaello kuličky", 150, 9),
    sweet("plnene-orechy", "Plněné ořechy", 160, 7),
];

#[must_use]
pub fn find_sweet(id: &str) -> Option<&'static Sweet> {
    CHRISTMAS_SWEETS.iter().find(|s| s.id == id)
}

/// Minimum value of a Christmas sweets order.
pub const CHRISTMAS_MINIMUM_ORDER: i64 = 500;

/// Deposit requested before an order is confirmed.
pub const DEPOSIT: i64 = 450;

/// Tasting boxes shared by the wedding and Christmas tastings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TastingBox {
    Cake,
    Sweetbar,
}

impl TastingBox {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Cake => "Ochutnávka dortů",
            Self::Sweetbar => "Ochutnávka sweetbaru",
        }
    }

    #[must_use]
    pub fn price(self) -> Czk {
        match self {
            Self::Cake => Czk::from_whole(550),
            Self::Sweetbar => Czk::from_whole(750),
        }
    }
}

/// Price of a tasting order with the given box quantities.
#[must_use]
pub fn tasting_total(cake_boxes: u32, sweetbar_boxes: u32) -> Czk {
    TastingBox::Cake.price() * cake_boxes + TastingBox::Sweetbar.price() * sweetbar_boxes
}

/// Errors when turning submitted quantities into a sweets order.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SweetsOrderError {
    #[error(transparent)]
    Shape(#[from] OrderShapeError),
    #[error("minimum order value is {minimum}, got {total}")]
    BelowMinimum { minimum: Czk, total: Czk },
}

/// Build a sweets order from `(sweet, quantity)` pairs, skipping zero
/// quantities and enforcing [`CHRISTMAS_MINIMUM_ORDER`].
///
/// # Errors
///
/// Returns [`SweetsOrderError`] when nothing is selected or the total is
/// below the minimum.
pub fn build_sweets_order<'a, I>(quantities: I) -> Result<ChristmasSweets, SweetsOrderError>
where
    I: IntoIterator<Item = (&'a Sweet, u32)>,
{
    let lines = quantities
        .into_iter()
        .filter(|(_, qty)| *qty > 0)
        .map(|(sweet, qty)| sweet.line(qty))
        .collect();
    let order = ChristmasSweets::new(lines)?;

    let minimum = Czk::from_whole(CHRISTMAS_MINIMUM_ORDER);
    let total = order.total();
    if total < minimum {
        return Err(SweetsOrderError::BelowMinimum { minimum, total });
    }
    Ok(order)
}

/// What the customer pays up front and what is left for pickup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    pub requires_deposit: bool,
    pub amount_due: Czk,
    pub balance_due: Czk,
}

impl PaymentDetails {
    #[must_use]
    pub fn has_balance(&self) -> bool {
        self.balance_due > Czk::ZERO
    }

    /// Phrase for the confirmation email, e.g. `zálohu 450 Kč`.
    #[must_use]
    pub fn payment_description(&self) -> String {
        if self.requires_deposit {
            format!("zálohu {}", self.amount_due)
        } else {
            format!("částku {}", self.amount_due)
        }
    }

    #[must_use]
    pub const fn confirmation_message(&self) -> &'static str {
        if self.requires_deposit {
            "Po obdržení zálohy vám zašleme finální potvrzení."
        } else {
            "Po obdržení platby vám zašleme finální potvrzení."
        }
    }
}

/// Orders worth at least the deposit pay the deposit; smaller ones pay in full.
#[must_use]
pub fn calculate_payment_details(total: Czk, deposit: Czk) -> PaymentDetails {
    if total >= deposit {
        PaymentDetails {
            requires_deposit: true,
            amount_due: deposit,
            balance_due: Czk::new(total.amount() - deposit.amount()),
        }
    } else {
        PaymentDetails {
            requires_deposit: false,
            amount_due: total,
            balance_due: Czk::ZERO,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_sweet_ids_are_unique() {
        let mut ids: Vec<_> = CHRISTMAS_SWEETS.iter().map(|s| s.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), CHRISTMAS_SWEETS.len());
    }

    #[test]
    fn test_find_sweet() {
        assert_eq!(find_sweet("pernicky").unwrap().price_per_100g, 120);
        assert!(find_sweet("stollen").is_none());
        assert_eq!(
            CHRISTMAS_SWEETS[0].quantity_field(),
            "quantity_coko-skoricove-mini-tartaletky"
        );
    }

    #[test]
    fn test_build_sweets_order_skips_zero_lines() {
        let vanilla = find_sweet("vanilkove-rohlicky").unwrap();
        let truffles = find_sweet("pistaciove-cokomalinove-lanyzky").unwrap();
        let order = build_sweets_order([(vanilla, 3), (truffles, 1), (vanilla, 0)]).unwrap();
        assert_eq!(order.items().len(), 2);
        assert_eq!(order.total(), Czk::from_whole(550));
    }

    #[test]
    fn test_build_sweets_order_enforces_minimum() {
        let vanilla = find_sweet("vanilkove-rohlicky").unwrap();
        assert_eq!(
            build_sweets_order([(vanilla, 4)]),
            Err(SweetsOrderError::BelowMinimum {
                minimum: Czk::from_whole(500),
                total: Czk::from_whole(400),
            })
        );
        assert!(build_sweets_order([(vanilla, 5)]).is_ok());
    }

    #[test]
    fn test_build_sweets_order_requires_a_line() {
        let vanilla = find_sweet("vanilkove-rohlicky").unwrap();
        assert_eq!(
            build_sweets_order([(vanilla, 0)]),
            Err(SweetsOrderError::Shape(OrderShapeError::NoItems))
        );
    }

    #[test]
    fn test_tasting_total() {
        assert_eq!(tasting_total(1, 1), Czk::from_whole(1300));
        assert_eq!(tasting_total(2, 0), Czk::from_whole(1100));
    }

    #[test]
    fn test_payment_details_with_deposit() {
        let details = calculate_payment_details(Czk::from_whole(1300), Czk::from_whole(DEPOSIT));
        assert!(details.requires_deposit);
        assert_eq!(details.amount_due, Czk::from_whole(450));
        assert_eq!(details.balance_due, Czk::from_whole(850));
        assert!(details.has_balance());
        assert_eq!(details.payment_description(), "zálohu 450 Kč");
    }

    #[test]
    fn test_payment_details_exact_deposit_has_no_balance() {
        let details = calculate_payment_details(Czk::from_whole(450), Czk::from_whole(DEPOSIT));
        assert!(details.requires_deposit);
        assert!(!details.has_balance());
    }

    #[test]
    fn test_payment_details_below_deposit_pays_in_full() {
        let details = calculate_payment_details(Czk::from_whole(300), Czk::from_whole(DEPOSIT));
        assert!(!details.requires_deposit);
        assert_eq!(details.amount_due, Czk::from_whole(300));
        assert_eq!(details.payment_description(), "částku 300 Kč");
        assert_eq!(
            details.confirmation_message(),
            "Po obdržení platby vám zašleme finální potvrzení."
        );
    }
}
