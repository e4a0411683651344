use rust_decimal::Decimal;

use super::models::{FeeType, Transaction};

/// What each party ends up with once the fee is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub buyer: Decimal,
    pub seller: Decimal,
}

/// `None` when the amount no longer fits a `Decimal`
pub fn subtotal(price: Decimal, quantity: u32, shipping_price: Decimal) -> Option<Decimal> {
    price.checked_mul(Decimal::from(quantity))?.checked_add(shipping_price)
}

///
/// Fee previewed when an offer is made: 8% above 200, 5% above 100
/// and 2% otherwise. The stored fee of a transaction is what every
/// later screen shows.
///
pub fn platform_fee(subtotal: Decimal) -> Option<Decimal> {
    let rate = if subtotal > Decimal::from(200) {
        Decimal::new(8, 2)
    } else if subtotal > Decimal::from(100) {
        Decimal::new(5, 2)
    } else {
        Decimal::new(2, 2)
    };
    subtotal.checked_mul(rate)
}

pub fn settle(subtotal: Decimal, fee: Decimal, fee_type: FeeType) -> Option<Settlement> {
    let settlement = match fee_type {
        FeeType::BuyerPays => Settlement { buyer: subtotal.checked_add(fee)?, seller: subtotal },
        FeeType::SellerPays => Settlement { buyer: subtotal, seller: subtotal.checked_sub(fee)? },
        FeeType::Split => {
            let half = fee / Decimal::TWO;
            Settlement { buyer: subtotal.checked_add(half)?, seller: subtotal.checked_sub(fee - half)? }
        }
    };
    Some(settlement)
}

/// Settlement of a transaction at the given unit price, using its stored fee
pub fn settlement(tx: &Transaction, price: Decimal) -> Option<Settlement> {
    settle(subtotal(price, tx.quantity(), tx.shipping_price())?, tx.fee(), tx.fee_type())
}
