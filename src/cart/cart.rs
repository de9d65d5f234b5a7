use std::{fmt, sync::Arc};

use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::{error::GateError, gate::gate::StoreHoursGate};

#[derive(Debug, Error)]
pub enum CartError {
    #[error(transparent)]
    Gate(#[from] GateError),
    #[error("cart is empty")]
    Empty,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: String,
    pub name: String,
    pub price_cents: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    pub items: Vec<CartItem>,
    pub total_cents: u64,
    pub placed_at: DateTime<Tz>,
}

/// Amount in centavos, shown as `R$ 12.50`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Price(pub u64);

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R$ {}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// Shopping cart whose state-changing operations go through the store hours gate.
///
/// Removing items and clearing the cart stay available while the store is closed.
pub struct Cart {
    gate: Arc<StoreHoursGate>,
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new(gate: Arc<StoreHoursGate>) -> Self {
        Self {
            gate,
            items: Vec::new(),
        }
    }

    pub fn add(&mut self, item: CartItem) -> Result<(), CartError> {
        self.gate.ensure_can_add_to_cart()?;
        info!(product_id = %item.id, name = %item.name, "item added to cart");
        self.items.push(item);
        Ok(())
    }

    /// Out-of-range indices are ignored.
    pub fn remove(&mut self, index: usize) -> Option<CartItem> {
        if index >= self.items.len() {
            return None;
        }
        let removed = self.items.remove(index);
        info!(product_id = %removed.id, name = %removed.name, "item removed from cart");
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.items.clear();
        info!("cart cleared");
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn total_cents(&self) -> u64 {
        self.items.iter().map(|item| item.price_cents).sum()
    }

    pub fn total(&self) -> Price {
        Price(self.total_cents())
    }

    /// Turns the cart into an order. The cart is emptied only on success.
    pub fn checkout(&mut self) -> Result<OrderSummary, CartError> {
        self.gate.ensure_can_checkout()?;
        if self.items.is_empty() {
            return Err(CartError::Empty);
        }
        let total_cents = self.total_cents();
        let order = OrderSummary {
            items: std::mem::take(&mut self.items),
            total_cents,
            placed_at: self.gate.now(),
        };
        info!(
            items = order.items.len(),
            total = %Price(total_cents),
            "checkout completed"
        );
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono_tz::America::Sao_Paulo;

    use super::*;
    use crate::{
        gate::{config::GateConfig, status::OperatingStatus},
        timing::{clock::ManualClock, window::NightWindow},
    };

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<Tz> {
        Sao_Paulo
            .with_ymd_and_hms(2025, 1, day, hour, minute, 0)
            .unwrap()
    }

    fn item(id: &str, price_cents: u64) -> CartItem {
        CartItem {
            id: id.to_string(),
            name: format!("Produto {}", id),
            price_cents,
        }
    }

    fn cart_at(now: DateTime<Tz>) -> (Cart, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(now));
        let config = GateConfig::new(NightWindow::LATE_NIGHT);
        let gate = Arc::new(StoreHoursGate::new(&config, clock.clone()).unwrap());
        gate.init();
        (Cart::new(gate), clock)
    }

    #[test]
    fn adds_and_totals_while_open() {
        let (mut cart, _) = cart_at(at(7, 12, 0));
        cart.add(item("a", 1250)).unwrap();
        cart.add(item("b", 399)).unwrap();
        assert_eq!(cart.count(), 2);
        assert_eq!(cart.total_cents(), 1649);
        assert_eq!(cart.total().to_string(), "R$ 16.49");
    }

    #[test]
    fn closed_store_rejects_add_without_changing_cart() {
        let (mut cart, clock) = cart_at(at(7, 12, 0));
        cart.add(item("a", 1000)).unwrap();

        clock.set(at(7, 23, 45));
        let err = cart.add(item("b", 500)).unwrap_err();
        assert!(matches!(
            err,
            CartError::Gate(GateError::Closed {
                status: OperatingStatus::NightClosed,
                ..
            })
        ));
        assert_eq!(cart.count(), 1);
    }

    #[test]
    fn remove_ignores_out_of_range_and_works_while_closed() {
        let (mut cart, clock) = cart_at(at(7, 12, 0));
        cart.add(item("a", 1000)).unwrap();
        cart.add(item("b", 500)).unwrap();
        clock.set(at(3, 19, 0));

        assert_eq!(cart.remove(5), None);
        assert_eq!(cart.remove(0).map(|i| i.id), Some("a".to_string()));
        assert_eq!(cart.count(), 1);
        cart.clear();
        assert_eq!(cart.count(), 0);
    }

    #[test]
    fn checkout_is_gated_and_empties_cart() {
        let (mut cart, clock) = cart_at(at(7, 12, 0));
        assert!(matches!(cart.checkout(), Err(CartError::Empty)));
        cart.add(item("a", 1000)).unwrap();

        clock.set(at(3, 19, 0));
        assert!(matches!(
            cart.checkout(),
            Err(CartError::Gate(GateError::Closed {
                status: OperatingStatus::SabbathClosed,
                ..
            }))
        ));
        assert_eq!(cart.count(), 1);

        clock.set(at(4, 18, 0));
        let order = cart.checkout().unwrap();
        assert_eq!(order.total_cents, 1000);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.placed_at, at(4, 18, 0));
        assert_eq!(cart.count(), 0);
    }
}
