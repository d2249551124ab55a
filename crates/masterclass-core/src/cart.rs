//! # Cart Aggregation
//!
//! Pure arithmetic on [`Cart`]: no storage, no clock except `updated_at`.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Mutations                                       │
//! │                                                                         │
//! │  Operation              Line Change                  Then               │
//! │  ─────────              ───────────                  ────               │
//! │                                                                         │
//! │  add_product(p) ──────► find or insert {p, 0, 0.00}                     │
//! │                         qty += 1, subtotal = round2 ─► recalc total     │
//! │                                                                         │
//! │  change_qty(id, n>0) ─► qty = n, subtotal = round2 ──► recalc total     │
//! │  change_qty(id, n≤0) ─► line removed ────────────────► recalc total     │
//! │  change_qty(missing) ─► nothing ─────────────────────► recalc total     │
//! │                                                                         │
//! │  remove_product(id) ──► line removed if present ─────► recalc total     │
//! │                                                                         │
//! │  clear() ─────────────► all lines removed ───────────► total = 0.00     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every mutation validates first and only then touches the cart, so a
//! failed call leaves the cart exactly as it was.

use chrono::Utc;
use serde::{Serialize, Serializer};
use std::fmt;
use std::iter;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Cart, CartItem, Product};
use crate::validation::validate_quantity;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// Message shown when any product in the cart needs a deposit.
pub const DEPOSIT_WARNING: &str = "One or more of your selected products requires a deposit.";

// =============================================================================
// Warnings
// =============================================================================

/// Advisory derived from cart contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartWarning {
    /// At least one product has `requires_deposit` set.
    DepositRequired,
}

impl CartWarning {
    /// User-facing message.
    pub fn message(&self) -> &'static str {
        match self {
            CartWarning::DepositRequired => DEPOSIT_WARNING,
        }
    }
}

impl fmt::Display for CartWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Warnings serialize as their message.
impl Serialize for CartWarning {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.message())
    }
}

// =============================================================================
// Cart
// =============================================================================

impl Cart {
    /// Creates a new empty cart with total 0.00 and version 0.
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Cart {
            id: id.into(),
            items: Vec::new(),
            total: Money::zero(),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Finds the line for a product.
    pub fn item(&self, product_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.product_id() == product_id)
    }

    /// Returns true if the cart holds a line for this product.
    pub fn contains(&self, product_id: &str) -> bool {
        self.item(product_id).is_some()
    }

    /// Adds one unit of `product`.
    ///
    /// ## Behavior
    /// - Product already in cart: its qty goes up by one
    /// - Product not in cart: a new line is appended with qty 1
    ///
    /// The snapshot stored on an existing line is kept; only new lines take
    /// the `product` passed in.
    ///
    /// ## Errors
    /// - `InvalidQuantity` if the line would exceed `MAX_ITEM_QUANTITY`
    /// - `CartTooLarge` if a new line would exceed `MAX_CART_ITEMS`
    pub fn add_product(&mut self, product: &Product) -> CoreResult<()> {
        let Some(idx) = self.position(&product.id) else {
            if self.items.len() >= MAX_CART_ITEMS {
                return Err(CoreError::CartTooLarge {
                    max: MAX_CART_ITEMS,
                });
            }
            let first = Money::line_total(product.price, 1).ok_or(CoreError::AmountOverflow)?;
            let total = Money::sum(self.items.iter().map(|i| i.subtotal).chain(iter::once(first)))
                .ok_or(CoreError::AmountOverflow)?;

            self.items.push(CartItem {
                product: product.clone(),
                qty: 1,
                subtotal: first,
            });
            self.set_total(total);
            return Ok(());
        };

        let (new_qty, subtotal) = self.line_at(idx, |item| item.qty + 1)?;
        self.commit_line(idx, new_qty, subtotal)
    }

    /// Sets the quantity of a line.
    ///
    /// ## Behavior
    /// - `qty > 0`: qty and subtotal updated from the line's snapshot price
    /// - `qty <= 0`: line removed
    /// - product not in cart: no line changes
    ///
    /// The total is recomputed in every case.
    ///
    /// ## Errors
    /// - `InvalidQuantity` if `qty > MAX_ITEM_QUANTITY`
    pub fn change_qty(&mut self, product_id: &str, qty: i64) -> CoreResult<()> {
        if qty <= 0 {
            self.items.retain(|i| i.product_id() != product_id);
            return self.recalculate_total();
        }
        check_quantity(qty)?;

        match self.position(product_id) {
            Some(idx) => {
                let (qty, subtotal) = self.line_at(idx, |_| qty)?;
                self.commit_line(idx, qty, subtotal)
            }
            None => self.recalculate_total(),
        }
    }

    /// Removes a product's line. Absent products are not an error.
    ///
    /// ## Returns
    /// `true` if a line was removed.
    pub fn remove_product(&mut self, product_id: &str) -> CoreResult<bool> {
        let initial_len = self.items.len();
        self.items.retain(|i| i.product_id() != product_id);
        self.recalculate_total()?;
        Ok(self.items.len() != initial_len)
    }

    /// Clears all items from the cart.
    pub fn clear(&mut self) {
        self.items.clear();
        self.total = Money::zero();
        self.updated_at = Utc::now();
    }

    /// Warnings derived from current contents.
    pub fn warnings(&self) -> Vec<CartWarning> {
        let mut warnings = Vec::new();
        if self.items.iter().any(|i| i.product.requires_deposit) {
            warnings.push(CartWarning::DepositRequired);
        }
        warnings
    }

    /// Returns the number of distinct products in the cart.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.qty).sum()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Checks every aggregation invariant against the current contents.
    ///
    /// The SQLite repositories reject stored carts and orders that fail it.
    pub fn is_consistent(&self) -> bool {
        let lines_ok = self.items.iter().all(|i| {
            i.qty > 0 && Money::line_total(i.product.price, i.qty) == Some(i.subtotal)
        });
        let unique = self
            .items
            .iter()
            .enumerate()
            .all(|(n, i)| !self.items[..n].iter().any(|j| j.product_id() == i.product_id()));
        let total_ok = Money::sum(self.items.iter().map(|i| i.subtotal)) == Some(self.total);
        lines_ok && unique && total_ok
    }

    fn position(&self, product_id: &str) -> Option<usize> {
        self.items.iter().position(|i| i.product_id() == product_id)
    }

    /// Computes the new qty and subtotal for a line without mutating it.
    fn line_at(&self, idx: usize, next_qty: impl FnOnce(&CartItem) -> i64) -> CoreResult<(i64, Money)> {
        let item = &self.items[idx];
        let qty = next_qty(item);
        check_quantity(qty)?;
        let subtotal = Money::line_total(item.product.price, qty).ok_or(CoreError::AmountOverflow)?;
        Ok((qty, subtotal))
    }

    /// Writes a line's qty and subtotal together with the new total.
    ///
    /// The total is computed first, so an overflow leaves the line untouched.
    fn commit_line(&mut self, idx: usize, qty: i64, subtotal: Money) -> CoreResult<()> {
        let total = Money::sum(
            self.items
                .iter()
                .enumerate()
                .map(|(n, i)| if n == idx { subtotal } else { i.subtotal }),
        )
        .ok_or(CoreError::AmountOverflow)?;

        let item = &mut self.items[idx];
        item.qty = qty;
        item.subtotal = subtotal;
        self.set_total(total);
        Ok(())
    }

    fn recalculate_total(&mut self) -> CoreResult<()> {
        let total = Money::sum(self.items.iter().map(|i| i.subtotal)).ok_or(CoreError::AmountOverflow)?;
        self.set_total(total);
        Ok(())
    }

    fn set_total(&mut self, total: Money) {
        self.total = total;
        self.updated_at = Utc::now();
    }
}

/// Applies the line quantity rule, reported as `InvalidQuantity`.
fn check_quantity(qty: i64) -> CoreResult<()> {
    validate_quantity(qty).map_err(|_| CoreError::InvalidQuantity {
        requested: qty,
        max: MAX_ITEM_QUANTITY,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
