// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub id: i64,
    pub campaign_id: i64,
    pub name: String,
    pub booked_amount: Decimal,
    pub actual_amount: Decimal,
    pub adjustment_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
}

/// A campaign together with all of its line items, loaded in one pass.
#[derive(Debug, Clone)]
pub struct CampaignWithItems {
    pub campaign: Campaign,
    pub line_items: Vec<LineItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DerivationError {
    #[error("booked amount is zero, fulfillment rate is undefined")]
    DivisionByZero,
    #[error("fulfillment rate does not fit in an integer")]
    Overflow,
    #[error("sum needs more digits than an exact decimal holds")]
    Inexact,
}

impl LineItem {
    /// `actual_amount + adjustment_amount`. Never stored.
    pub fn final_amount(&self) -> Result<Decimal, DerivationError> {
        exact_add(self.actual_amount, self.adjustment_amount)
    }

    /// Percentage of the booked amount that was delivered, floored.
    pub fn budget_fulfillment_rate(&self) -> Result<i64, DerivationError> {
        fulfillment_rate(self.final_amount()?, self.booked_amount)
    }
}

impl CampaignWithItems {
    pub fn potential_invoice_amount(&self) -> Result<Decimal, DerivationError> {
        potential_invoice_amount(&self.line_items)
    }

    pub fn budget_fulfillment_rate(&self) -> Result<i64, DerivationError> {
        campaign_fulfillment_rate(&self.line_items)
    }

    pub fn totals(&self) -> Result<Totals, DerivationError> {
        Totals::of(&self.line_items)
    }
}

/// Column sums over a set of line items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub count: usize,
    pub booked: Decimal,
    pub actual: Decimal,
    pub adjustment: Decimal,
}

impl Totals {
    pub fn of(items: &[LineItem]) -> Result<Self, DerivationError> {
        items.iter().try_fold(Totals::default(), |t, li| {
            Ok(Totals {
                count: t.count + 1,
                booked: exact_add(t.booked, li.booked_amount)?,
                actual: exact_add(t.actual, li.actual_amount)?,
                adjustment: exact_add(t.adjustment, li.adjustment_amount)?,
            })
        })
    }

    pub fn final_amount(&self) -> Result<Decimal, DerivationError> {
        exact_add(self.actual, self.adjustment)
    }
}

/// Addition that refuses to round. `Decimal` keeps the larger operand scale
/// on an exact sum and drops low digits once the mantissa outgrows 96 bits,
/// so a shrunken scale means digits were lost.
pub fn exact_add(a: Decimal, b: Decimal) -> Result<Decimal, DerivationError> {
    let (a, b) = (a.normalize(), b.normalize());
    let sum = a.checked_add(b).ok_or(DerivationError::Inexact)?;
    if sum.scale() < a.scale().max(b.scale()) {
        return Err(DerivationError::Inexact);
    }
    Ok(sum)
}

pub fn potential_invoice_amount(items: &[LineItem]) -> Result<Decimal, DerivationError> {
    items
        .iter()
        .try_fold(Decimal::ZERO, |sum, li| exact_add(sum, li.final_amount()?))
}

pub fn campaign_fulfillment_rate(items: &[LineItem]) -> Result<i64, DerivationError> {
    let totals = Totals::of(items)?;
    fulfillment_rate(totals.final_amount()?, totals.booked)
}

/// `floor(final / booked * 100)`. Multiplies before dividing so the
/// quotient is not truncated twice.
pub fn fulfillment_rate(final_amount: Decimal, booked: Decimal) -> Result<i64, DerivationError> {
    if booked.is_zero() {
        return Err(DerivationError::DivisionByZero);
    }
    let scaled = final_amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .ok_or(DerivationError::Overflow)?;
    scaled
        .checked_div(booked)
        .ok_or(DerivationError::Overflow)?
        .floor()
        .to_i64()
        .ok_or(DerivationError::Overflow)
}
