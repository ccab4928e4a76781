// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! JSON shapes returned by the API. Derived fields are filled here, on read.

use crate::models::{CampaignWithItems, DerivationError, LineItem};
use crate::utils::{fmt_decimal, fmt_iso, fmt_plain};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CampaignSummary {
    pub id: i64,
    pub name: String,
    pub created_at: String,
    /// A JSON number carrying every digit of the exact sum.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub potential_invoice_amount: Decimal,
    /// `None` (JSON null) when nothing was booked.
    pub budget_fulfillment_rate: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct LineItemView {
    pub id: i64,
    pub name: String,
    pub booked_amount: String,
    pub actual_amount: String,
    pub adjustment_amount: String,
    pub final_amount: String,
    pub budget_fulfillment_rate: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
pub struct CampaignDetail {
    pub id: i64,
    pub name: String,
    pub created_at: String,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub potential_invoice_amount: Decimal,
    pub line_items: Vec<LineItemView>,
}

#[derive(Debug, Serialize)]
pub struct Message {
    pub message: &'static str,
}

impl TryFrom<&CampaignWithItems> for CampaignSummary {
    type Error = DerivationError;

    fn try_from(c: &CampaignWithItems) -> Result<Self, Self::Error> {
        Ok(CampaignSummary {
            id: c.campaign.id,
            name: c.campaign.name.clone(),
            created_at: fmt_iso(&c.campaign.created_at),
            potential_invoice_amount: c.potential_invoice_amount()?.normalize(),
            budget_fulfillment_rate: c.budget_fulfillment_rate().ok(),
        })
    }
}

impl TryFrom<&LineItem> for LineItemView {
    type Error = DerivationError;

    fn try_from(li: &LineItem) -> Result<Self, Self::Error> {
        Ok(LineItemView {
            id: li.id,
            name: li.name.clone(),
            booked_amount: fmt_decimal(&li.booked_amount),
            actual_amount: fmt_decimal(&li.actual_amount),
            adjustment_amount: fmt_decimal(&li.adjustment_amount),
            final_amount: fmt_decimal(&li.final_amount()?),
            budget_fulfillment_rate: li.budget_fulfillment_rate().ok(),
            created_at: fmt_iso(&li.created_at),
            updated_at: fmt_iso(&li.updated_at),
        })
    }
}

impl TryFrom<&CampaignWithItems> for CampaignDetail {
    type Error = DerivationError;

    fn try_from(c: &CampaignWithItems) -> Result<Self, Self::Error> {
        Ok(CampaignDetail {
            id: c.campaign.id,
            name: c.campaign.name.clone(),
            // the detail view keeps the shorter, offset-free timestamp
            created_at: fmt_plain(&c.campaign.created_at),
            potential_invoice_amount: c.potential_invoice_amount()?.normalize(),
            line_items: c
                .line_items
                .iter()
                .map(LineItemView::try_from)
                .collect::<Result<_, _>>()?,
        })
    }
}
