// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use campaignbook::models::{
    Campaign, CampaignWithItems, DerivationError, LineItem, campaign_fulfillment_rate,
    exact_add, fulfillment_rate, potential_invoice_amount,
};
use campaignbook::utils::{AmountError, parse_amount};
use chrono::Utc;
use rust_decimal::Decimal;

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn item(id: i64, booked: &str, actual: &str, adjustment: &str) -> LineItem {
    let now = Utc::now();
    LineItem {
        id,
        campaign_id: 1,
        name: format!("Line {}", id),
        booked_amount: d(booked),
        actual_amount: d(actual),
        adjustment_amount: d(adjustment),
        created_at: now,
        updated_at: now,
    }
}

fn campaign(items: Vec<LineItem>) -> CampaignWithItems {
    CampaignWithItems {
        campaign: Campaign {
            id: 1,
            name: "Test Campaign".into(),
            created_at: Utc::now(),
        },
        line_items: items,
    }
}

#[test]
fn final_amount_is_exact_with_negative_adjustment() {
    let li = item(1, "200", "200.12345678901234567890", "-10.00000000000000000001");
    assert_eq!(li.final_amount(), Ok(d("190.12345678901234567889")));
}

#[test]
fn final_amount_has_no_float_drift() {
    let li = item(1, "1", "0.1", "0.2");
    assert_eq!(li.final_amount(), Ok(d("0.3")));
}

#[test]
fn potential_invoice_sums_final_amounts() {
    let c = campaign(vec![item(1, "100", "100", "10"), item(2, "200", "200", "-10")]);
    assert_eq!(c.potential_invoice_amount(), Ok(d("300")));
    assert_eq!(potential_invoice_amount(&[]), Ok(Decimal::ZERO));
}

#[test]
fn line_item_rate_floors() {
    assert_eq!(item(1, "100", "50", "0").budget_fulfillment_rate(), Ok(50));
    assert_eq!(item(1, "100", "150", "0").budget_fulfillment_rate(), Ok(150));
    assert_eq!(item(1, "3", "1", "0").budget_fulfillment_rate(), Ok(33));
    assert_eq!(item(1, "3", "2", "0").budget_fulfillment_rate(), Ok(66));
    // floor, not truncation toward zero
    assert_eq!(item(1, "3", "-1", "0").budget_fulfillment_rate(), Ok(-34));
}

#[test]
fn zero_booked_is_division_by_zero() {
    assert_eq!(
        item(1, "0", "10", "0").budget_fulfillment_rate(),
        Err(DerivationError::DivisionByZero)
    );
    assert_eq!(
        campaign_fulfillment_rate(&[]),
        Err(DerivationError::DivisionByZero)
    );
    assert_eq!(
        campaign(vec![item(1, "0", "1", "0"), item(2, "0", "2", "0")]).budget_fulfillment_rate(),
        Err(DerivationError::DivisionByZero)
    );
}

#[test]
fn campaign_rate_uses_totals_not_mean_of_rates() {
    // 110/100 = 110% and 190/300 = 63%; totals give 300/400 = 75%
    let c = campaign(vec![item(1, "100", "100", "10"), item(2, "300", "200", "-10")]);
    assert_eq!(c.budget_fulfillment_rate(), Ok(75));
    let t = c.totals().unwrap();
    assert_eq!(t.count, 2);
    assert_eq!(t.booked, d("400"));
    assert_eq!(t.final_amount(), Ok(d("300")));
}

#[test]
fn rate_overflow_is_reported() {
    assert_eq!(
        fulfillment_rate(Decimal::MAX, d("0.0000000001")),
        Err(DerivationError::Overflow)
    );
}

#[test]
fn widest_accepted_amounts_add_exactly() {
    let li = item(
        1,
        "1",
        &parse_amount("9999999999.5").unwrap().to_string(),
        &parse_amount("0.000000000000000001").unwrap().to_string(),
    );
    assert_eq!(li.final_amount(), Ok(d("9999999999.500000000000000001")));

    let big = d("9999999999.999999999999999999");
    assert_eq!(
        exact_add(big, big),
        Ok(d("19999999999.999999999999999998"))
    );
}

#[test]
fn sums_that_would_round_are_refused() {
    let wide = d("9999999999.999999999999999999");
    let items: Vec<LineItem> = (1..=10)
        .map(|i| item(i, "1", &wide.to_string(), "0"))
        .collect();
    assert_eq!(
        potential_invoice_amount(&items),
        Err(DerivationError::Inexact)
    );
    assert_eq!(
        exact_add(d("0.5"), d("-0.5")),
        Ok(Decimal::ZERO)
    );
}

#[test]
fn amount_digits_are_counted_on_the_literal() {
    // 30 digits would parse, rounded, into a Decimal
    assert_eq!(
        parse_amount("1234567890.12345678901234567890"),
        Err(AmountError::TooManyDigits)
    );
    assert_eq!(
        parse_amount("0.0000000000000000001"),
        Err(AmountError::TooManyDecimalPlaces)
    );
    assert_eq!(
        parse_amount("12345678901.5"),
        Err(AmountError::TooManyWholeDigits)
    );
    assert_eq!(parse_amount("ten"), Err(AmountError::Invalid));
    assert_eq!(parse_amount(""), Err(AmountError::Invalid));

    assert_eq!(parse_amount(" -0012.3400 "), Ok(d("-12.34")));
    assert_eq!(parse_amount("1.5e2"), Ok(d("150")));
    assert_eq!(
        parse_amount("1234567890.123456789012345678"),
        Ok(d("1234567890.123456789012345678"))
    );
}
