//! Parsers for the single-entity pages: login, line detail and line pricing

use crate::model::{Airport, CategorizedValue, Line};
use crate::scrape::html::{
    digits_only, element_text, require, require_attr, require_in, sanitize_text, select_all,
    LayoutError,
};
use crate::scrape::layout::{detail, login, pricing, BucketSlots};
use chrono::NaiveDate;
use scraper::{ElementRef, Html};

/// Extracts the CSRF token of the login form
pub fn parse_login_csrf(body: &str) -> Result<String, LayoutError> {
    let document = Html::parse_document(body);
    let input = require(&document, login::CSRF_INPUT, "csrf_token_field_not_found")?;
    require_attr(input, "value", "csrf_token_field_not_found")
}

/// Descriptive data of a line, from `/network/showline/{id}`
#[derive(Debug, Clone, PartialEq)]
pub struct LineDetails {
    pub name: String,
    pub display_name: String,
    pub origin: Airport,
    pub destination: Airport,
    pub distance_km: u64,
    pub taxes: u64,
}

impl LineDetails {
    pub fn apply_to(self, line: &mut Line) {
        line.name = Some(self.name);
        line.display_name = Some(self.display_name);
        line.origin = Some(self.origin);
        line.destination = Some(self.destination);
        line.distance_km = Some(self.distance_km);
        line.taxes = Some(self.taxes);
    }
}

pub fn parse_line_details(body: &str) -> Result<LineDetails, LayoutError> {
    const TAG: &str = "line_details_malformed";

    let document = Html::parse_document(body);
    let content = require(&document, detail::CONTAINER, "line_content_not_found")?;

    let origin_box = require_in(content, detail::ORIGIN_BOX, TAG)?;
    let destination_box = require_in(content, detail::DESTINATION_BOX, TAG)?;

    let origin_label = box_value(origin_box, detail::ORIGIN_ITEM)?;
    let origin = Airport::from_label(&origin_label)
        .ok_or_else(|| LayoutError::new(TAG, format!("bad origin label '{}'", origin_label)))?;

    let destination_label = box_value(destination_box, detail::DESTINATION_ITEM)?;
    let destination = Airport::from_label(&destination_label).ok_or_else(|| {
        LayoutError::new(TAG, format!("bad destination label '{}'", destination_label))
    })?;

    let distance_km = numeric(&box_value(destination_box, detail::DISTANCE_ITEM)?, "distance")?;
    let taxes = numeric(&box_value(destination_box, detail::TAXES_ITEM)?, "taxes")?;

    let title = require_in(content, detail::TITLE, TAG)?;

    Ok(LineDetails {
        name: format!("{} / {}", origin.abbrev, destination.abbrev),
        display_name: title_without_badge(title)?,
        origin,
        destination,
        distance_km,
        taxes,
    })
}

/// Text of the `<b>` inside the `index`-th item of an info box
fn box_value(info_box: ElementRef<'_>, index: usize) -> Result<String, LayoutError> {
    let item = select_all(info_box, detail::ITEM)?
        .into_iter()
        .nth(index)
        .ok_or_else(|| {
            LayoutError::new(
                "line_details_malformed",
                format!("info box has no item at index {}", index),
            )
        })?;
    let value = require_in(item, detail::VALUE, "line_details_malformed")?;
    Ok(element_text(value))
}

fn title_without_badge(title: ElementRef<'_>) -> Result<String, LayoutError> {
    let badge = select_all(title, detail::TITLE_BADGE)?
        .into_iter()
        .next()
        .map(|b| b.id());

    let mut text = String::new();
    for node in title.descendants() {
        let Some(fragment) = node.value().as_text() else {
            continue;
        };
        let in_badge = badge.map_or(false, |id| node.ancestors().any(|a| a.id() == id));
        if !in_badge {
            text.push_str(fragment);
        }
    }

    Ok(sanitize_text(&text))
}

fn numeric(text: &str, field: &str) -> Result<u64, LayoutError> {
    digits_only(text).ok_or_else(|| {
        LayoutError::new(
            "line_details_malformed",
            format!("{} '{}' is not numeric", field, text),
        )
    })
}

/// Commercial data of a line, from `/marketing/pricing/{id}`
#[derive(Debug, Clone, PartialEq)]
pub struct MarketingSnapshot {
    pub total_demand: CategorizedValue,
    pub ideal_cost: CategorizedValue,
    pub turnover: CategorizedValue,
    pub current_cost: CategorizedValue,
    pub internal_audit_cost: u64,
    /// None when the line was never audited
    pub last_audit_date: Option<NaiveDate>,
    pub reliability_level: u32,
    pub can_update_prices: bool,
    /// CSRF token of the price form, needed to push prices
    pub price_form_token: Option<String>,
}

impl MarketingSnapshot {
    /// Copies the line fields, returning the price-form token
    pub fn apply_to(self, line: &mut Line) -> Option<String> {
        line.total_demand = Some(self.total_demand);
        line.ideal_cost = Some(self.ideal_cost);
        line.turnover = Some(self.turnover);
        line.current_cost = Some(self.current_cost);
        line.internal_audit_cost = Some(self.internal_audit_cost);
        line.last_audit_date = self.last_audit_date;
        line.reliability_level = Some(self.reliability_level);
        line.can_update_prices = self.can_update_prices;
        self.price_form_token
    }
}

/// Reads the positional pricing table
///
/// Positions count every element below the pricing container in document
/// order, starting at 0 with its first descendant.
pub fn parse_pricing_page(body: &str) -> Result<MarketingSnapshot, LayoutError> {
    let document = Html::parse_document(body);
    let container = require(&document, pricing::CONTAINER, "marketing_pricing_not_found")?;

    let slots: Vec<ElementRef<'_>> = container
        .descendants()
        .filter_map(ElementRef::wrap)
        .skip(1)
        .collect();

    let audit_date_text = element_text(slot(&slots, pricing::LAST_AUDIT_DATE)?);
    let last_audit_date = if digits_only(&audit_date_text).is_none() {
        None
    } else {
        Some(
            NaiveDate::parse_from_str(&audit_date_text, pricing::AUDIT_DATE_FORMAT).map_err(|e| {
                LayoutError::new(
                    "marketing_field_malformed",
                    format!("audit date '{}': {}", audit_date_text, e),
                )
            })?,
        )
    };

    let audit_cost_input = require_in(container, pricing::AUDIT_COST_INPUT, "marketing_field_missing")?;
    let audit_cost_value = require_attr(audit_cost_input, "value", "marketing_field_missing")?;
    let internal_audit_cost = digits_only(&audit_cost_value).ok_or_else(|| {
        LayoutError::new(
            "marketing_field_malformed",
            format!("audit cost '{}' is not numeric", audit_cost_value),
        )
    })?;

    let form = select_all(container, pricing::PRICE_FORM)?.into_iter().next();
    let price_form_token = match form {
        Some(form) => select_all(form, pricing::PRICE_TOKEN_INPUT)?
            .into_iter()
            .next()
            .and_then(|input| input.value().attr("value").map(str::to_string)),
        None => None,
    };

    Ok(MarketingSnapshot {
        total_demand: buckets(&slots, pricing::TOTAL_DEMAND)?,
        ideal_cost: buckets(&slots, pricing::IDEAL_COST)?,
        turnover: buckets(&slots, pricing::TURNOVER)?,
        current_cost: buckets(&slots, pricing::CURRENT_COST)?,
        internal_audit_cost,
        last_audit_date,
        reliability_level: reliability(slot(&slots, pricing::RELIABILITY)?)?,
        can_update_prices: form.is_some(),
        price_form_token,
    })
}

fn slot<'a>(slots: &[ElementRef<'a>], index: usize) -> Result<ElementRef<'a>, LayoutError> {
    slots.get(index).copied().ok_or_else(|| {
        LayoutError::new(
            "marketing_field_missing",
            format!("pricing table has {} elements, needed index {}", slots.len(), index),
        )
    })
}

fn slot_value(slots: &[ElementRef<'_>], index: usize) -> Result<u64, LayoutError> {
    let text = element_text(slot(slots, index)?);
    digits_only(&text).ok_or_else(|| {
        LayoutError::new(
            "marketing_field_malformed",
            format!("pricing element {} ('{}') is not numeric", index, text),
        )
    })
}

fn buckets(slots: &[ElementRef<'_>], at: BucketSlots) -> Result<CategorizedValue, LayoutError> {
    Ok(CategorizedValue::new(
        slot_value(slots, at.economic)?,
        slot_value(slots, at.executive)?,
        slot_value(slots, at.first_class)?,
        slot_value(slots, at.cargo)?,
    ))
}

/// Digits of the second class token, e.g. `class="reliability level70"`
fn reliability(element: ElementRef<'_>) -> Result<u32, LayoutError> {
    let class = element.value().attr("class").unwrap_or_default();
    class
        .split_whitespace()
        .nth(1)
        .and_then(digits_only)
        .and_then(|level| u32::try_from(level).ok())
        .ok_or_else(|| {
            LayoutError::new(
                "marketing_field_malformed",
                format!("no reliability level in class '{}'", class),
            )
        })
}
