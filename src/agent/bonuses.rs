//! Daily freebies: the travel-cards wheel, the free card holder and free
//! workshop items
//!
//! Each routine first checks availability and only then claims. Wheel and
//! card-holder outcomes are kept as timestamped JSON files.

use crate::config::Config;
use crate::scrape::endpoints;
use crate::scrape::html::{
    digits_only, element_text, require, require_attr, require_in, select_all, LayoutError,
};
use crate::scrape::layout::bonus;
use crate::session::{AuthSession, PortalRequest};
use crate::storage::{write_atomic, StorageError};
use crate::{AutopilotError, Result};
use chrono::Utc;
use reqwest::StatusCode;
use scraper::Html;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::path::PathBuf;

const JSON_ACCEPT: &str = "application/json, text/javascript, */*; q=0.01";

/// Outcome of one wheel spin
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WheelSpin {
    pub total_travel_cards_after: i64,
    pub total_travel_cards_before: i64,
    pub earned_travel_cards: i64,
    pub bonus_multiplier_gain: f64,
    pub bonus_multiplier_gain_index: i64,
    pub can_play_again: bool,
}

impl WheelSpin {
    /// Reads the spin endpoint's JSON, which mixes numbers and numeric strings
    pub fn from_json(value: &Value) -> std::result::Result<Self, String> {
        let after = lenient_i64(value, "nbOfTravelCards")?;
        let gain = lenient_i64(value, "gain")?;
        Ok(Self {
            total_travel_cards_after: after,
            total_travel_cards_before: after - gain,
            earned_travel_cards: gain,
            bonus_multiplier_gain: lenient_f64(value, "multiplierBonus")?,
            bonus_multiplier_gain_index: lenient_i64(value, "indexScore")?,
            can_play_again: lenient_bool(value, "isAllowToPlay")?,
        })
    }
}

fn field<'v>(value: &'v Value, key: &str) -> std::result::Result<&'v Value, String> {
    value.get(key).ok_or_else(|| format!("missing '{}'", key))
}

fn lenient_i64(value: &Value, key: &str) -> std::result::Result<i64, String> {
    match field(value, key)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .ok_or_else(|| format!("'{}' is not an integer", key)),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| format!("'{}' is not an integer: '{}'", key, s)),
        other => Err(format!("'{}' has unexpected value {}", key, other)),
    }
}

fn lenient_f64(value: &Value, key: &str) -> std::result::Result<f64, String> {
    match field(value, key)? {
        Value::Number(n) => n.as_f64().ok_or_else(|| format!("'{}' is not a number", key)),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| format!("'{}' is not a number: '{}'", key, s)),
        other => Err(format!("'{}' has unexpected value {}", key, other)),
    }
}

fn lenient_bool(value: &Value, key: &str) -> std::result::Result<bool, String> {
    match field(value, key)? {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => Ok(n.as_f64().map_or(false, |f| f != 0.0)),
        Value::String(s) => Ok(!matches!(s.trim(), "" | "0" | "false")),
        Value::Null => Ok(false),
        other => Err(format!("'{}' has unexpected value {}", key, other)),
    }
}

/// Kind of a card-holder bonus, told apart by its picture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BonusType {
    ResearchDollars,
    Dollars,
    Unknown,
}

impl BonusType {
    pub fn from_image_src(src: &str) -> Self {
        match src.rsplit('/').next() {
            Some("researchDollars.png") => Self::ResearchDollars,
            Some("dollars.png") => Self::Dollars,
            _ => {
                tracing::warn!("Unknown bonus type for image '{}'", src);
                Self::Unknown
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardBonus {
    pub bonus_type: BonusType,
    pub bonus_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardHolderOpening {
    pub bonuses: Vec<CardBonus>,
    pub total_bonuses: usize,
}

/// A workshop item that has a purchase link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkshopItem {
    pub url: String,
    pub free: bool,
}

/// What [`BonusCollector::run_all`] obtained
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BonusReport {
    pub wheel: Option<WheelSpin>,
    pub card_holder: Option<CardHolderOpening>,
    pub workshop_items: usize,
}

impl BonusReport {
    /// Number of bonuses claimed
    pub fn claimed(&self) -> usize {
        usize::from(self.wheel.is_some()) + usize::from(self.card_holder.is_some()) + self.workshop_items
    }
}

/// `div#playWheel` on the home page means a spin is available
pub fn parse_wheel_availability(body: &str) -> std::result::Result<bool, LayoutError> {
    let document = Html::parse_document(body);
    require(&document, bonus::HOME_CONTENT, "home_main_content_div_not_found")?;
    Ok(require(&document, bonus::WHEEL_BANNER, "play_wheel_not_found").is_ok())
}

/// A countdown on the card-holder page means the free one was already opened
pub fn parse_card_holder_availability(body: &str) -> std::result::Result<bool, LayoutError> {
    let document = Html::parse_document(body);
    require(&document, bonus::CARD_HOLDER_TITLE, "card_holder_title_div_not_found")?;
    Ok(require(&document, bonus::CARD_HOLDER_TIMER, "timer_not_found").is_err())
}

/// Returns the `(form id, CSRF token)` of the card-holder modal
pub fn parse_card_holder_form(body: &str) -> std::result::Result<(String, String), LayoutError> {
    let document = Html::parse_document(body);
    let id = require(&document, bonus::CARD_FORM_ID, "card_holder_form_not_found")?;
    let token = require(&document, bonus::CARD_FORM_TOKEN, "card_holder_form_not_found")?;
    Ok((
        require_attr(id, "value", "card_holder_form_not_found")?,
        require_attr(token, "value", "card_holder_form_not_found")?,
    ))
}

pub fn parse_card_holder_bonuses(body: &str) -> std::result::Result<CardHolderOpening, LayoutError> {
    let document = Html::parse_document(body);
    let container = require(&document, bonus::CARD_BONUS_CONTAINER, "card_holder_bonuses_div_not_found")?;

    let mut bonuses = Vec::new();
    for card in select_all(container, bonus::CARD_BONUS)? {
        let title = require_in(card, bonus::CARD_BONUS_TITLE, "card_holder_bonus_div_not_found")?;
        let image = require_in(title, "img", "card_holder_bonus_img_not_found")?;
        let src = require_attr(image, "src", "card_holder_bonus_img_not_found")?;
        bonuses.push(CardBonus {
            bonus_type: BonusType::from_image_src(&src),
            bonus_text: element_text(title),
        });
    }

    Ok(CardHolderOpening {
        total_bonuses: bonuses.len(),
        bonuses,
    })
}

/// Items of the workshop rack; a purchase button without a price is free
pub fn parse_workshop_items(body: &str) -> std::result::Result<Vec<WorkshopItem>, LayoutError> {
    let document = Html::parse_document(body);
    let rack = require(&document, bonus::WORKSHOP_RACK, "items_rack_div_not_found")?;

    let mut items = Vec::new();
    for object in select_all(rack, bonus::WORKSHOP_ITEM)? {
        let Some(button) = select_all(object, bonus::WORKSHOP_PURCHASE)?.into_iter().next() else {
            continue;
        };
        items.push(WorkshopItem {
            url: require_attr(button, "href", "workshop_item_link_not_found")?,
            free: digits_only(&element_text(button)).is_none(),
        });
    }
    Ok(items)
}

/// Runs the bonus routines through an authenticated session
pub struct BonusCollector {
    results_dir: PathBuf,
    card_holder_path: String,
}

impl BonusCollector {
    pub fn new(results_dir: impl Into<PathBuf>, card_holder_path: impl Into<String>) -> Self {
        Self {
            results_dir: results_dir.into(),
            card_holder_path: card_holder_path.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.storage.bonus_results_dir,
            config.remote.card_holder_path.clone(),
        )
    }

    pub async fn run_all(&self, session: &mut AuthSession) -> Result<BonusReport> {
        Ok(BonusReport {
            wheel: self.spin_wheel_if_available(session).await?,
            card_holder: self.open_card_holder_if_available(session).await?,
            workshop_items: self.claim_free_workshop_items(session).await?,
        })
    }

    pub async fn spin_wheel_if_available(&self, session: &mut AuthSession) -> Result<Option<WheelSpin>> {
        let home = session.request(PortalRequest::get(endpoints::HOME)).await?;
        let available = session.parse(&home, parse_wheel_availability)?;
        tracing::info!("Travel cards wheel available: {}", yes_no(available));
        if !available {
            return Ok(None);
        }

        let request = PortalRequest::get(endpoints::WHEEL_PLAY)
            .accept(JSON_ACCEPT)
            .referer(endpoints::WHEEL)
            .xhr();
        let response = session.request(request).await?;
        let json: Value = response.json().map_err(|e| {
            session.dump("wheel_spin_not_json", &response.body);
            e
        })?;
        let spin = WheelSpin::from_json(&json).map_err(|message| {
            session.dump("wheel_spin_unexpected_json", &response.body);
            AutopilotError::Protocol(format!("wheel spin: {}", message))
        })?;

        tracing::info!(
            "Wheel spin earned {} travel cards (multiplier {})",
            spin.earned_travel_cards,
            spin.bonus_multiplier_gain
        );
        self.save_result("travel_cards_wheel_results", &spin)?;
        Ok(Some(spin))
    }

    pub async fn open_card_holder_if_available(
        &self,
        session: &mut AuthSession,
    ) -> Result<Option<CardHolderOpening>> {
        let page = session
            .request(PortalRequest::get(endpoints::CARD_HOLDER).referer(endpoints::HOME))
            .await?;
        let available = session.parse(&page, parse_card_holder_availability)?;
        tracing::info!("Free card holder available: {}", yes_no(available));
        if !available {
            return Ok(None);
        }

        let modal_request = PortalRequest::get(self.card_holder_path.clone())
            .accept("*/*")
            .referer(endpoints::CARD_HOLDER)
            .xhr();
        let modal = session.request(modal_request).await?;
        let (form_id, token) = session.parse(&modal, parse_card_holder_form)?;

        let open_request = PortalRequest::post(self.card_holder_path.clone())
            .referer(self.card_holder_path.clone())
            .xhr()
            .form([("form[id]", form_id), ("form[_token]", token)]);
        let opened = session.request(open_request).await?;
        let opening = session.parse(&opened, parse_card_holder_bonuses)?;

        tracing::info!("Free card holder gave {} bonuses", opening.total_bonuses);
        self.save_result("card_holder_results", &opening)?;
        Ok(Some(opening))
    }

    /// Claims every free workshop item, re-reading the rack after each claim
    ///
    /// Returns the number of successful claims. An item whose claim did not
    /// answer 302 is not tried again in the same run.
    pub async fn claim_free_workshop_items(&self, session: &mut AuthSession) -> Result<usize> {
        let mut attempted = HashSet::new();
        let mut claimed = 0;

        loop {
            let page = session
                .request(PortalRequest::get(endpoints::WORKSHOP).referer(endpoints::HOME))
                .await?;
            let items = session.parse(&page, parse_workshop_items)?;

            let Some(item) = items
                .into_iter()
                .find(|item| item.free && !attempted.contains(&item.url))
            else {
                break;
            };

            tracing::info!("Claiming free workshop item {}", item.url);
            let request = PortalRequest::post(item.url.clone())
                .referer(endpoints::WORKSHOP)
                .no_redirects();
            let response = session.request(request).await?;

            if response.status == StatusCode::FOUND {
                claimed += 1;
            } else {
                tracing::warn!(
                    "Workshop item {} answered {} instead of 302",
                    item.url,
                    response.status.as_u16()
                );
            }
            attempted.insert(item.url);
        }

        tracing::info!("Claimed {} free workshop items", claimed);
        Ok(claimed)
    }

    fn save_result<T: Serialize>(&self, prefix: &str, result: &T) -> Result<PathBuf> {
        let timestamp = Utc::now().format("%Y-%m-%d_%H-%M-%S");
        let path = self.results_dir.join(format!("{}__{}.json", prefix, timestamp));
        let json = serde_json::to_vec_pretty(result).map_err(StorageError::from)?;
        write_atomic(&path, &json)?;
        tracing::debug!("Saved {}", path.display());
        Ok(path)
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "YES"
    } else {
        "NO"
    }
}
