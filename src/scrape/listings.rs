//! Paginated account listings: lines and airplanes
//!
//! Each listing page is a table of rows; header rows parse to nothing and
//! are dropped. The rows are exported as flat summaries and the lines
//! listing additionally provides the IDs to reconcile.

use crate::scrape::endpoints;
use crate::scrape::html::{
    element_text, require, require_attr, require_in, sanitize_text, select_all, trailing_id,
    LayoutError,
};
use crate::scrape::layout::listing;
use crate::scrape::pagination::{fetch_all_pages, has_next_page, Page, PageLoader};
use crate::session::{AuthSession, PortalRequest};
use crate::Result;
use async_trait::async_trait;
use scraper::{ElementRef, Html};
use serde::Serialize;

/// One row of the lines listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSummary {
    pub id: u64,
    pub name: String,
    pub origin: String,
    pub destination: String,
    pub country_flag_alt: String,
    pub country_flag_url: String,
    pub distance: String,
    pub remaining_demand: String,
    pub turnover: String,
    pub result_last_1_day: String,
    pub url: String,
}

/// One row of the airplanes listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirplaneSummary {
    pub id: u64,
    pub name: String,
    pub model: String,
    pub model_img_url: String,
    pub url: String,
    pub hub: String,
    pub hub_flag_alt: String,
    pub hub_flag_url: String,
    pub range: String,
    pub usage: String,
    pub wearing: String,
    pub age: String,
    pub capacity: String,
    pub result_last_7_days: String,
}

/// Parses one page of `/network/?page=N`
pub fn parse_lines_page(body: &str) -> std::result::Result<Page<LineSummary>, LayoutError> {
    let document = Html::parse_document(body);

    let container = require(&document, listing::LINES_CONTAINER, "lines_amgold_table_not_found")?;
    let table = select_all(container, listing::LINES_TABLE)?
        .into_iter()
        .nth(listing::LINES_TABLE_INDEX)
        .ok_or_else(|| {
            LayoutError::new(
                "lines_table_not_found",
                format!(
                    "'{}' holds no table at index {}",
                    listing::LINES_CONTAINER,
                    listing::LINES_TABLE_INDEX
                ),
            )
        })?;

    let mut items = Vec::new();
    for row in select_all(table, listing::ROW)? {
        if let Some(line) = parse_line_row(row)? {
            items.push(line);
        }
    }

    Ok(Page {
        items,
        has_next: has_next_page(&document)?,
    })
}

fn parse_line_row(row: ElementRef<'_>) -> std::result::Result<Option<LineSummary>, LayoutError> {
    if is_header_row(row)? {
        return Ok(None);
    }

    let cells = select_all(row, listing::CELL)?;
    if cells.len() <= listing::LINES_LINK_CELL {
        return Err(LayoutError::new(
            "lines_row_malformed",
            format!(
                "line row has {} cells, expected at least {}",
                cells.len(),
                listing::LINES_LINK_CELL + 1
            ),
        ));
    }

    let link = require_in(cells[listing::LINES_LINK_CELL], "a", "lines_row_malformed")?;
    let url = require_attr(link, "href", "lines_row_malformed")?;
    let id = trailing_id(&url).ok_or_else(|| {
        LayoutError::new("lines_row_malformed", format!("no line ID in link '{}'", url))
    })?;

    let name = element_text(cells[0]);
    let (origin, destination) = name.split_once('/').ok_or_else(|| {
        LayoutError::new("lines_row_malformed", format!("line name '{}' has no '/'", name))
    })?;
    let (origin, destination) = (sanitize_text(origin), sanitize_text(destination));

    let flag = require_in(cells[0], "img", "lines_row_malformed")?;

    Ok(Some(LineSummary {
        id,
        origin,
        destination,
        country_flag_alt: require_attr(flag, "alt", "lines_row_malformed")?,
        country_flag_url: require_attr(flag, "src", "lines_row_malformed")?,
        distance: element_text(cells[1]),
        remaining_demand: element_text(cells[2]),
        turnover: element_text(cells[3]),
        result_last_1_day: element_text(cells[4]),
        name,
        url,
    }))
}

/// Parses one page of `/aircraft?page=N`
pub fn parse_airplanes_page(body: &str) -> std::result::Result<Page<AirplaneSummary>, LayoutError> {
    let document = Html::parse_document(body);

    let table = require(&document, listing::AIRPLANES_TABLE, "airplanes_table_not_found")?;

    let mut items = Vec::new();
    for row in select_all(table, listing::ROW)? {
        if let Some(airplane) = parse_airplane_row(row)? {
            items.push(airplane);
        }
    }

    Ok(Page {
        items,
        has_next: has_next_page(&document)?,
    })
}

fn parse_airplane_row(row: ElementRef<'_>) -> std::result::Result<Option<AirplaneSummary>, LayoutError> {
    const TAG: &str = "airplanes_row_malformed";

    if is_header_row(row)? {
        return Ok(None);
    }

    let name_cell = require_in(row, listing::AIRPLANE_NAME, TAG)?;
    let url = require_attr(name_cell, "data-url", TAG)?;
    let id = trailing_id(&url)
        .ok_or_else(|| LayoutError::new(TAG, format!("no airplane ID in '{}'", url)))?;

    let cells = select_all(row, listing::CELL)?;
    if cells.len() < 8 {
        return Err(LayoutError::new(
            TAG,
            format!("airplane row has {} cells, expected 8", cells.len()),
        ));
    }

    let model_text = element_text(cells[0]);
    let model = sanitize_text(model_text.split('/').next().unwrap_or_default());
    let model_image = require_in(cells[0], listing::AIRPLANE_MODEL_IMAGE, TAG)?;
    let hub_flag = require_in(cells[1], "img", TAG)?;

    Ok(Some(AirplaneSummary {
        id,
        name: element_text(name_cell),
        model,
        model_img_url: require_attr(model_image, "data-aircraftimg", TAG)?,
        url,
        hub: element_text(cells[1]).chars().take(3).collect(),
        hub_flag_alt: require_attr(hub_flag, "alt", TAG)?,
        hub_flag_url: require_attr(hub_flag, "src", TAG)?,
        range: element_text(cells[2]),
        usage: element_text(cells[3]),
        wearing: element_text(cells[4]),
        age: element_text(cells[5]),
        capacity: element_text(cells[6]),
        result_last_7_days: element_text(cells[7]),
    }))
}

fn is_header_row(row: ElementRef<'_>) -> std::result::Result<bool, LayoutError> {
    Ok(!select_all(row, listing::HEADER_CELL)?.is_empty())
}

/// Pages of the lines listing, fetched through the session
pub struct LinesIndex<'s> {
    session: &'s mut AuthSession,
}

impl<'s> LinesIndex<'s> {
    pub fn new(session: &'s mut AuthSession) -> Self {
        Self { session }
    }
}

#[async_trait]
impl<'s> PageLoader for LinesIndex<'s> {
    type Item = LineSummary;

    async fn load_page(&mut self, page: u32) -> Result<Page<LineSummary>> {
        let response = self
            .session
            .request(PortalRequest::get(endpoints::lines_listing(page)))
            .await?;
        let parsed = self.session.parse(&response, parse_lines_page)?;
        tracing::info!("Found {} lines on page {}", parsed.items.len(), page);
        Ok(parsed)
    }
}

/// Pages of the airplanes listing, fetched through the session
pub struct AirplanesIndex<'s> {
    session: &'s mut AuthSession,
}

impl<'s> AirplanesIndex<'s> {
    pub fn new(session: &'s mut AuthSession) -> Self {
        Self { session }
    }
}

#[async_trait]
impl<'s> PageLoader for AirplanesIndex<'s> {
    type Item = AirplaneSummary;

    async fn load_page(&mut self, page: u32) -> Result<Page<AirplaneSummary>> {
        let referer = if page <= 1 {
            format!("{}/", endpoints::HOME)
        } else {
            endpoints::airplanes_listing(page - 1)
        };
        let request = PortalRequest::get(endpoints::airplanes_listing(page)).referer(referer);

        let response = self.session.request(request).await?;
        let parsed = self.session.parse(&response, parse_airplanes_page)?;
        tracing::info!("Found {} airplanes on page {}", parsed.items.len(), page);
        Ok(parsed)
    }
}

/// Fetches every row of the lines listing
pub async fn fetch_lines_index(session: &mut AuthSession, max_pages: u32) -> Result<Vec<LineSummary>> {
    let mut loader = LinesIndex::new(session);
    fetch_all_pages(&mut loader, max_pages).await
}

/// Fetches every row of the airplanes listing
pub async fn fetch_airplanes_index(
    session: &mut AuthSession,
    max_pages: u32,
) -> Result<Vec<AirplaneSummary>> {
    let mut loader = AirplanesIndex::new(session);
    fetch_all_pages(&mut loader, max_pages).await
}
