//! Small helpers shared by every page parser

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

/// A page did not have the structure its parser expects
///
/// `tag` names the failure kind; it becomes part of the error dump file name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct LayoutError {
    pub tag: &'static str,
    pub message: String,
}

impl LayoutError {
    pub fn new(tag: &'static str, message: impl Into<String>) -> Self {
        Self {
            tag,
            message: message.into(),
        }
    }
}

/// Compiles a CSS selector
pub fn selector(css: &str) -> Result<Selector, LayoutError> {
    Selector::parse(css)
        .map_err(|e| LayoutError::new("invalid_selector", format!("bad selector '{}': {:?}", css, e)))
}

/// First document element matching `css`, or a layout error tagged `tag`
pub fn require<'a>(document: &'a Html, css: &str, tag: &'static str) -> Result<ElementRef<'a>, LayoutError> {
    let sel = selector(css)?;
    document
        .select(&sel)
        .next()
        .ok_or_else(|| LayoutError::new(tag, format!("element '{}' was not found", css)))
}

/// First element under `scope` matching `css`, or a layout error tagged `tag`
pub fn require_in<'a>(
    scope: ElementRef<'a>,
    css: &str,
    tag: &'static str,
) -> Result<ElementRef<'a>, LayoutError> {
    let sel = selector(css)?;
    scope
        .select(&sel)
        .next()
        .ok_or_else(|| LayoutError::new(tag, format!("element '{}' was not found", css)))
}

/// Every element under `scope` matching `css`
pub fn select_all<'a>(scope: ElementRef<'a>, css: &str) -> Result<Vec<ElementRef<'a>>, LayoutError> {
    let sel = selector(css)?;
    Ok(scope.select(&sel).collect())
}

/// Attribute value, or a layout error tagged `tag`
pub fn require_attr(element: ElementRef<'_>, name: &str, tag: &'static str) -> Result<String, LayoutError> {
    element.value().attr(name).map(str::to_string).ok_or_else(|| {
        LayoutError::new(
            tag,
            format!("<{}> has no '{}' attribute", element.value().name(), name),
        )
    })
}

/// Whitespace-collapsed text content of an element
pub fn element_text(element: ElementRef<'_>) -> String {
    sanitize_text(&element.text().collect::<String>())
}

/// Collapses runs of whitespace into single spaces and trims the ends
pub fn sanitize_text(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keeps only the ASCII digits of `input` and parses them
///
/// `"$ 1,250"` becomes `1250`; text without any digit yields None.
pub fn digits_only(input: &str) -> Option<u64> {
    let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Last `/`-separated segment of a link, parsed as an ID
pub fn trailing_id(href: &str) -> Option<u64> {
    href.trim_end_matches('/').rsplit('/').next()?.parse().ok()
}
