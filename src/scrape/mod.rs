//! Page parsing and listing traversal
//!
//! Parsers are plain functions from a response body to a typed value, so
//! they can be tested against fixtures without a server. Everything that
//! talks to the game goes through [`crate::session::AuthSession`].

pub mod dump;
pub mod endpoints;
pub mod html;
pub mod layout;
pub mod listings;
pub mod pages;
pub mod pagination;

pub use dump::ErrorDumper;
pub use html::LayoutError;
pub use listings::{
    fetch_airplanes_index, fetch_lines_index, AirplaneSummary, AirplanesIndex, LineSummary,
    LinesIndex,
};
pub use pages::{parse_line_details, parse_login_csrf, parse_pricing_page, LineDetails, MarketingSnapshot};
pub use pagination::{fetch_all_pages, Page, PageLoader};
