//! Paths of the game endpoints, relative to the configured base URL

pub const HOME: &str = "/home";
pub const LOGIN: &str = "/login";
pub const LOGIN_CHECK: &str = "/login_check";
pub const NETWORK: &str = "/network/";
pub const WHEEL: &str = "/home/wheeltcgame";
pub const WHEEL_PLAY: &str = "/home/wheeltcgame/play";
pub const CARD_HOLDER: &str = "/shop/cardholder";
pub const WORKSHOP: &str = "/shop/workshop";

pub fn lines_listing(page: u32) -> String {
    format!("/network/?page={}", page)
}

pub fn airplanes_listing(page: u32) -> String {
    format!("/aircraft?page={}", page)
}

pub fn line_detail(id: u64) -> String {
    format!("/network/showline/{}", id)
}

pub fn line_pricing(id: u64) -> String {
    format!("/marketing/pricing/{}", id)
}

pub fn line_audit(id: u64) -> String {
    format!("/marketing/internalaudit/line/{}?fromPricing=1", id)
}
