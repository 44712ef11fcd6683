//! Shared fixtures: configuration pointing at a mock server and canned pages

use std::path::Path;
use tycoon_autopilot::config::{
    AccountConfig, BonusConfig, Config, RemoteConfig, ScheduleConfig, StorageConfig,
};
use tycoon_autopilot::scrape::layout::{pricing, BucketSlots};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration against `base_url`, storing everything in `dir`
///
/// Pacing and retry delays are zero and bonuses are disabled.
pub fn test_config(base_url: &str, dir: &Path) -> Config {
    Config {
        remote: RemoteConfig {
            base_url: base_url.to_string(),
            ..RemoteConfig::default()
        },
        account: AccountConfig {
            email: Some("pilot@example.com".to_string()),
            password: Some("hunter2".to_string()),
        },
        storage: StorageConfig {
            cookies_path: dir.join("cookies.json"),
            lines_dir: dir.join("lines"),
            airports_dir: dir.join("airports"),
            dump_dir: dir.join("dumps"),
            lines_summary_path: dir.join("lines.csv"),
            airplanes_summary_path: dir.join("airplanes.csv"),
            bonus_results_dir: dir.join("bonuses"),
        },
        schedule: ScheduleConfig {
            request_interval_min: 0,
            request_interval_max: 0,
            retry_delay: 0,
            ..ScheduleConfig::default()
        },
        bonuses: BonusConfig { enabled: false },
    }
}

pub fn home_page() -> String {
    r#"<html><body><div id="mainContent"><h1>Welcome back</h1></div></body></html>"#.to_string()
}

pub fn login_page(token: &str) -> String {
    format!(
        r#"<html><body><form action="/login_check" method="post">
<input type="hidden" name="_csrf_token" value="{}">
<input name="_username"><input name="_password" type="password">
</form></body></html>"#,
        token
    )
}

/// Mounts a validity probe that always succeeds
pub async fn mount_valid_session(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/home"))
        .respond_with(ResponseTemplate::new(200).set_body_string(home_page()))
        .mount(server)
        .await;
}

pub fn detail_page(origin: (&str, &str), destination: (&str, &str)) -> String {
    format!(
        r#"<html><body><div id="content">
<div class="lineTitle"><span>Line</span> {origin_name} - {destination_name}</div>
<ul id="box1"><li>Hub</li><li>Country</li><li>Category</li>
  <li>From <b>{origin_code} / {origin_name}</b></li></ul>
<ul id="box2"><li>Route</li><li>Distance <b>5 834 km</b></li><li>Taxes <b>$ 1 250</b></li>
  <li>To <b>{destination_code} / {destination_name}</b></li></ul>
</div></body></html>"#,
        origin_code = origin.0,
        origin_name = origin.1,
        destination_code = destination.0,
        destination_name = destination.1,
    )
}

/// Figures shown on a pricing page
pub struct Pricing {
    pub ideal: [u64; 4],
    pub current: [u64; 4],
    pub reliability: u32,
    /// Price form with this CSRF token; None hides the form
    pub form_token: Option<&'static str>,
}

impl Pricing {
    /// A reliable line whose prices already match
    pub fn settled() -> Self {
        Self {
            ideal: [300, 900, 2000, 500],
            current: [300, 900, 2000, 500],
            reliability: 20,
            form_token: Some("tok-price"),
        }
    }
}

pub fn pricing_page(figures: &Pricing) -> String {
    let mut slots: Vec<String> = (0..90).map(|_| "<span>-</span>".to_string()).collect();

    let mut place = |at: BucketSlots, values: [u64; 4]| {
        let indexes = [at.economic, at.executive, at.first_class, at.cargo];
        for (index, value) in indexes.into_iter().zip(values) {
            slots[index] = format!("<span>$ {}</span>", value);
        }
    };
    place(pricing::IDEAL_COST, figures.ideal);
    place(pricing::CURRENT_COST, figures.current);
    place(pricing::TOTAL_DEMAND, [500, 100, 20, 10]);
    place(pricing::TURNOVER, [150_000, 90_000, 40_000, 5_000]);

    slots[pricing::LAST_AUDIT_DATE] = "<span>01/02/2024</span>".to_string();
    slots[pricing::RELIABILITY] = format!(
        r#"<span class="reliability level{}"></span>"#,
        figures.reliability
    );

    let form = match figures.form_token {
        Some(token) => format!(
            r#"<form method="post"><input id="line__token" name="line[_token]" value="{}"></form>"#,
            token
        ),
        None => String::new(),
    };

    format!(
        r#"<html><body><div id="marketing_linePricing">{}<input id="internalAuditCost" value="25 000">{}</div></body></html>"#,
        slots.concat(),
        form
    )
}

/// Mounts the detail and pricing pages of line `id`
pub async fn mount_line(server: &MockServer, id: u64, figures: &Pricing) {
    Mock::given(method("GET"))
        .and(path(format!("/network/showline/{}", id)))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(detail_page(
                ("CDG", "Paris Charles de Gaulle"),
                ("JFK", "New York"),
            )),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/marketing/pricing/{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_string(pricing_page(figures)))
        .mount(server)
        .await;
}

pub fn lines_page(ids: &[u64], has_next: bool) -> String {
    let rows: String = ids
        .iter()
        .map(|id| {
            format!(
                r#"<tr><td><img alt="France" src="/flags/fr.png">CDG / JFK</td><td>5 834 km</td>
<td>1 200</td><td>$ 340 000</td><td>$ 12 000</td><td></td>
<td><a href="/network/showline/{}">Details</a></td></tr>"#,
                id
            )
        })
        .collect();

    format!(
        r#"<html><body><div id="displayPro">
<table><tr><td>filters</td></tr></table>
<table><tr><th>Route</th></tr>{}</table>
</div>{}</body></html>"#,
        rows,
        pagination(has_next)
    )
}

pub fn airplanes_page(ids: &[u64], has_next: bool) -> String {
    let rows: String = ids
        .iter()
        .map(|id| {
            format!(
                r#"<tr><td><img class="zoomAircraft" data-aircraftimg="/img/a320.png">A320 / Airbus</td>
<td>CDG <img alt="France" src="/flags/fr.png"></td><td>6 100 km</td><td>78%</td><td>12%</td>
<td>3 years</td><td>180</td><td>$ 54 000</td>
<td><span class="editAircraftName" data-url="/aircraft/edit/{id}">Plane {id}</span></td></tr>"#,
                id = id
            )
        })
        .collect();

    format!(
        r#"<html><body><table class="aircraftListViewTable"><tr><th>Model</th></tr>{}</table>{}</body></html>"#,
        rows,
        pagination(has_next)
    )
}

fn pagination(has_next: bool) -> String {
    if has_next {
        r##"<div class="pagination"><span class="current">1</span><span class="next"><a href="#">next</a></span></div>"##.to_string()
    } else {
        r#"<div class="pagination"><span class="current">1</span></div>"#.to_string()
    }
}

/// Number of requests the server has seen so far
pub async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .map(|requests| requests.len())
        .unwrap_or(0)
}

/// Names of the files in `dir`, empty when it does not exist
pub fn file_names(dir: &Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.file_name().to_string_lossy().to_string())
                .collect()
        })
        .unwrap_or_default()
}
