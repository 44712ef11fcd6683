//! Line reconciliation against a mock game

use crate::common::{
    file_names, mount_line, mount_valid_session, pricing_page, request_count, test_config, Pricing,
};
use tempfile::TempDir;
use tycoon_autopilot::config::Config;
use tycoon_autopilot::reconcile::{ReconcileSummary, SyncOutcome};
use tycoon_autopilot::{AuthSession, AutopilotError, CategorizedValue, ErrorDisposition, LineReconciler};
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    server: MockServer,
    _dir: TempDir,
    config: Config,
    session: AuthSession,
    reconciler: LineReconciler,
}

async fn harness() -> Harness {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&server.uri(), dir.path());
    mount_valid_session(&server).await;

    Harness {
        session: AuthSession::new(&config).unwrap(),
        reconciler: LineReconciler::from_config(&config),
        server,
        _dir: dir,
        config,
    }
}

async fn mount_audit(server: &MockServer, id: u64, status: u16, times: u64) {
    let location = format!("/marketing/pricing/{}", id);
    Mock::given(method("GET"))
        .and(path(format!("/marketing/internalaudit/line/{}", id)))
        .and(query_param("fromPricing", "1"))
        .respond_with(
            ResponseTemplate::new(status)
                .insert_header("location", location.as_str()),
        )
        .expect(times)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_sync_persists_a_complete_line() {
    let mut h = harness().await;
    mount_line(&h.server, 1, &Pricing::settled()).await;

    let report = h.reconciler.sync_line(&mut h.session, 1).await.unwrap();
    assert_eq!(
        report.outcome,
        SyncOutcome::Reconciled(ReconcileSummary {
            audited: false,
            prices_pushed: false
        })
    );

    let line = h.reconciler.lines().load(1).unwrap().unwrap();
    assert!(line.is_complete(), "missing: {:?}", line.missing_fields());
    assert!(line.last_updated_at.is_some());
    assert_eq!(line.name.as_deref(), Some("CDG / JFK"));
    assert_eq!(line.display_name.as_deref(), Some("Paris Charles de Gaulle - New York"));
    assert_eq!(line.distance_km, Some(5834));
    assert_eq!(line.taxes, Some(1250));
    assert_eq!(line.total_demand, Some(CategorizedValue::new(500, 100, 20, 10)));
    assert_eq!(line.reliability_level, Some(20));
    assert_eq!(line.internal_audit_cost, Some(25000));
    assert!(line.can_update_prices);

    let airports = file_names(&h.config.storage.airports_dir);
    assert!(airports.contains(&"CDG.json".to_string()));
    assert!(airports.contains(&"JFK.json".to_string()));
}

#[tokio::test]
async fn test_second_sync_within_window_sends_nothing() {
    let mut h = harness().await;
    mount_line(&h.server, 1, &Pricing::settled()).await;

    h.reconciler.sync_line(&mut h.session, 1).await.unwrap();
    let record_path = h.reconciler.lines().path_for(1);
    let first_bytes = std::fs::read(&record_path).unwrap();
    let requests_before = request_count(&h.server).await;

    let report = h.reconciler.sync_line(&mut h.session, 1).await.unwrap();

    assert_eq!(report.outcome, SyncOutcome::Fresh);
    assert_eq!(request_count(&h.server).await, requests_before);
    assert_eq!(std::fs::read(&record_path).unwrap(), first_bytes);
}

#[tokio::test]
async fn test_stale_line_is_refreshed() {
    let mut h = harness().await;
    mount_line(&h.server, 1, &Pricing::settled()).await;
    h.reconciler.sync_line(&mut h.session, 1).await.unwrap();

    // Age the record past the two-day window
    let mut line = h.reconciler.lines().load(1).unwrap().unwrap();
    line.last_updated_at = line.last_updated_at.map(|t| t - chrono::Duration::days(2));
    h.reconciler.lines().save(&line).unwrap();

    let report = h.reconciler.sync_line(&mut h.session, 1).await.unwrap();
    assert!(matches!(report.outcome, SyncOutcome::Reconciled(_)));
}

#[tokio::test]
async fn test_reliability_of_fifty_does_not_audit() {
    let mut h = harness().await;
    let figures = Pricing {
        reliability: 50,
        ..Pricing::settled()
    };
    mount_line(&h.server, 1, &figures).await;
    mount_audit(&h.server, 1, 302, 0).await;

    let report = h.reconciler.sync_line(&mut h.session, 1).await.unwrap();
    assert_eq!(
        report.outcome,
        SyncOutcome::Reconciled(ReconcileSummary::default())
    );
}

#[tokio::test]
async fn test_reliability_of_fifty_one_audits() {
    let mut h = harness().await;
    let figures = Pricing {
        reliability: 51,
        ..Pricing::settled()
    };
    mount_line(&h.server, 2, &figures).await;
    mount_audit(&h.server, 2, 302, 1).await;

    let report = h.reconciler.sync_line(&mut h.session, 2).await.unwrap();
    assert_eq!(
        report.outcome,
        SyncOutcome::Reconciled(ReconcileSummary {
            audited: true,
            prices_pushed: false
        })
    );
}

#[tokio::test]
async fn test_audit_without_302_fails_and_persists_nothing() {
    let mut h = harness().await;
    let figures = Pricing {
        reliability: 70,
        ..Pricing::settled()
    };
    mount_line(&h.server, 3, &figures).await;
    mount_audit(&h.server, 3, 200, 1).await;

    let err = h.reconciler.sync_line(&mut h.session, 3).await.unwrap_err();

    assert!(matches!(err, AutopilotError::Protocol(_)));
    assert_eq!(err.disposition(), ErrorDisposition::Retry);
    assert!(h.reconciler.lines().load(3).unwrap().is_none());

    let dumps = file_names(&h.config.storage.dump_dir);
    assert!(dumps
        .iter()
        .any(|name| name.ends_with("__lines_audit_response_not_302.html")));
}

#[tokio::test]
async fn test_price_push_submits_ideal_prices_and_rereads() {
    let mut h = harness().await;

    let before = Pricing {
        current: [280, 900, 2000, 500],
        ..Pricing::settled()
    };

    Mock::given(method("GET"))
        .and(path("/network/showline/4"))
        .respond_with(ResponseTemplate::new(200).set_body_string(crate::common::detail_page(
            ("ORY", "Paris Orly"),
            ("NCE", "Nice"),
        )))
        .mount(&h.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/marketing/pricing/4"))
        .respond_with(ResponseTemplate::new(200).set_body_string(pricing_page(&before)))
        .up_to_n_times(1)
        .expect(1)
        .mount(&h.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/marketing/pricing/4"))
        .respond_with(ResponseTemplate::new(200).set_body_string(pricing_page(&Pricing::settled())))
        .expect(1)
        .mount(&h.server)
        .await;

    Mock::given(method("POST"))
        .and(path("/marketing/pricing/4"))
        .and(body_string_contains("line%5BpriceEco%5D=300"))
        .and(body_string_contains("line%5BpriceBus%5D=900"))
        .and(body_string_contains("line%5BpriceFirst%5D=2000"))
        .and(body_string_contains("line%5BpriceCargo%5D=500"))
        .and(body_string_contains("line%5B_token%5D=tok-price"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&h.server)
        .await;

    let report = h.reconciler.sync_line(&mut h.session, 4).await.unwrap();
    assert_eq!(
        report.outcome,
        SyncOutcome::Reconciled(ReconcileSummary {
            audited: false,
            prices_pushed: true
        })
    );

    let line = h.reconciler.lines().load(4).unwrap().unwrap();
    assert_eq!(line.current_cost, line.ideal_cost);
    assert_eq!(line.origin.map(|a| a.abbrev).as_deref(), Some("ORY"));
}

#[tokio::test]
async fn test_no_price_push_without_pricing_form() {
    let mut h = harness().await;
    let figures = Pricing {
        current: [1, 1, 1, 1],
        form_token: None,
        ..Pricing::settled()
    };
    mount_line(&h.server, 5, &figures).await;

    Mock::given(method("POST"))
        .and(path("/marketing/pricing/5"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&h.server)
        .await;

    let report = h.reconciler.sync_line(&mut h.session, 5).await.unwrap();
    assert_eq!(
        report.outcome,
        SyncOutcome::Reconciled(ReconcileSummary::default())
    );
    assert!(!h.reconciler.lines().load(5).unwrap().unwrap().can_update_prices);
}

#[tokio::test]
async fn test_price_form_without_token_is_a_protocol_error() {
    let mut h = harness().await;
    let figures = Pricing {
        current: [1, 1, 1, 1],
        ..Pricing::settled()
    };
    let page = pricing_page(&figures).replace(
        r#"<input id="line__token" name="line[_token]" value="tok-price">"#,
        "",
    );

    Mock::given(method("GET"))
        .and(path("/network/showline/8"))
        .respond_with(ResponseTemplate::new(200).set_body_string(crate::common::detail_page(
            ("CDG", "Paris Charles de Gaulle"),
            ("JFK", "New York"),
        )))
        .mount(&h.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/marketing/pricing/8"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page))
        .mount(&h.server)
        .await;

    Mock::given(method("POST"))
        .and(path("/marketing/pricing/8"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&h.server)
        .await;

    let err = h.reconciler.sync_line(&mut h.session, 8).await.unwrap_err();

    assert!(matches!(err, AutopilotError::Protocol(_)));
    assert!(h.reconciler.lines().load(8).unwrap().is_none());
}

#[tokio::test]
async fn test_corrupt_record_is_fatal_before_any_request() {
    let mut h = harness().await;
    let record_path = h.reconciler.lines().path_for(6);
    std::fs::create_dir_all(record_path.parent().unwrap()).unwrap();
    std::fs::write(&record_path, "{\"id\": 6, \"origin\": ").unwrap();

    let err = h.reconciler.sync_line(&mut h.session, 6).await.unwrap_err();

    assert!(matches!(err, AutopilotError::CorruptState { .. }));
    assert_eq!(err.disposition(), ErrorDisposition::Fatal);
    assert_eq!(request_count(&h.server).await, 0);
}

#[tokio::test]
async fn test_missing_detail_container_is_retryable() {
    let mut h = harness().await;

    Mock::given(method("GET"))
        .and(path("/network/showline/7"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>Maintenance</body></html>"))
        .mount(&h.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/marketing/pricing/7"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&h.server)
        .await;

    let err = h.reconciler.sync_line(&mut h.session, 7).await.unwrap_err();
    assert!(matches!(err, AutopilotError::Protocol(_)));
    assert_eq!(err.disposition(), ErrorDisposition::Retry);
    assert!(h.reconciler.lines().load(7).unwrap().is_none());
}
