//! Unit tests for the engine crate.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use groflow_core::BookkeepingError;
use groflow_types::{Money, TrustPoints};

use super::*;

fn test_app() -> App {
    App::new(AppOptions::default())
}

fn app_with_key(base_url: String) -> App {
    App::new(AppOptions {
        gateway: GatewayConfig {
            base_url,
            model: "gemini-test".to_string(),
        },
        api_key: Some(ApiKey::new("test-key").unwrap()),
        ..AppOptions::default()
    })
}

fn fill(app: &mut App, id: FormId, values: &[&str]) {
    let form = app.form_mut(id);
    for (i, value) in values.iter().enumerate() {
        form.set_value(i, value);
    }
}

fn fill_plan(app: &mut App) {
    fill(app, FormId::Plan, &["home bakery", "50", "5", "more weekend orders"]);
}

fn notice_kind(app: &App) -> Option<NoticeKind> {
    app.notice().map(|n| n.kind)
}

async fn wait_for_generation(app: &mut App) {
    for _ in 0..200 {
        app.tick();
        if app.pending_generation().is_none() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("generation did not finish");
}

#[test]
fn navigation_is_plain_assignment() {
    let mut app = test_app();
    assert_eq!(app.view(), View::Home);

    app.navigate(View::Investor);
    assert_eq!(app.view(), View::Investor);

    app.navigate(View::Investor);
    assert_eq!(app.view(), View::Investor);

    app.next_view();
    assert_eq!(app.view(), View::Settings);
    app.next_view();
    assert_eq!(app.view(), View::Home);
    app.prev_view();
    assert_eq!(app.view(), View::Settings);
}

#[test]
fn navigating_ends_editing() {
    let mut app = test_app();
    app.navigate(View::Marketplace);
    app.begin_edit(FormId::Campaign);
    assert_eq!(app.mode(), InputMode::Editing(FormId::Campaign));

    app.navigate(View::Home);
    assert_eq!(app.mode(), InputMode::Normal);
    assert!(app.editing_form_mut().is_none());
}

#[test]
fn vouch_through_app_moves_points() {
    let mut app = test_app();
    app.navigate(View::Marketplace);
    let campaign = app.selected_campaign().unwrap().id;
    assert_eq!(
        app.session().campaigns().get(campaign).unwrap().points,
        TrustPoints::new(850)
    );

    app.vouch_selected();

    assert_eq!(notice_kind(&app), Some(NoticeKind::Success));
    assert_eq!(app.session().ledger().balance(), TrustPoints::new(110));
    assert_eq!(
        app.session().campaigns().get(campaign).unwrap().points,
        TrustPoints::new(860)
    );
}

#[test]
fn vouch_without_balance_changes_nothing() {
    let mut app = App::new(AppOptions {
        seed: SessionSeed {
            trust_points: TrustPoints::new(5),
            ..SessionSeed::default()
        },
        ..AppOptions::default()
    });
    app.navigate(View::Marketplace);
    let before = app.selected_campaign().unwrap().points;

    assert!(matches!(
        app.try_vouch_selected(),
        Err(ActionError::Bookkeeping(
            BookkeepingError::InsufficientFunds { .. }
        ))
    ));
    app.vouch_selected();

    assert_eq!(notice_kind(&app), Some(NoticeKind::Error));
    assert_eq!(app.session().ledger().balance(), TrustPoints::new(5));
    assert_eq!(app.selected_campaign().unwrap().points, before);
}

#[test]
fn selection_is_clamped_to_the_list() {
    let mut app = test_app();
    app.navigate(View::Marketplace);
    for _ in 0..10 {
        app.select_next();
    }
    assert_eq!(app.marketplace_selected(), 3);
    app.select_prev();
    assert_eq!(app.marketplace_selected(), 2);

    app.navigate(View::Investor);
    for _ in 0..10 {
        app.select_next();
    }
    assert_eq!(app.investor_selected(), 1);
}

#[test]
fn post_campaign_form_appends_and_selects() {
    let mut app = test_app();
    app.navigate(View::Marketplace);
    app.begin_edit(FormId::Campaign);
    fill(
        &mut app,
        FormId::Campaign,
        &["Solar Snacks", "Lu", "Dried fruit", "1500", ""],
    );

    app.submit();

    assert_eq!(app.mode(), InputMode::Normal);
    assert_eq!(notice_kind(&app), Some(NoticeKind::Success));
    let posted = app.selected_campaign().unwrap();
    assert_eq!(posted.name.as_str(), "Solar Snacks");
    assert_eq!(posted.points, TrustPoints::ZERO);
    assert!(posted.image_reference.is_none());
    assert!(app.form(FormId::Campaign).value(0).is_empty());
}

#[test]
fn duplicate_campaign_name_is_flagged() {
    let mut app = test_app();
    app.begin_edit(FormId::Campaign);
    fill(
        &mut app,
        FormId::Campaign,
        &["Thread & Needle", "Ama", "", "800", ""],
    );

    app.submit();

    let notice = app.notice().unwrap();
    assert_eq!(notice.kind, NoticeKind::Info);
    assert!(notice.text.contains("already uses this name"));
    assert_eq!(app.session().campaigns().duplicate_names().len(), 1);
}

#[test]
fn invalid_campaign_form_stays_open() {
    let mut app = test_app();
    app.begin_edit(FormId::Campaign);
    fill(&mut app, FormId::Campaign, &["Solar Snacks", "Lu", "", "zero", ""]);
    let before = app.session().campaigns().len();

    app.submit();

    assert_eq!(app.mode(), InputMode::Editing(FormId::Campaign));
    assert_eq!(notice_kind(&app), Some(NoticeKind::Error));
    assert_eq!(app.session().campaigns().len(), before);
}

#[test]
fn invest_flow_through_investor_screen() {
    let mut app = test_app();
    app.navigate(View::Investor);
    let target = app.selected_eligible().unwrap().id;

    app.begin_edit(FormId::Invest);
    fill(&mut app, FormId::Invest, &["2000"]);
    app.submit();

    assert_eq!(notice_kind(&app), Some(NoticeKind::Success));
    assert_eq!(app.session().pool().liquidity(), Money::from_units(3000));
    let funded = app.session().campaigns().get(target).unwrap();
    assert!(funded.funded_by_investor);
    assert_eq!(funded.investor_funding, Money::from_units(2000));
    assert_eq!(app.session().pool().investments().len(), 1);

    app.begin_edit(FormId::Invest);
    fill(&mut app, FormId::Invest, &["1000"]);
    assert!(matches!(
        app.try_invest_selected(),
        Err(ActionError::Bookkeeping(BookkeepingError::AlreadyFunded(id))) if id == target
    ));
    assert_eq!(app.session().pool().liquidity(), Money::from_units(3000));
}

#[test]
fn invest_beyond_liquidity_is_rejected() {
    let mut app = test_app();
    app.navigate(View::Investor);
    app.begin_edit(FormId::Invest);
    fill(&mut app, FormId::Invest, &["6000"]);

    app.submit();

    assert_eq!(app.mode(), InputMode::Editing(FormId::Invest));
    assert!(app.notice().unwrap().is_error());
    assert_eq!(app.session().pool().liquidity(), Money::from_units(5000));
    assert!(app.session().pool().investments().is_empty());
}

#[test]
fn add_liquidity_rejects_zero() {
    let mut app = test_app();
    fill(&mut app, FormId::Liquidity, &["0"]);
    assert!(matches!(
        app.try_add_liquidity(),
        Err(ActionError::Form(FormError::OutOfRange { .. }))
    ));

    fill(&mut app, FormId::Liquidity, &["250.50"]);
    app.try_add_liquidity().unwrap();
    assert_eq!(
        app.session().pool().liquidity(),
        Money::from_cents(525_050)
    );
}

#[test]
fn credential_is_set_masked_and_cleared() {
    let mut app = test_app();
    app.begin_edit(FormId::Credential);
    fill(&mut app, FormId::Credential, &["AIzaSyExample0000x9Q2"]);

    app.submit();

    assert!(app.has_api_key());
    assert_eq!(app.masked_api_key().as_deref(), Some("AIza…x9Q2"));
    assert!(app.form(FormId::Credential).value(0).is_empty());
    assert!(!format!("{app:?}").contains("AIzaSyExample0000x9Q2"));
    assert!(!app.notice().unwrap().text.contains("AIzaSyExample0000x9Q2"));

    app.clear_credential();
    assert!(!app.has_api_key());
}

#[test]
fn generation_needs_a_credential() {
    let mut app = test_app();
    fill_plan(&mut app);
    assert!(matches!(
        app.try_request_generation(PromptKind::QuickActions),
        Err(ActionError::MissingCredential)
    ));
    assert!(app.pending_generation().is_none());
}

#[test]
fn generation_validates_the_plan_form() {
    let mut app = app_with_key("http://127.0.0.1:9".to_string());
    fill(&mut app, FormId::Plan, &["home bakery", "fifty", "5", "orders"]);
    assert!(matches!(
        app.try_request_generation(PromptKind::QuickActions),
        Err(ActionError::Form(FormError::Amount { field: "Budget", .. }))
    ));
    assert!(app.pending_generation().is_none());
}

#[test]
fn generation_outside_a_runtime_is_reported() {
    let mut app = app_with_key("http://127.0.0.1:9".to_string());
    fill_plan(&mut app);
    assert!(matches!(
        app.try_request_generation(PromptKind::QuickActions),
        Err(ActionError::NoRuntime)
    ));
}

#[test]
fn roadmap_reply_is_parsed_and_loaded() {
    let mut app = test_app();
    let reply = "```json\n{\"weeks\":[\
        {\"week\":1,\"focus\":\"Visibility\",\"tasks\":[\"Claim Google profile\",\"Post daily\"]},\
        {\"week\":2,\"focus\":\"Offers\",\"tasks\":[\"Weekend bundle\"]}]}\n```";

    app.apply_generation(PromptKind::MonthlyRoadmap, Ok(reply.to_string()));

    assert_eq!(notice_kind(&app), Some(NoticeKind::Success));
    let roadmap = app.roadmap().unwrap().as_ref().unwrap();
    assert_eq!(roadmap.task_count(), 3);

    app.load_roadmap_into_tracker();
    assert_eq!(app.session().tracker().len(), 3);
    assert_eq!(app.session().tracker().tasks()[2].week, Some(2));
}

#[test]
fn malformed_roadmap_keeps_raw_text() {
    let mut app = test_app();
    app.apply_generation(
        PromptKind::MonthlyRoadmap,
        Ok("Week 1: post more".to_string()),
    );

    assert_eq!(notice_kind(&app), Some(NoticeKind::Error));
    let malformed = app.roadmap().unwrap().as_ref().unwrap_err();
    assert_eq!(malformed.raw, "Week 1: post more");

    assert!(matches!(app.try_load_roadmap(), Err(ActionError::NoRoadmap)));
    assert!(app.session().tracker().is_empty());
}

#[test]
fn generation_error_leaves_session_alone() {
    let mut app = test_app();
    let balance = app.session().ledger().balance();
    app.apply_generation(
        PromptKind::QuickActions,
        Err(GenerationError::RateLimited),
    );

    assert!(app.notice().unwrap().is_error());
    assert!(app.quick_actions().is_none());
    assert_eq!(app.session().ledger().balance(), balance);
}

#[test]
fn reply_text_is_sanitized() {
    let mut app = test_app();
    app.apply_generation(
        PromptKind::QuickActions,
        Ok("1. Post\x1b[2J daily\n2. Ask".to_string()),
    );
    assert_eq!(app.quick_actions(), Some("1. Post daily\n2. Ask"));
}

#[test]
fn recalibration_is_gated_on_completion() {
    let mut app = app_with_key("http://127.0.0.1:9".to_string());
    fill_plan(&mut app);
    fill(&mut app, FormId::Setback, &["sick for a week"]);

    assert!(matches!(
        app.try_request_generation(PromptKind::CrisisRecalibration),
        Err(ActionError::EmptyTracker)
    ));

    for task in ["a", "b", "c", "d"] {
        fill(&mut app, FormId::NewTask, &[task]);
        app.try_add_task().unwrap();
    }
    app.navigate(View::Tracker);
    for _ in 0..3 {
        app.select_prev();
    }
    for _ in 0..3 {
        app.toggle_selected_task();
        app.select_next();
    }
    assert_eq!(app.completion_percent(), Some(75));
    assert!(!app.recalibration_available());
    assert!(matches!(
        app.try_request_generation(PromptKind::CrisisRecalibration),
        Err(ActionError::RecalibrationNotNeeded {
            rate: 75,
            threshold: 50
        })
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn quick_actions_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-test:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": "1. Post a reel"}]}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut app = app_with_key(server.uri());
    app.navigate(View::Assistant);
    app.begin_edit(FormId::Plan);
    fill_plan(&mut app);
    app.submit();

    assert_eq!(app.pending_generation(), Some(PromptKind::QuickActions));
    assert_eq!(notice_kind(&app), Some(NoticeKind::Info));
    assert!(matches!(
        app.try_request_generation(PromptKind::MonthlyRoadmap),
        Err(ActionError::GenerationInFlight(PromptKind::QuickActions))
    ));

    wait_for_generation(&mut app).await;
    assert_eq!(app.quick_actions(), Some("1. Post a reel"));
    assert_eq!(notice_kind(&app), Some(NoticeKind::Success));
}

#[tokio::test(flavor = "multi_thread")]
async fn rate_limited_request_is_sent_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&server)
        .await;

    let mut app = app_with_key(server.uri());
    let balance = app.session().ledger().balance();
    fill_plan(&mut app);
    app.request_generation(PromptKind::QuickActions);
    wait_for_generation(&mut app).await;

    assert!(app.notice().unwrap().text.contains("rate limited"));
    assert!(app.quick_actions().is_none());
    assert_eq!(app.session().ledger().balance(), balance);
}
