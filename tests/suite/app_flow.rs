//! Keyboard-driven journeys through the dashboard

use crossterm::event::KeyCode;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use groflow_engine::groflow_core::PromptKind;
use groflow_engine::groflow_types::{Money, TrustPoints, View};
use groflow_engine::{App, AppOptions, FormId, InputMode, NoticeKind};

use crate::common::{
    TEST_KEY, app_for, candidate_body, generate_path, press, render, type_text,
    wait_for_generation,
};

const ROADMAP_REPLY: &str = "```json
{\"weeks\": [
  {\"week\": 1, \"focus\": \"Be found\", \"tasks\": [\"Claim a map pin\", \"Flyer the bike shed\"]},
  {\"week\": 2, \"focus\": \"Get booked\", \"tasks\": [\"Sell a tune-up\", \"Ask for reviews\"]}
]}
```";

async fn mount_by_prompt(server: &MockServer, marker: &str, reply: &str) {
    Mock::given(method("POST"))
        .and(path(generate_path()))
        .and(body_string_contains(marker))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body(reply)))
        .expect(1)
        .mount(server)
        .await;
}

fn fill_plan_with_keys(app: &mut App) {
    press(app, KeyCode::Char('e'));
    assert_eq!(app.mode(), InputMode::Editing(FormId::Plan));
    type_text(app, "mobile bike repair");
    press(app, KeyCode::Tab);
    type_text(app, "$200");
    press(app, KeyCode::Tab);
    type_text(app, "10");
    press(app, KeyCode::Tab);
    type_text(app, "ten regular customers");
}

#[tokio::test(flavor = "multi_thread")]
async fn roadmap_to_tracker_to_recalibration() {
    let server = MockServer::start().await;
    mount_by_prompt(&server, "4-week roadmap", ROADMAP_REPLY).await;
    mount_by_prompt(&server, "Recalibrate the plan", "1. Fix one bike a day").await;

    let mut app = app_for(&server);
    press(&mut app, KeyCode::Char('3'));
    fill_plan_with_keys(&mut app);
    press(&mut app, KeyCode::Enter);

    assert_eq!(app.mode(), InputMode::Normal);
    assert_eq!(app.pending_generation(), Some(PromptKind::MonthlyRoadmap));
    assert!(render(&app, 120, 36).contains("Asking Gemini for monthly roadmap"));

    wait_for_generation(&mut app).await;
    let roadmap = app.roadmap().unwrap().as_ref().unwrap();
    assert_eq!(roadmap.weeks.len(), 2);
    assert_eq!(roadmap.task_count(), 4);
    let screen = render(&app, 120, 36);
    assert!(screen.contains("Week 1"));
    assert!(screen.contains("Flyer the bike shed"));

    press(&mut app, KeyCode::Char('l'));
    assert_eq!(app.session().tracker().len(), 4);

    press(&mut app, KeyCode::Char('4'));
    press(&mut app, KeyCode::Char(' '));
    assert_eq!(app.completion_percent(), Some(25));
    assert!(app.recalibration_available());

    press(&mut app, KeyCode::Char('s'));
    type_text(&mut app, "a week of rain");
    press(&mut app, KeyCode::Enter);
    assert_eq!(
        app.pending_generation(),
        Some(PromptKind::CrisisRecalibration)
    );

    wait_for_generation(&mut app).await;
    assert_eq!(app.recalibration(), Some("1. Fix one bike a day"));
    let screen = render(&app, 120, 40);
    assert!(screen.contains("Recalibrated plan"));
    assert!(screen.contains("[x]"));
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_roadmap_is_shown_raw_and_cannot_be_loaded() {
    let server = MockServer::start().await;
    mount_by_prompt(&server, "4-week roadmap", "Week 1: just post more").await;

    let mut app = app_for(&server);
    press(&mut app, KeyCode::Char('3'));
    fill_plan_with_keys(&mut app);
    press(&mut app, KeyCode::Enter);
    wait_for_generation(&mut app).await;

    assert!(matches!(app.roadmap(), Some(Err(_))));
    assert_eq!(app.notice().map(|n| n.kind), Some(NoticeKind::Error));
    assert!(render(&app, 120, 36).contains("just post more"));

    press(&mut app, KeyCode::Char('l'));
    assert!(app.session().tracker().is_empty());
    assert_eq!(app.notice().unwrap().text, "no roadmap to load yet");
}

#[tokio::test(flavor = "multi_thread")]
async fn credential_typed_in_settings_is_used_and_never_shown() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(generate_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body("Ship it")))
        .expect(1)
        .mount(&server)
        .await;

    let mut app = App::new(AppOptions {
        gateway: crate::common::gateway(&server),
        ..AppOptions::default()
    });

    press(&mut app, KeyCode::Char('2'));
    fill_plan_with_keys(&mut app);
    press(&mut app, KeyCode::Esc);
    press(&mut app, KeyCode::Char('g'));
    assert_eq!(app.notice().unwrap().text, "no API key set; add one in Settings");
    assert!(app.pending_generation().is_none());

    press(&mut app, KeyCode::Char('7'));
    press(&mut app, KeyCode::Char('e'));
    type_text(&mut app, TEST_KEY);
    assert!(!render(&app, 120, 30).contains(TEST_KEY));
    press(&mut app, KeyCode::Enter);
    assert!(app.has_api_key());
    assert!(!render(&app, 120, 30).contains(TEST_KEY));

    press(&mut app, KeyCode::Char('2'));
    press(&mut app, KeyCode::Char('g'));
    wait_for_generation(&mut app).await;
    assert_eq!(app.quick_actions(), Some("Ship it"));
    assert!(render(&app, 120, 30).contains("Ship it"));
}

#[test]
fn marketplace_and_investor_by_keyboard() {
    let mut app = App::new(AppOptions::default());

    press(&mut app, KeyCode::Char('5'));
    press(&mut app, KeyCode::Char('j'));
    press(&mut app, KeyCode::Char('v'));
    let thread = app.selected_campaign().unwrap();
    assert_eq!(thread.points, TrustPoints::new(1210));
    assert_eq!(app.session().ledger().balance(), TrustPoints::new(110));

    press(&mut app, KeyCode::Char('n'));
    type_text(&mut app, "Corner Cafe");
    press(&mut app, KeyCode::Tab);
    type_text(&mut app, "Ines");
    press(&mut app, KeyCode::Tab);
    press(&mut app, KeyCode::Tab);
    type_text(&mut app, "500");
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.session().campaigns().len(), 5);
    assert_eq!(app.selected_campaign().unwrap().name.as_str(), "Corner Cafe");

    press(&mut app, KeyCode::Char('6'));
    assert_eq!(app.view(), View::Investor);
    press(&mut app, KeyCode::Char('i'));
    type_text(&mut app, "2,500");
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.notice().map(|n| n.kind), Some(NoticeKind::Success));
    assert_eq!(app.session().pool().liquidity(), Money::from_units(2500));

    let screen = render(&app, 140, 40);
    assert!(screen.contains("Thread & Needle"));
    assert!(screen.contains("$2,500.00"));
    assert!(screen.contains("$125.00 expected monthly"));

    press(&mut app, KeyCode::Char('i'));
    type_text(&mut app, "900");
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.mode(), InputMode::Editing(FormId::Invest));
    assert_eq!(app.notice().map(|n| n.kind), Some(NoticeKind::Error));
    press(&mut app, KeyCode::Esc);

    press(&mut app, KeyCode::Char('q'));
    assert!(app.should_quit());
}
