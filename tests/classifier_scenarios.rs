// tests/classifier_scenarios.rs
//
// End-to-end classifier scenarios through VolumeReducer::decide.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use news_volume_reducer::clock::ManualClock;
use news_volume_reducer::config::FilterConfig;
use news_volume_reducer::{CandidateItem, ReasonCode, VolumeReducer};

const CLEAN: &str = "The harbor authority opened a new ferry terminal on Monday, \
    cutting the crossing time to the islands by twenty minutes and adding covered \
    waiting areas, bicycle racks and a small market for local growers.";

fn reducer() -> VolumeReducer {
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2025, 5, 12, 7, 30, 0).unwrap()));
    VolumeReducer::with_clock(FilterConfig::default(), clock).expect("default patterns compile")
}

fn item(id: &str, title: &str, body: &str, url: &str) -> CandidateItem {
    CandidateItem::new(id, title, body, url)
}

#[test]
fn clean_item_passes() {
    let v = reducer().decide(&item("1", "Ferry terminal opens", CLEAN, "https://port.example/news/ferry"), &[]);
    assert!(v.accept, "unexpected reasons: {:?}", v.reasons);
    assert!(v.reasons.is_empty());
}

#[test]
fn forty_char_body_is_low_value() {
    let body = "Short note about nothing in particular.."; // 40 chars
    assert_eq!(body.chars().count(), 40);
    let v = reducer().decide(&item("2", "Brief", body, "https://port.example/b"), &[]);
    assert!(!v.accept);
    assert!(v.has(ReasonCode::LowValueContent));
}

#[test]
fn reuters_parenthetical_is_wire_service() {
    let body = format!("LONDON (Reuters) {CLEAN}");
    let v = reducer().decide(&item("3", "Markets rally (Reuters)", &body, "https://wire.example/m"), &[]);
    assert!(!v.accept);
    assert!(v.has(ReasonCode::WireService));
}

#[test]
fn three_bylines_is_wire_but_two_is_not() {
    let two = format!("By: Ana Ruiz. Reporter: Tom Lee. {CLEAN}");
    let three = format!("By: Ana Ruiz. Reporter: Tom Lee. Correspondent: Kim Ode. {CLEAN}");
    let r = reducer();
    assert!(!r.decide(&item("4", "Ferry", &two, "https://p.example/4"), &[]).has(ReasonCode::WireService));
    assert!(r.decide(&item("5", "Ferry", &three, "https://p.example/5"), &[]).has(ReasonCode::WireService));
}

#[test]
fn press_release_boilerplate_is_pr_content() {
    let body = format!("FOR IMMEDIATE RELEASE. {CLEAN}");
    let v = reducer().decide(&item("6", "Ferry operator expands", &body, "https://p.example/6"), &[]);
    assert_eq!(v.reasons, vec![ReasonCode::PrContent]);
}

#[test]
fn many_company_mentions_is_pr_content() {
    let names = ["Acme Inc", "Borealis Corp", "Cobalt Ltd", "Delta LLC", "Ember Co", "Fjord Inc"];
    let body = format!("{CLEAN} Partners include {}.", names.join(", "));
    let v = reducer().decide(&item("7", "Partners named", &body, "https://p.example/7"), &[]);
    assert!(v.has(ReasonCode::PrContent));

    let five = format!("{CLEAN} Partners include {}.", names[..5].join(", "));
    let v = reducer().decide(&item("8", "Partners named", &five, "https://p.example/8"), &[]);
    assert!(!v.has(ReasonCode::PrContent));
}

#[test]
fn repetitive_body_is_low_value() {
    let body = "ferry ".repeat(60);
    let v = reducer().decide(&item("9", "Ferry", &body, "https://p.example/9"), &[]);
    assert!(v.has(ReasonCode::LowValueContent));
}

#[test]
fn press_release_url_is_filtered_regardless_of_content() {
    let v = reducer().decide(&item("10", "Ferry terminal opens", CLEAN, "https://example.com/press-release/123"), &[]);
    assert_eq!(v.reasons, vec![ReasonCode::FilteredUrl]);
}

#[test]
fn url_query_does_not_trigger_path_filter() {
    let v = reducer().decide(
        &item("11", "Ferry terminal opens", CLEAN, "https://port.example/news?ref=/sponsored/"),
        &[],
    );
    assert!(v.accept, "{:?}", v.reasons);
}

#[test]
fn reasons_accumulate_in_fixed_order() {
    let v = reducer().decide(
        &item("12", "Breaking (AP)", "Press release: tiny", "https://p.example/jobs/1"),
        &[],
    );
    assert_eq!(
        v.reasons,
        vec![
            ReasonCode::LowValueContent,
            ReasonCode::WireService,
            ReasonCode::PrContent,
            ReasonCode::FilteredUrl,
        ]
    );
}

#[test]
fn decide_is_deterministic_for_same_cache_state() {
    let a = reducer().decide(&item("13", "Ferry (AFP)", CLEAN, "https://p.example/weather/x"), &[]);
    let b = reducer().decide(&item("13", "Ferry (AFP)", CLEAN, "https://p.example/weather/x"), &[]);
    assert_eq!(a, b);
}
