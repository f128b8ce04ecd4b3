use std::sync::Once;

use pretty_assertions::assert_eq;
use research_core::{
    update, AppState, Effect, Msg, Notice, Preset, PresetCatalog, QueryGate, Severity,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(research_logging::initialize_for_tests);
}

fn catalog() -> PresetCatalog {
    PresetCatalog::new(vec![
        Preset::new("rates", "https://rates.example.com/today"),
        Preset::new("survey", "https://survey.example.com/pmms"),
    ])
}

fn submit_urls(state: AppState, presets: &[&str], fields: &[&str]) -> (AppState, Vec<Effect>) {
    let labels = presets.iter().map(|p| p.to_string()).collect();
    let (mut state, _) = update(state, Msg::PresetsSelected(labels));
    for (slot, text) in fields.iter().enumerate() {
        (state, _) = update(
            state,
            Msg::CustomUrlEdited {
                slot,
                text: text.to_string(),
            },
        );
    }
    update(state, Msg::ProcessClicked)
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[test]
fn blank_fields_and_no_presets_reject_empty_batch() {
    init_logging();
    let (state, effects) = submit_urls(AppState::new(catalog()), &[], &["", "   ", ""]);

    assert!(effects.is_empty());
    assert!(!state.is_ingesting());
    assert_eq!(
        state.view().notice,
        Some(Notice::error("You must provide at least one valid url"))
    );
    assert!(!state.workflow().urls_processed);
}

#[test]
fn one_invalid_url_rejects_whole_batch() {
    init_logging();
    let (state, effects) = submit_urls(
        AppState::new(catalog()),
        &["rates"],
        &["https://ok.example.com", "not a url", ""],
    );

    assert!(effects.is_empty());
    let notice = state.view().notice.expect("notice");
    assert_eq!(notice.severity, Severity::Error);
    assert!(notice.text.contains("not a url"));
    assert!(!notice.text.contains("https://ok.example.com"));
}

#[test]
fn valid_batch_emits_single_ordered_ingestion() {
    init_logging();
    let (state, effects) = submit_urls(
        AppState::new(catalog()),
        &["survey", "rates"],
        &[" https://b.example.com ", "", "https://a.example.com"],
    );

    assert!(state.is_ingesting());
    assert_eq!(
        effects,
        vec![Effect::ProcessUrls {
            urls: strings(&[
                "https://survey.example.com/pmms",
                "https://rates.example.com/today",
                "https://b.example.com",
                "https://a.example.com",
            ]),
        }]
    );
}

#[test]
fn statuses_are_shown_in_arrival_order_and_success_enables_questions() {
    init_logging();
    let (mut state, _) = submit_urls(
        AppState::new(catalog()),
        &[],
        &["https://example.com/rates", "", ""],
    );
    assert_eq!(state.query_gate(), QueryGate::Disabled);

    for status in ["Loading...", "Indexing...", "Done."] {
        (state, _) = update(state, Msg::IngestionStatus(status.to_string()));
    }
    let (state, effects) = update(state, Msg::IngestionSucceeded);

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.status_lines, strings(&["Loading...", "Indexing...", "Done."]));
    assert_eq!(view.query_gate, QueryGate::Enabled);
    assert!(state.workflow().urls_processed);
    assert_eq!(state.workflow().last_urls, strings(&["https://example.com/rates"]));
}

#[test]
fn successful_ingestion_prefills_fields_on_rerender() {
    init_logging();
    let (state, _) = submit_urls(
        AppState::new(catalog()),
        &["rates"],
        &["", "  https://x.example.com/a ", "https://y.example.com/b"],
    );
    let (state, _) = update(state, Msg::IngestionSucceeded);

    let view = state.view();
    assert_eq!(
        view.custom_urls,
        strings(&["https://x.example.com/a", "https://y.example.com/b", ""])
    );
    let selected: Vec<_> = view
        .presets
        .iter()
        .filter(|p| p.selected)
        .map(|p| p.label.as_str())
        .collect();
    assert_eq!(selected, vec!["rates"]);
    assert_eq!(state.workflow().selected_predefined_urls, strings(&["rates"]));

    // Re-rendering without further input is stable.
    let (again, _) = update(state.clone(), Msg::NoOp);
    assert_eq!(again.view(), view);
}

#[test]
fn failed_ingestion_leaves_workflow_untouched() {
    init_logging();
    let (state, _) = submit_urls(AppState::new(catalog()), &[], &["https://example.com"]);
    let (state, _) = update(state, Msg::IngestionStatus("Loading...".to_string()));
    let (state, _) = update(state, Msg::IngestionFailed("connection refused".to_string()));

    assert!(!state.is_ingesting());
    assert!(!state.workflow().urls_processed);
    assert_eq!(state.query_gate(), QueryGate::Disabled);
    assert_eq!(
        state.view().notice,
        Some(Notice::error("Failed to process URLs: connection refused"))
    );
    // The fields keep what the user typed.
    assert_eq!(state.view().custom_urls[0], "https://example.com");
}

#[test]
fn failed_reingestion_keeps_previous_success() {
    init_logging();
    let (state, _) = submit_urls(AppState::new(catalog()), &[], &["https://first.example.com"]);
    let (state, _) = update(state, Msg::IngestionSucceeded);

    let (state, _) = submit_urls(state, &[], &["https://second.example.com"]);
    let (state, _) = update(state, Msg::IngestionFailed("boom".to_string()));

    assert!(state.workflow().urls_processed);
    assert_eq!(state.query_gate(), QueryGate::Enabled);
    assert_eq!(state.workflow().last_urls, strings(&["https://first.example.com"]));
}

#[test]
fn stray_ingestion_messages_are_ignored() {
    init_logging();
    let state = AppState::new(catalog());
    let (state, _) = update(state, Msg::IngestionStatus("late".to_string()));
    let (state, _) = update(state, Msg::IngestionSucceeded);

    assert!(state.view().status_lines.is_empty());
    assert!(!state.workflow().urls_processed);
}

#[test]
fn out_of_range_slot_is_ignored() {
    init_logging();
    let state = AppState::new(catalog());
    let (next, effects) = update(
        state.clone(),
        Msg::CustomUrlEdited {
            slot: 7,
            text: "https://example.com".to_string(),
        },
    );
    assert_eq!(next, state);
    assert!(effects.is_empty());
}
