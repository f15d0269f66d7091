use super::*;
use crate::reference::ReferenceState;

fn sample_reference() -> Reference {
    let mut r = Reference::seed("https://example.test/a");
    r.state = Some(ReferenceState::New);
    r
}

#[test]
fn queued_round_trips_through_json() {
    let event = StoreEvent::Queued {
        reference: sample_reference(),
    };
    let json = serde_json::to_string(&event).unwrap();
    assert!(json.starts_with(r#"{"type":"store:queued""#));
    let back: StoreEvent = serde_json::from_str(&json).unwrap();
    assert_eq!(event, back);
}

#[test]
fn name_matches_serde_tag() {
    assert_eq!(StoreEvent::Dequeued { key: "a".into() }.name(), "store:dequeued");
    assert_eq!(
        StoreEvent::ResumeRequeued { keys: vec!["a".into()] }.name(),
        "store:resume_requeued"
    );
    assert_eq!(
        StoreEvent::FreshStart { carried_cache: vec![] }.name(),
        "store:fresh_start"
    );
}

#[test]
fn log_summary_includes_key() {
    let summary = StoreEvent::Processed {
        reference: sample_reference(),
    }
    .log_summary();
    assert!(summary.contains("https://example.test/a"));
    assert!(summary.contains("New"));
}
