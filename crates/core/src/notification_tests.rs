use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct CountingListener {
    count: Arc<AtomicUsize>,
}

impl EventListener for CountingListener {
    fn on_event(&self, _event: &CrawlEvent) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

struct PanickingListener;

impl EventListener for PanickingListener {
    fn on_event(&self, _event: &CrawlEvent) {
        panic!("listener exploded");
    }
}

#[test]
fn reject_reason_maps_to_fixed_vocabulary_names() {
    let reference = Reference::seed("a");
    assert_eq!(
        CrawlEvent::Rejected {
            reference: reference.clone(),
            reason: RejectReason::Unmodified
        }
        .name(),
        "REJECTED_UNMODIFIED"
    );
    assert_eq!(
        CrawlEvent::Rejected {
            reference,
            reason: RejectReason::Import
        }
        .name(),
        "REJECTED_IMPORT"
    );
}

#[test]
fn lifecycle_events_carry_no_reference() {
    assert_eq!(CrawlEvent::CrawlerRunBegin.reference(), None);
}

#[test]
fn listeners_fire_in_registration_order_and_see_every_event() {
    let bus = EventBus::new();
    let count = Arc::new(AtomicUsize::new(0));
    bus.register(Box::new(CountingListener {
        count: count.clone(),
    }));
    bus.register(Box::new(CountingListener {
        count: count.clone(),
    }));

    bus.fire(CrawlEvent::CrawlerRunBegin);

    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[test]
fn a_panicking_listener_does_not_stop_later_listeners() {
    let bus = EventBus::new();
    let count = Arc::new(AtomicUsize::new(0));
    bus.register(Box::new(PanickingListener));
    bus.register(Box::new(CountingListener {
        count: count.clone(),
    }));

    bus.fire(CrawlEvent::CrawlerRunBegin);

    assert_eq!(count.load(Ordering::SeqCst), 1);
}
