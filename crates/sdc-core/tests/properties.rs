//! Property tests for domain handling and scheduling

mod common;

use common::FakeBrowser;
use proptest::prelude::*;
use sdc_core::domain::{is_within, root_domain_of};
use sdc_core::{ManualClock, ScheduleOutcome, Scheduler, StateStore, Whitelist};
use std::sync::Arc;

fn label() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,9}"
}

fn hostname() -> impl Strategy<Value = String> {
    prop::collection::vec(label(), 2..5).prop_map(|labels| labels.join("."))
}

fn scheduler(whitelist: Whitelist) -> (Scheduler, Arc<StateStore>) {
    let store = Arc::new(StateStore::new(FakeBrowser::new()));
    let scheduler = Scheduler::new(
        Arc::clone(&store),
        Arc::new(whitelist),
        Arc::new(ManualClock::new(0)),
    );
    (scheduler, store)
}

proptest! {
    #[test]
    fn whitelisted_roots_are_never_scheduled(sub in label(), host in hostname()) {
        let root = root_domain_of(&host);
        let whitelist = Whitelist::from_origins([format!("https://{root}")]).unwrap();
        // a leading `www` label is stripped from origins
        prop_assume!(whitelist.contains_root(&root));
        let (scheduler, store) = scheduler(whitelist);

        let candidate = format!("{sub}.{root}");
        if root_domain_of(&candidate) == root {
            prop_assert_eq!(
                scheduler.schedule_for_destruction(&candidate).unwrap(),
                ScheduleOutcome::Exempt
            );
            prop_assert!(store.scheduled_domains().unwrap().is_empty());
        }
    }

    #[test]
    fn schedule_then_unschedule_leaves_no_entry(host in hostname()) {
        let (scheduler, store) = scheduler(Whitelist::new());

        scheduler.schedule_for_destruction(&host).unwrap();
        scheduler.unschedule(&host).unwrap();

        prop_assert!(!store.scheduled_domains().unwrap().contains_key(&host));
    }

    #[test]
    fn hostname_is_within_its_root(host in hostname()) {
        let root = root_domain_of(&host);
        prop_assert!(is_within(&host, &root));
        prop_assert!(host.ends_with(&root));
    }

    #[test]
    fn root_domain_is_idempotent_for_short_roots(host in hostname()) {
        let root = root_domain_of(&host);
        if root.split('.').count() == 2 {
            prop_assert_eq!(root_domain_of(&root), root.clone());
        }
    }
}
