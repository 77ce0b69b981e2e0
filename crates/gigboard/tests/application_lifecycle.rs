//! End-to-end scenarios for admission and the shortlist workflow, driven through the public
//! service facade the dashboards and apply flow use.

mod common {
    use std::sync::{Arc, Mutex};

    use chrono::{DateTime, Duration, TimeZone, Utc};

    use gigboard::config::MarketplaceConfig;
    use gigboard::workflows::jobs::applications::{
        Bid, Clock, InMemoryApplicationRepository, JobApplicationService,
    };
    use gigboard::workflows::jobs::{InMemoryJobCatalog, JobId, JobSnapshot, JobStatus};

    pub(super) type Service = JobApplicationService<InMemoryApplicationRepository, InMemoryJobCatalog>;

    pub(super) struct SteppedClock(Mutex<DateTime<Utc>>);

    impl SteppedClock {
        pub(super) fn advance(&self, by: Duration) {
            *self.0.lock().expect("lock") += by;
        }
    }

    impl Clock for SteppedClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().expect("lock")
        }
    }

    pub(super) fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 15, 8, 30, 0)
            .single()
            .expect("valid timestamp")
    }

    pub(super) fn bid(price: f64) -> Bid {
        Bid {
            proposed_price: price,
            delivery_days: 4,
            pitch: "Shorts editor with captioning and sound design".to_string(),
            portfolio_sample_url: None,
            question_for_creator: None,
        }
    }

    pub(super) fn service(
        job_id: &str,
        max_applications: u32,
    ) -> (Arc<Service>, Arc<InMemoryJobCatalog>, Arc<SteppedClock>) {
        let catalog = Arc::new(InMemoryJobCatalog::default());
        catalog
            .register(JobSnapshot {
                id: JobId::from(job_id),
                max_applications,
                application_deadline_hours: 48,
                created_at: now(),
                status: JobStatus::Open,
            })
            .expect("register job");
        let clock = Arc::new(SteppedClock(Mutex::new(now())));
        let service = JobApplicationService::with_clock(
            Arc::new(InMemoryApplicationRepository::default()),
            catalog.clone(),
            &MarketplaceConfig::default(),
            clock.clone(),
        );
        (Arc::new(service), catalog, clock)
    }
}

use std::collections::BTreeSet;
use std::thread;

use chrono::Duration;
use common::*;
use gigboard::workflows::jobs::applications::{
    AdmissionError, ApplicantId, ApplicationServiceError, ApplicationStatus, ShortlistError,
};
use gigboard::workflows::jobs::JobId;

#[test]
fn two_slot_job_walks_through_the_full_lifecycle() {
    let (service, _, _) = service("J", 2);
    let job = JobId::from("J");

    let alice = service
        .submit_application(&job, ApplicantId::from("alice"), bid(200.0))
        .expect("alice admitted");
    assert_eq!(alice.position, 1);

    let bob = service
        .submit_application(&job, ApplicantId::from("bob"), bid(180.0))
        .expect("bob admitted");
    assert_eq!(bob.position, 2);

    match service.submit_application(&job, ApplicantId::from("carol"), bid(150.0)) {
        Err(ApplicationServiceError::Admission(AdmissionError::CapacityExceeded)) => {}
        other => panic!("expected capacity exceeded, got {other:?}"),
    }

    service.shortlist_application(&alice.id).expect("alice shortlisted");
    service.shortlist_application(&bob.id).expect("bob shortlisted");
    assert_eq!(service.shortlisted_count(&job).expect("count"), 2);

    service.reject_application(&alice.id).expect("alice rejected");
    assert_eq!(service.shortlisted_count(&job).expect("count"), 1);

    match service.shortlist_application(&alice.id) {
        Err(ApplicationServiceError::Shortlist(ShortlistError::InvalidTransition {
            from, ..
        })) => assert_eq!(from, ApplicationStatus::Rejected),
        other => panic!("expected invalid transition, got {other:?}"),
    }

    let applications = service.applications_for_job(&job).expect("listing");
    assert_eq!(applications.len(), 2);
    assert_eq!(applications[0].status, ApplicationStatus::Rejected);
    assert_eq!(applications[1].status, ApplicationStatus::Shortlisted);
}

#[test]
fn third_shortlist_on_four_slot_job_leaves_room_for_exactly_three() {
    let (service, _, _) = service("J4", 4);
    let job = JobId::from("J4");

    let ids: Vec<_> = ["alice", "bob", "carol", "dave"]
        .into_iter()
        .map(|name| {
            service
                .submit_application(&job, ApplicantId::from(name), bid(100.0))
                .expect("admitted")
                .id
        })
        .collect();

    for id in &ids[..3] {
        service.shortlist_application(id).expect("slot free");
    }
    assert!(matches!(
        service.shortlist_application(&ids[3]),
        Err(ApplicationServiceError::Shortlist(ShortlistError::ShortlistFull { .. }))
    ));
}

#[test]
fn fifty_concurrent_applicants_compete_for_fifteen_slots() {
    let (service, _, _) = service("burst", 15);
    let job = JobId::from("burst");

    let outcomes: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..50)
            .map(|index| {
                let service = &service;
                let job = &job;
                scope.spawn(move || {
                    service.submit_application(
                        job,
                        ApplicantId(format!("freelancer-{index}")),
                        bid(90.0 + index as f64),
                    )
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("thread completes"))
            .collect()
    });

    let positions: BTreeSet<u32> = outcomes
        .iter()
        .filter_map(|outcome| outcome.as_ref().ok())
        .map(|application| application.position)
        .collect();
    let capacity_refusals = outcomes
        .iter()
        .filter(|outcome| {
            matches!(
                outcome,
                Err(ApplicationServiceError::Admission(
                    AdmissionError::CapacityExceeded
                ))
            )
        })
        .count();

    assert_eq!(positions, (1..=15).collect::<BTreeSet<u32>>());
    assert_eq!(capacity_refusals, 35);
    assert_eq!(service.applications_for_job(&job).expect("listing").len(), 15);
}

#[test]
fn duplicate_bids_racing_each_other_store_one_application() {
    let (service, _, _) = service("dup", 15);
    let job = JobId::from("dup");

    let outcomes: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = &service;
                let job = &job;
                scope.spawn(move || {
                    service.submit_application(job, ApplicantId::from("zoe"), bid(75.0))
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("thread completes"))
            .collect()
    });

    assert_eq!(outcomes.iter().filter(|outcome| outcome.is_ok()).count(), 1);
    assert_eq!(service.applications_for_job(&job).expect("listing").len(), 1);
}

#[test]
fn deadline_closes_admission_with_slots_remaining() {
    let (service, _, clock) = service("late", 15);
    let job = JobId::from("late");

    service
        .submit_application(&job, ApplicantId::from("early"), bid(60.0))
        .expect("inside window");

    clock.advance(Duration::hours(48));
    match service.submit_application(&job, ApplicantId::from("late"), bid(60.0)) {
        Err(ApplicationServiceError::Admission(AdmissionError::DeadlineExpired)) => {}
        other => panic!("expected deadline expired, got {other:?}"),
    }

    let window = service.application_window(&job).expect("window");
    assert_eq!(window.remaining_slots, 14);
    assert!(!window.accepting);
}

#[test]
fn closed_job_refuses_even_with_capacity() {
    let (service, catalog, _) = service("shut", 15);
    let job = JobId::from("shut");
    catalog.close(&job).expect("close");

    assert!(matches!(
        service.submit_application(&job, ApplicantId::from("max"), bid(60.0)),
        Err(ApplicationServiceError::Admission(AdmissionError::JobClosed))
    ));
}
