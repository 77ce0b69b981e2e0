use super::common::*;
use std::sync::Arc;
use std::thread;

use crate::workflows::jobs::applications::admission::AdmissionController;
use crate::workflows::jobs::applications::domain::{Application, ApplicationId, ApplicationStatus};
use crate::workflows::jobs::applications::locks::JobLocks;
use crate::workflows::jobs::applications::repository::{
    ApplicationRepository, InMemoryApplicationRepository,
};
use crate::workflows::jobs::applications::shortlist::{ShortlistError, ShortlistManager};
use crate::workflows::jobs::catalog::JobId;

struct Fixture {
    manager: ShortlistManager<InMemoryApplicationRepository>,
    repository: Arc<InMemoryApplicationRepository>,
    applications: Vec<Application>,
}

/// `count` submitted applications on `job-short`, shortlist cap of `limit`.
fn fixture(count: usize, limit: usize) -> Fixture {
    let repository = Arc::new(InMemoryApplicationRepository::default());
    let locks = Arc::new(JobLocks::new());
    let admission = AdmissionController::new(
        repository.clone(),
        locks.clone(),
        Arc::new(ManualClock::at(posted_at())),
    );
    let job = job("job-short", 20, 48);
    let applications = (0..count)
        .map(|index| {
            admission
                .submit(&job, applicant(&format!("creator-{index}")), bid())
                .expect("admitted")
        })
        .collect();

    Fixture {
        manager: ShortlistManager::new(repository.clone(), locks, limit),
        repository,
        applications,
    }
}

fn stored_status(fixture: &Fixture, id: &ApplicationId) -> ApplicationStatus {
    fixture
        .repository
        .fetch(id)
        .expect("fetch succeeds")
        .expect("record present")
        .status
}

#[test]
fn shortlisting_moves_submitted_applications() {
    let fixture = fixture(1, 3);
    let id = &fixture.applications[0].id;

    let updated = fixture.manager.shortlist(id).expect("shortlisted");

    assert_eq!(updated.status, ApplicationStatus::Shortlisted);
    assert_eq!(stored_status(&fixture, id), ApplicationStatus::Shortlisted);
    assert_eq!(
        fixture
            .manager
            .shortlisted_count(&JobId::from("job-short"))
            .expect("count"),
        1
    );
}

#[test]
fn fourth_shortlist_is_refused() {
    let fixture = fixture(4, 3);
    for application in &fixture.applications[..3] {
        fixture.manager.shortlist(&application.id).expect("slot free");
    }

    match fixture.manager.shortlist(&fixture.applications[3].id) {
        Err(ShortlistError::ShortlistFull { limit }) => assert_eq!(limit, 3),
        other => panic!("expected shortlist full, got {other:?}"),
    }
    assert_eq!(
        stored_status(&fixture, &fixture.applications[3].id),
        ApplicationStatus::Submitted
    );
}

#[test]
fn rejecting_a_shortlisted_application_frees_a_slot() {
    let fixture = fixture(4, 3);
    for application in &fixture.applications[..3] {
        fixture.manager.shortlist(&application.id).expect("slot free");
    }

    let rejected = fixture
        .manager
        .reject(&fixture.applications[0].id)
        .expect("shortlisted can be rejected");
    assert_eq!(rejected.status, ApplicationStatus::Rejected);

    fixture
        .manager
        .shortlist(&fixture.applications[3].id)
        .expect("freed slot is reusable");
    assert_eq!(
        fixture
            .manager
            .shortlisted_count(&JobId::from("job-short"))
            .expect("count"),
        3
    );
}

#[test]
fn rejected_is_terminal() {
    let fixture = fixture(1, 3);
    let id = &fixture.applications[0].id;
    fixture.manager.reject(id).expect("submitted can be rejected");

    match fixture.manager.shortlist(id) {
        Err(ShortlistError::InvalidTransition { from, to }) => {
            assert_eq!(from, ApplicationStatus::Rejected);
            assert_eq!(to, ApplicationStatus::Shortlisted);
        }
        other => panic!("expected invalid transition, got {other:?}"),
    }
    assert!(matches!(
        fixture.manager.reject(id),
        Err(ShortlistError::InvalidTransition { .. })
    ));
    assert_eq!(stored_status(&fixture, id), ApplicationStatus::Rejected);
}

#[test]
fn shortlisted_application_cannot_be_shortlisted_twice() {
    let fixture = fixture(1, 3);
    let id = &fixture.applications[0].id;
    fixture.manager.shortlist(id).expect("first shortlist");

    assert!(matches!(
        fixture.manager.shortlist(id),
        Err(ShortlistError::InvalidTransition { .. })
    ));
}

#[test]
fn unknown_application_is_not_found() {
    let fixture = fixture(0, 3);
    let missing = ApplicationId("app-missing".to_string());

    assert!(matches!(
        fixture.manager.shortlist(&missing),
        Err(ShortlistError::NotFound)
    ));
    assert!(matches!(
        fixture.manager.reject(&missing),
        Err(ShortlistError::NotFound)
    ));
}

#[test]
fn racing_for_the_last_slot_admits_exactly_one() {
    let fixture = fixture(10, 3);
    for application in &fixture.applications[..2] {
        fixture.manager.shortlist(&application.id).expect("slot free");
    }

    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = fixture.applications[2..]
            .iter()
            .map(|application| {
                let manager = &fixture.manager;
                scope.spawn(move || manager.shortlist(&application.id))
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("thread completes"))
            .collect()
    });

    let winners = results.iter().filter(|result| result.is_ok()).count();
    let full = results
        .iter()
        .filter(|result| matches!(result, Err(ShortlistError::ShortlistFull { .. })))
        .count();
    assert_eq!(winners, 1);
    assert_eq!(full, 7);
    assert_eq!(
        fixture
            .manager
            .shortlisted_count(&JobId::from("job-short"))
            .expect("count"),
        3
    );
}

#[test]
fn configured_limit_is_respected() {
    let fixture = fixture(2, 1);
    fixture
        .manager
        .shortlist(&fixture.applications[0].id)
        .expect("one slot");

    assert!(matches!(
        fixture.manager.shortlist(&fixture.applications[1].id),
        Err(ShortlistError::ShortlistFull { limit: 1 })
    ));
}
