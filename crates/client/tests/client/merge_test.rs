use mockall::predicate;
use pretty_assertions::assert_eq;
use vetclinic_client::{
    gateway::PetFilter,
    merge::{PetMergeFlow, MERGED_MESSAGE},
    notification::Notification,
};
use vetclinic_core::errors::{Failure, FailureKind};

use crate::fixtures::{pet, MockPets};

fn similar(mock: &mut MockPets, times: usize) {
    mock.expect_list()
        .with(predicate::eq(PetFilter::SimilarTo("max".to_string())))
        .times(times)
        .returning(|_| Ok(vec![Some(pet(1, "Max")), None, Some(pet(2, "MAX"))]));
}

async fn searched(mock: MockPets) -> PetMergeFlow<MockPets> {
    let mut flow = PetMergeFlow::new(mock);
    flow.set_term("  max ");
    flow.search().await;
    flow
}

#[tokio::test]
async fn test_blank_term_is_rejected_without_search() {
    let mut mock = MockPets::new();
    mock.expect_list().never();
    let mut flow = PetMergeFlow::new(mock);
    flow.set_term("   ");

    assert_eq!(flow.search().await, 0);
    assert_eq!(
        flow.notification(),
        Some(&Notification::error("Enter a pet name to search"))
    );
}

#[tokio::test]
async fn test_search_drops_nulls() {
    let mut mock = MockPets::new();
    similar(&mut mock, 1);

    let flow = searched(mock).await;

    assert_eq!(flow.results().len(), 2);
    assert_eq!(flow.notification(), None);
}

#[tokio::test]
async fn test_search_with_no_results_notifies() {
    let mut mock = MockPets::new();
    mock.expect_list().times(1).returning(|_| Ok(vec![None]));

    let flow = searched(mock).await;

    assert!(flow.results().is_empty());
    assert_eq!(
        flow.notification(),
        Some(&Notification::info("No pets found with that name"))
    );
}

#[tokio::test]
async fn test_search_with_one_result_notifies() {
    let mut mock = MockPets::new();
    mock.expect_list()
        .times(1)
        .returning(|_| Ok(vec![Some(pet(1, "Max"))]));

    let flow = searched(mock).await;

    assert_eq!(
        flow.notification(),
        Some(&Notification::info(
            "Only one pet found. At least two are needed to merge."
        ))
    );
}

#[tokio::test]
async fn test_search_failure_clears_results() {
    let mut mock = MockPets::new();
    mock.expect_list()
        .times(1)
        .returning(|_| Ok(vec![Some(pet(1, "Max")), Some(pet(2, "Max"))]));
    mock.expect_list()
        .times(1)
        .returning(|_| Err(Failure::server("Database error: timeout")));
    let mut flow = searched(mock).await;
    assert_eq!(flow.results().len(), 2);

    flow.search().await;

    assert!(flow.results().is_empty());
    assert_eq!(
        flow.notification(),
        Some(&Notification::error(
            "Error searching pets: Database error: timeout"
        ))
    );
}

#[tokio::test]
async fn test_can_merge_needs_two_distinct_pets() {
    let mut mock = MockPets::new();
    similar(&mut mock, 1);
    let mut flow = searched(mock).await;

    assert!(!flow.can_merge());
    assert!(flow.choose_keep(1));
    assert!(!flow.can_merge());
    assert!(flow.choose_remove(1));
    assert!(!flow.can_merge());
    assert!(flow.choose_remove(2));
    assert!(flow.can_merge());
    assert!(!flow.choose_keep(42));
    assert!(!flow.can_merge());
}

#[tokio::test]
async fn test_merge_without_selection_makes_no_call() {
    let mut mock = MockPets::new();
    similar(&mut mock, 1);
    mock.expect_merge().never();
    let mut flow = searched(mock).await;

    assert_eq!(flow.merge().await, None);
}

#[tokio::test]
async fn test_successful_merge_clears_selection_and_searches_again() {
    let mut mock = MockPets::new();
    similar(&mut mock, 2);
    mock.expect_merge()
        .with(predicate::eq(1), predicate::eq(2))
        .times(1)
        .returning(|_, _| Ok(pet(1, "Max")));
    let mut flow = searched(mock).await;
    flow.choose_keep(1);
    flow.choose_remove(2);

    let merged = flow.merge().await;

    assert_eq!(merged.and_then(|p| p.id), Some(1));
    assert_eq!(flow.keep(), None);
    assert_eq!(flow.remove(), None);
    assert_eq!(
        flow.notification(),
        Some(&Notification::success(MERGED_MESSAGE))
    );
}

#[tokio::test]
async fn test_failed_merge_keeps_selection() {
    let mut mock = MockPets::new();
    similar(&mut mock, 1);
    mock.expect_merge().times(1).returning(|_, _| {
        Err(Failure::new(
            FailureKind::Conflict,
            "Conflict: Only pets with the same name and type can be merged",
        ))
    });
    let mut flow = searched(mock).await;
    flow.choose_keep(1);
    flow.choose_remove(2);

    assert_eq!(flow.merge().await, None);

    assert!(flow.can_merge());
    assert_eq!(
        flow.notification(),
        Some(&Notification::error(
            "Error merging pets: Conflict: Only pets with the same name and type can be merged"
        ))
    );
}
