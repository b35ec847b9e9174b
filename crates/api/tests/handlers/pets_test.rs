use axum::{http::StatusCode, Json};
use mockall::predicate;
use pretty_assertions::assert_eq;
use vetclinic_api::{
    handlers::pets::{check_merge_request, merged_pet},
    middleware::error_handling::AppError,
};
use vetclinic_core::models::pet::{MergePetsRequest, Pet};
use vetclinic_db::repositories::pet::MergeOutcome;

use crate::test_utils::{pet, TestContext};

async fn merge_wrapper(
    ctx: &mut TestContext,
    request: MergePetsRequest,
) -> Result<Json<Pet>, AppError> {
    check_merge_request(&request)?;
    let outcome = ctx
        .pet_repo
        .merge_pets(request.keep_pet_id, request.remove_pet_id)
        .await?;
    Ok(Json(merged_pet(outcome)?))
}

#[tokio::test]
async fn test_merge_pets_returns_kept_pet_with_all_owners() {
    let mut ctx = TestContext::new();

    ctx.pet_repo
        .expect_merge_pets()
        .with(predicate::eq(1), predicate::eq(2))
        .times(1)
        .returning(|_, _| Ok(MergeOutcome::Merged(pet(1, "Luna", vec![10, 11]))));

    let request = MergePetsRequest {
        keep_pet_id: 1,
        remove_pet_id: 2,
    };
    let Json(kept) = merge_wrapper(&mut ctx, request).await.unwrap();

    assert_eq!(kept.id, Some(1));
    assert_eq!(kept.owner_ids, vec![10, 11]);
}

#[tokio::test]
async fn test_merge_pet_into_itself_is_rejected() {
    let mut ctx = TestContext::new();
    ctx.pet_repo.expect_merge_pets().times(0);

    let request = MergePetsRequest {
        keep_pet_id: 3,
        remove_pet_id: 3,
    };
    let error = merge_wrapper(&mut ctx, request).await.unwrap_err();

    assert_eq!(error.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_merge_missing_pet_is_not_found() {
    let mut ctx = TestContext::new();
    ctx.pet_repo
        .expect_merge_pets()
        .returning(|_, remove| Ok(MergeOutcome::Missing(remove)));

    let request = MergePetsRequest {
        keep_pet_id: 1,
        remove_pet_id: 5,
    };
    let error = merge_wrapper(&mut ctx, request).await.unwrap_err();

    assert_eq!(error.status(), StatusCode::NOT_FOUND);
    assert_eq!(error.0.to_string(), "Resource not found: Pet with ID 5 not found");
}

#[tokio::test]
async fn test_merge_different_pets_is_a_conflict() {
    let mut ctx = TestContext::new();
    ctx.pet_repo
        .expect_merge_pets()
        .returning(|_, _| Ok(MergeOutcome::Mismatch));

    let request = MergePetsRequest {
        keep_pet_id: 1,
        remove_pet_id: 2,
    };
    let error = merge_wrapper(&mut ctx, request).await.unwrap_err();

    assert_eq!(error.status(), StatusCode::CONFLICT);
}

async fn client_pets_wrapper(ctx: &mut TestContext, client_id: i64) -> Result<Json<Vec<Pet>>, AppError> {
    ctx.client_repo
        .get_client_by_id(client_id)
        .await?
        .ok_or_else(|| {
            vetclinic_core::errors::ClinicError::NotFound(format!(
                "Client with ID {} not found",
                client_id
            ))
        })?;
    Ok(Json(ctx.pet_repo.list_pets_by_owner(client_id).await?))
}

#[tokio::test]
async fn test_client_pets_for_unknown_client_is_not_found() {
    let mut ctx = TestContext::new();
    ctx.client_repo
        .expect_get_client_by_id()
        .with(predicate::eq(8))
        .returning(|_| Ok(None));
    ctx.pet_repo.expect_list_pets_by_owner().times(0);

    let error = client_pets_wrapper(&mut ctx, 8).await.unwrap_err();

    assert_eq!(error.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_client_pets_lists_owned_pets() {
    let mut ctx = TestContext::new();
    ctx.client_repo.expect_get_client_by_id().returning(|id| {
        Ok(Some(vetclinic_core::models::client::Client {
            id: Some(id),
            first_name: "Ana".to_string(),
            last_name: "Perez".to_string(),
            phone: None,
            email: None,
        }))
    });
    ctx.pet_repo
        .expect_list_pets_by_owner()
        .with(predicate::eq(10))
        .returning(|owner| Ok(vec![pet(1, "Luna", vec![owner]), pet(2, "Max", vec![owner])]));

    let Json(pets) = client_pets_wrapper(&mut ctx, 10).await.unwrap();

    assert_eq!(
        pets.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
        vec!["Luna", "Max"]
    );
}

#[tokio::test]
async fn test_employee_listing_passes_through() {
    let mut ctx = TestContext::new();
    ctx.employee_repo.expect_list_employees().times(1).returning(|| Ok(vec![]));

    let employees = ctx.employee_repo.list_employees().await.unwrap();

    assert!(employees.is_empty());
}
