//! REST API for the chore tracker engine.
//!
//! Three surfaces share this router: guardian actions (approve/reject,
//! settings, gifts and payouts), child actions (submit, bid), and the
//! scheduler trigger that runs the daily generation cycle.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::info;

use shared::{
    ApproveCompletionResponse, BidListResponse, CreateChildRequest, CreateChoreRequest,
    CreateFamilyRequest, GiftRequest, PayoutRequest, PlaceBidRequest, RejectCompletionRequest,
    RunGenerationRequest, SubmitCompletionRequest, TransactionListResponse,
    UpdateChildRequest, UpdateFamilySettingsRequest, WalletResponse,
};

use crate::domain::commands::bidding::PlaceBidCommand;
use crate::domain::commands::child::{CreateChildCommand, UpdateChildCommand};
use crate::domain::commands::chore::CreateChoreCommand;
use crate::domain::commands::completion::SubmitCompletionCommand;
use crate::domain::commands::family::{CreateFamilyCommand, UpdateFamilySettingsCommand};
use crate::domain::commands::generation::GenerationCycleCommand;
use crate::domain::errors::EngineError;
use crate::domain::models::transaction::{TransactionReason, TransactionSource};
use crate::domain::{
    BiddingService, ChildService, ChoreService, CompletionService, FamilyService,
    GenerationService, LedgerService, StreakService,
};
use crate::io::mappers::{
    ApprovalMapper, AssignmentMapper, BidMapper, ChildMapper, ChoreMapper, CompletionMapper,
    FamilyMapper, ReportMapper, TransactionMapper, WalletMapper,
};
use crate::storage::traits::Connection;

/// Application state holding every domain service.
#[derive(Clone)]
pub struct AppState<C: Connection> {
    pub family_service: FamilyService<C>,
    pub child_service: ChildService<C>,
    pub chore_service: ChoreService<C>,
    pub bidding_service: BiddingService<C>,
    pub completion_service: CompletionService<C>,
    pub generation_service: GenerationService<C>,
    pub ledger_service: LedgerService<C>,
}

impl<C: Connection> AppState<C> {
    /// Wire up all services over one storage connection.
    pub fn new(connection: Arc<C>) -> Self {
        let bidding_service = BiddingService::new(Arc::clone(&connection));
        let streak_service = StreakService::new(Arc::clone(&connection));
        let ledger_service = LedgerService::new(Arc::clone(&connection));
        let completion_service = CompletionService::new(
            Arc::clone(&connection),
            bidding_service.clone(),
            streak_service.clone(),
            ledger_service.clone(),
        );
        let generation_service = GenerationService::new(
            Arc::clone(&connection),
            streak_service,
            ledger_service.clone(),
        );

        Self {
            family_service: FamilyService::new(Arc::clone(&connection)),
            child_service: ChildService::new(Arc::clone(&connection)),
            chore_service: ChoreService::new(Arc::clone(&connection)),
            bidding_service,
            completion_service,
            generation_service,
            ledger_service,
        }
    }
}

/// Create the Axum router with all routes configured.
pub fn create_router<C: Connection>(state: AppState<C>) -> Router {
    let api_routes = Router::new()
        .route("/families", post(create_family::<C>).get(list_families::<C>))
        .route("/families/:id/settings", put(update_family_settings::<C>))
        .route("/families/:id/children", post(create_child::<C>).get(list_children::<C>))
        .route("/families/:id/chores", post(create_chore::<C>).get(list_chores::<C>))
        .route("/families/:id/assignments", get(list_open_assignments::<C>))
        .route("/families/:id/wallets", get(list_family_wallets::<C>))
        .route("/chores/:id", delete(deactivate_chore::<C>))
        .route("/children/:id", put(update_child::<C>))
        .route("/children/:id/wallet", get(get_wallet::<C>))
        .route("/children/:id/transactions", get(list_transactions::<C>))
        .route("/children/:id/gifts", post(record_gift::<C>))
        .route("/children/:id/payouts", post(record_payout::<C>))
        .route("/assignments/:id/completions", post(submit_completion::<C>))
        .route("/assignments/:id/bids", post(place_bid::<C>).get(list_bids::<C>))
        .route("/completions/:id/approve", post(approve_completion::<C>))
        .route("/completions/:id/reject", post(reject_completion::<C>))
        .route("/generation/run", post(run_generation::<C>));

    Router::new().nest("/api", api_routes).with_state(state)
}

/// Map engine errors to their status codes; anything else is treated as a
/// bad request with the error text.
fn error_response(err: anyhow::Error) -> Response {
    if let Some(engine) = err.downcast_ref::<EngineError>() {
        let status = match engine {
            EngineError::NotFound { .. } => StatusCode::NOT_FOUND,
            EngineError::InvalidBidAmount { .. } => StatusCode::BAD_REQUEST,
            EngineError::NotChampion => StatusCode::FORBIDDEN,
            EngineError::AlreadyProcessed { .. } => StatusCode::CONFLICT,
            EngineError::InsufficientFloor { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            EngineError::ConcurrencyConflict { .. } => StatusCode::CONFLICT,
            EngineError::LedgerCorrupted { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        return (status, engine.to_string()).into_response();
    }
    tracing::error!("Request failed: {:#}", err);
    (StatusCode::BAD_REQUEST, err.to_string()).into_response()
}

async fn create_family<C: Connection>(
    State(state): State<AppState<C>>,
    Json(request): Json<CreateFamilyRequest>,
) -> Response {
    info!("POST /api/families - name: {}", request.name);
    match state
        .family_service
        .create_family(CreateFamilyCommand { name: request.name })
        .await
    {
        Ok(family) => (StatusCode::CREATED, Json(FamilyMapper::to_dto(family))).into_response(),
        Err(err) => error_response(err),
    }
}

async fn list_families<C: Connection>(State(state): State<AppState<C>>) -> Response {
    match state.family_service.list_families().await {
        Ok(families) => {
            let dtos: Vec<shared::Family> =
                families.into_iter().map(FamilyMapper::to_dto).collect();
            (StatusCode::OK, Json(dtos)).into_response()
        }
        Err(err) => error_response(err),
    }
}

async fn update_family_settings<C: Connection>(
    State(state): State<AppState<C>>,
    Path(family_id): Path<String>,
    Json(request): Json<UpdateFamilySettingsRequest>,
) -> Response {
    info!("PUT /api/families/{}/settings", family_id);
    let command = UpdateFamilySettingsCommand {
        family_id,
        holiday_start: request.holiday_start,
        holiday_end: request.holiday_end,
        streak_protection_days: request.streak_protection_days,
        penalties_enabled: request.penalties_enabled,
        penalty_mode: FamilyMapper::mode_from_dto(request.penalty_mode),
        first_miss_pence: request.first_miss_pence,
        first_miss_stars: request.first_miss_stars,
        second_miss_pence: request.second_miss_pence,
        second_miss_stars: request.second_miss_stars,
        third_miss_pence: request.third_miss_pence,
        third_miss_stars: request.third_miss_stars,
        min_balance_pence: request.min_balance_pence,
        min_balance_stars: request.min_balance_stars,
    };
    match state.family_service.update_settings(command).await {
        Ok(family) => (StatusCode::OK, Json(FamilyMapper::to_dto(family))).into_response(),
        Err(err) => error_response(err),
    }
}

async fn create_child<C: Connection>(
    State(state): State<AppState<C>>,
    Path(family_id): Path<String>,
    Json(request): Json<CreateChildRequest>,
) -> Response {
    info!("POST /api/families/{}/children - name: {}", family_id, request.name);
    match state
        .child_service
        .create_child(CreateChildCommand {
            family_id,
            name: request.name,
        })
        .await
    {
        Ok(child) => (StatusCode::CREATED, Json(ChildMapper::to_dto(child))).into_response(),
        Err(err) => error_response(err),
    }
}

async fn list_children<C: Connection>(
    State(state): State<AppState<C>>,
    Path(family_id): Path<String>,
) -> Response {
    match state.child_service.list_children(&family_id).await {
        Ok(children) => {
            let dtos: Vec<shared::Child> = children.into_iter().map(ChildMapper::to_dto).collect();
            (StatusCode::OK, Json(dtos)).into_response()
        }
        Err(err) => error_response(err),
    }
}

async fn update_child<C: Connection>(
    State(state): State<AppState<C>>,
    Path(child_id): Path<String>,
    Json(request): Json<UpdateChildRequest>,
) -> Response {
    info!("PUT /api/children/{}", child_id);
    match state
        .child_service
        .update_child(UpdateChildCommand {
            child_id,
            paused: request.paused,
            holiday_start: request.holiday_start,
            holiday_end: request.holiday_end,
        })
        .await
    {
        Ok(child) => (StatusCode::OK, Json(ChildMapper::to_dto(child))).into_response(),
        Err(err) => error_response(err),
    }
}

async fn create_chore<C: Connection>(
    State(state): State<AppState<C>>,
    Path(family_id): Path<String>,
    Json(request): Json<CreateChoreRequest>,
) -> Response {
    info!("POST /api/families/{}/chores - name: {}", family_id, request.name);
    match state
        .chore_service
        .create_chore(CreateChoreCommand {
            family_id,
            name: request.name,
            frequency: ChoreMapper::frequency_from_dto(request.frequency),
            base_reward_pence: request.base_reward_pence,
            competitive: request.competitive,
        })
        .await
    {
        Ok(chore) => (StatusCode::CREATED, Json(ChoreMapper::to_dto(chore))).into_response(),
        Err(err) => error_response(err),
    }
}

async fn list_chores<C: Connection>(
    State(state): State<AppState<C>>,
    Path(family_id): Path<String>,
) -> Response {
    match state.chore_service.list_chores(&family_id).await {
        Ok(chores) => {
            let dtos: Vec<shared::Chore> = chores.into_iter().map(ChoreMapper::to_dto).collect();
            (StatusCode::OK, Json(dtos)).into_response()
        }
        Err(err) => error_response(err),
    }
}

async fn list_open_assignments<C: Connection>(
    State(state): State<AppState<C>>,
    Path(family_id): Path<String>,
) -> Response {
    match state.chore_service.list_open_assignments(&family_id).await {
        Ok(assignments) => {
            let dtos: Vec<shared::Assignment> = assignments
                .into_iter()
                .map(AssignmentMapper::to_dto)
                .collect();
            (StatusCode::OK, Json(dtos)).into_response()
        }
        Err(err) => error_response(err),
    }
}

async fn list_family_wallets<C: Connection>(
    State(state): State<AppState<C>>,
    Path(family_id): Path<String>,
) -> Response {
    match state.ledger_service.family_wallets(&family_id).await {
        Ok(wallets) => {
            let dtos: Vec<shared::Wallet> =
                wallets.into_iter().map(WalletMapper::to_dto).collect();
            (StatusCode::OK, Json(dtos)).into_response()
        }
        Err(err) => error_response(err),
    }
}

async fn deactivate_chore<C: Connection>(
    State(state): State<AppState<C>>,
    Path(chore_id): Path<String>,
) -> Response {
    info!("DELETE /api/chores/{}", chore_id);
    match state.chore_service.deactivate_chore(&chore_id).await {
        Ok(chore) => (StatusCode::OK, Json(ChoreMapper::to_dto(chore))).into_response(),
        Err(err) => error_response(err),
    }
}

async fn submit_completion<C: Connection>(
    State(state): State<AppState<C>>,
    Path(assignment_id): Path<String>,
    Json(request): Json<SubmitCompletionRequest>,
) -> Response {
    info!(
        "POST /api/assignments/{}/completions - child: {}",
        assignment_id, request.child_id
    );
    match state
        .completion_service
        .submit_completion(SubmitCompletionCommand {
            assignment_id,
            child_id: request.child_id,
            note: request.note,
        })
        .await
    {
        Ok(completion) => {
            (StatusCode::CREATED, Json(CompletionMapper::to_dto(completion))).into_response()
        }
        Err(err) => error_response(err),
    }
}

async fn approve_completion<C: Connection>(
    State(state): State<AppState<C>>,
    Path(completion_id): Path<String>,
) -> Response {
    info!("POST /api/completions/{}/approve", completion_id);
    match state.completion_service.approve_completion(&completion_id).await {
        Ok(outcome) => {
            let response: ApproveCompletionResponse = ApprovalMapper::to_dto(outcome);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => error_response(err),
    }
}

async fn reject_completion<C: Connection>(
    State(state): State<AppState<C>>,
    Path(completion_id): Path<String>,
    Json(request): Json<RejectCompletionRequest>,
) -> Response {
    info!("POST /api/completions/{}/reject", completion_id);
    match state
        .completion_service
        .reject_completion(&completion_id, request.reason)
        .await
    {
        Ok(completion) => {
            (StatusCode::OK, Json(CompletionMapper::to_dto(completion))).into_response()
        }
        Err(err) => error_response(err),
    }
}

async fn place_bid<C: Connection>(
    State(state): State<AppState<C>>,
    Path(assignment_id): Path<String>,
    Json(request): Json<PlaceBidRequest>,
) -> Response {
    info!(
        "POST /api/assignments/{}/bids - child: {} amount: {}p",
        assignment_id, request.child_id, request.amount_pence
    );
    match state
        .bidding_service
        .place_bid(PlaceBidCommand {
            assignment_id,
            child_id: request.child_id,
            amount_pence: request.amount_pence,
        })
        .await
    {
        Ok(bid) => (StatusCode::CREATED, Json(BidMapper::to_dto(bid))).into_response(),
        Err(err) => error_response(err),
    }
}

async fn list_bids<C: Connection>(
    State(state): State<AppState<C>>,
    Path(assignment_id): Path<String>,
) -> Response {
    let champion = match state.bidding_service.champion(&assignment_id).await {
        Ok(champion) => champion,
        Err(err) => return error_response(err),
    };
    match state.bidding_service.list_bids(&assignment_id).await {
        Ok(bids) => {
            let response = BidListResponse {
                bids: bids.into_iter().map(BidMapper::to_dto).collect(),
                champion_bid_id: champion.map(|b| b.id),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => error_response(err),
    }
}

async fn run_generation<C: Connection>(
    State(state): State<AppState<C>>,
    Json(request): Json<RunGenerationRequest>,
) -> Response {
    let as_of = request
        .as_of
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    info!(
        "POST /api/generation/run - as_of: {} dry_run: {}",
        as_of, request.dry_run
    );
    match state
        .generation_service
        .run_generation_cycle(GenerationCycleCommand {
            family_id: request.family_id,
            as_of,
            dry_run: request.dry_run,
        })
        .await
    {
        Ok(report) => (StatusCode::OK, Json(ReportMapper::to_dto(report))).into_response(),
        Err(err) => error_response(err),
    }
}

async fn get_wallet<C: Connection>(
    State(state): State<AppState<C>>,
    Path(child_id): Path<String>,
) -> Response {
    match state.child_service.get_child(&child_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return (StatusCode::NOT_FOUND, "Child not found").into_response(),
        Err(err) => return error_response(err),
    }
    match state.ledger_service.wallet(&child_id).await {
        Ok(wallet) => {
            let wallet = wallet
                .map(WalletMapper::to_dto)
                .unwrap_or_else(|| WalletMapper::empty(&child_id));
            (StatusCode::OK, Json(WalletResponse { wallet })).into_response()
        }
        Err(err) => error_response(err),
    }
}

async fn list_transactions<C: Connection>(
    State(state): State<AppState<C>>,
    Path(child_id): Path<String>,
) -> Response {
    match state.child_service.get_child(&child_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return (StatusCode::NOT_FOUND, "Child not found").into_response(),
        Err(err) => return error_response(err),
    }
    match state.ledger_service.transactions(&child_id).await {
        Ok(transactions) => {
            let response = TransactionListResponse {
                transactions: transactions
                    .into_iter()
                    .map(TransactionMapper::to_dto)
                    .collect(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => error_response(err),
    }
}

async fn record_gift<C: Connection>(
    State(state): State<AppState<C>>,
    Path(child_id): Path<String>,
    Json(request): Json<GiftRequest>,
) -> Response {
    info!(
        "POST /api/children/{}/gifts - {}p / {} stars",
        child_id, request.amount_pence, request.stars
    );
    let child = match state.child_service.get_child(&child_id).await {
        Ok(Some(child)) => child,
        Ok(None) => return (StatusCode::NOT_FOUND, "Child not found").into_response(),
        Err(err) => return error_response(err),
    };
    let source = if request.from_relative {
        TransactionSource::Relative
    } else {
        TransactionSource::Guardian
    };
    match state
        .ledger_service
        .credit(
            &child.family_id,
            &child.id,
            request.amount_pence,
            request.stars,
            source,
            TransactionReason::ManualGift { note: request.note },
        )
        .await
    {
        Ok(transaction) => {
            (StatusCode::CREATED, Json(TransactionMapper::to_dto(transaction))).into_response()
        }
        Err(err) => error_response(err),
    }
}

async fn record_payout<C: Connection>(
    State(state): State<AppState<C>>,
    Path(child_id): Path<String>,
    Json(request): Json<PayoutRequest>,
) -> Response {
    info!(
        "POST /api/children/{}/payouts - {}p",
        child_id, request.amount_pence
    );
    let child = match state.child_service.get_child(&child_id).await {
        Ok(Some(child)) => child,
        Ok(None) => return (StatusCode::NOT_FOUND, "Child not found").into_response(),
        Err(err) => return error_response(err),
    };
    match state
        .ledger_service
        .debit(
            &child.family_id,
            &child.id,
            request.amount_pence,
            0,
            TransactionSource::Guardian,
            TransactionReason::Payout { note: request.note },
        )
        .await
    {
        Ok(transaction) => {
            (StatusCode::CREATED, Json(TransactionMapper::to_dto(transaction))).into_response()
        }
        Err(err) => error_response(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryConnection;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_app() -> Router {
        create_router(AppState::new(Arc::new(MemoryConnection::new())))
    }

    fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn families_can_be_created_over_http() {
        let app = test_app();
        let response = app
            .oneshot(json_request("POST", "/api/families", r#"{"name":"The Harts"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn missing_completions_map_to_not_found() {
        let app = test_app();
        let response = app
            .oneshot(json_request(
                "POST",
                "/api/completions/completion::missing/approve",
                "",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn generation_runs_with_an_empty_store() {
        let app = test_app();
        let response = app
            .oneshot(json_request(
                "POST",
                "/api/generation/run",
                r#"{"as_of":"2026-08-05"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn generated_assignments_show_on_the_family_board() {
        let connection = Arc::new(MemoryConnection::new());
        let state = AppState::new(Arc::clone(&connection));
        let app = create_router(state.clone());

        let family = state
            .family_service
            .create_family(CreateFamilyCommand {
                name: "The Harts".to_string(),
            })
            .await
            .unwrap();
        state
            .child_service
            .create_child(CreateChildCommand {
                family_id: family.id.clone(),
                name: "Ada".to_string(),
            })
            .await
            .unwrap();
        state
            .chore_service
            .create_chore(crate::domain::commands::chore::CreateChoreCommand {
                family_id: family.id.clone(),
                name: "Feed the cat".to_string(),
                frequency: crate::domain::models::chore::Frequency::Daily,
                base_reward_pence: 50,
                competitive: false,
            })
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/generation/run",
                r#"{"as_of":"2026-08-05"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(format!("/api/families/{}/assignments", family.id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let assignments: Vec<shared::Assignment> = serde_json::from_slice(&body).unwrap();
        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0].period_key, "2026-08-05");
    }

    #[tokio::test]
    async fn deleting_a_chore_retires_it_from_generation() {
        let connection = Arc::new(MemoryConnection::new());
        let state = AppState::new(Arc::clone(&connection));
        let app = create_router(state.clone());

        let family = state
            .family_service
            .create_family(CreateFamilyCommand {
                name: "The Harts".to_string(),
            })
            .await
            .unwrap();
        let chore = state
            .chore_service
            .create_chore(crate::domain::commands::chore::CreateChoreCommand {
                family_id: family.id,
                name: "Feed the cat".to_string(),
                frequency: crate::domain::models::chore::Frequency::Daily,
                base_reward_pence: 50,
                competitive: false,
            })
            .await
            .unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/chores/{}", chore.id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let stored = state.chore_service.get_chore(&chore.id).await.unwrap().unwrap();
        assert!(!stored.active);
    }

    #[tokio::test]
    async fn unknown_wallets_read_as_empty() {
        let connection = Arc::new(MemoryConnection::new());
        let state = AppState::new(Arc::clone(&connection));
        let app = create_router(state.clone());

        let family = state
            .family_service
            .create_family(CreateFamilyCommand {
                name: "The Harts".to_string(),
            })
            .await
            .unwrap();
        let child = state
            .child_service
            .create_child(CreateChildCommand {
                family_id: family.id,
                name: "Ada".to_string(),
            })
            .await
            .unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(format!("/api/children/{}/wallet", child.id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
