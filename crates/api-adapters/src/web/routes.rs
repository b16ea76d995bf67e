use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::web::handlers::*;

/// Builds the full HTTP router.
pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        // Profile
        .route("/users", post(register_user))
        .route("/me", get(get_me).patch(update_me))
        .route("/me/welcome", post(acknowledge_welcome))
        .route("/me/email", post(register_email))
        .route("/me/stats", get(my_stats))
        .route("/me/rank", get(my_rank))
        // Quests
        .route("/quests", get(quest_board))
        .route("/quests/{id}/select", post(select_quest))
        .route("/quests/{id}/complete", post(complete_quest))
        .route("/quests/{id}/submissions", post(submit_proof))
        // Rewards
        .route("/rewards", get(list_rewards))
        .route("/rewards/{id}/claim", post(request_claim))
        .route("/claim", get(claim_state))
        .route("/claim/confirm", post(confirm_claim))
        .route("/claim/cancel", post(cancel_claim))
        .route("/claim/dismiss", post(dismiss_claim))
        // Activity & leaderboard
        .route("/activity", get(activity))
        .route("/leaderboard", get(leaderboard))
        // Admin
        .route("/admin/submissions", get(review_queue))
        .route("/admin/submissions/{id}/resolve", post(resolve_submission))
        .route("/admin/quests", post(create_quest))
        .route("/admin/quests/{id}", patch(update_quest).delete(delete_quest))
        .route("/admin/rewards", post(create_reward))
        .route("/admin/rewards/{id}", patch(update_reward));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
