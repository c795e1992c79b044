//! Dice rolling endpoint.

use axum::extract::{Query, State};
use axum::{routing::get, Router};
use serde::Deserialize;
use shared::span::{handler_span, mark_ok};
use tracing::{Instrument, Span};

use crate::state::AppState;

/// Query parameters of `/rolldice`.
#[derive(Debug, Default, Deserialize)]
pub struct DiceQuery {
    /// Name of the rolling player. Missing or empty means anonymous.
    pub player: Option<String>,
}

impl DiceQuery {
    fn player(&self) -> Option<&str> {
        self.player.as_deref().filter(|name| !name.is_empty())
    }
}

/// Creates the dice route.
pub fn dice_routes() -> Router<AppState> {
    Router::new().route("/rolldice", get(roll_dice))
}

/// Rolls the configured dice and returns the result as plain text.
async fn roll_dice(State(state): State<AppState>, Query(query): Query<DiceQuery>) -> String {
    async move {
        let roll = state.dice().roll(&mut rand::rng());
        match query.player() {
            Some(player) => tracing::warn!(player, roll, "{player} is rolling the dice: {roll}"),
            None => tracing::warn!(roll, "Anonymous player is rolling the dice: {roll}"),
        }
        mark_ok(&Span::current());
        roll.to_string()
    }
    .instrument(handler_span("rolldice"))
    .await
}
