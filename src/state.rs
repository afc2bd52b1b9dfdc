use std::sync::Arc;

use crate::auth::TokenIssuer;
use crate::chart::ChartCalculator;
use crate::db::{PostRepository, UserRepository};

/// Shared handles passed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub tokens: Arc<TokenIssuer>,
    pub chart: Arc<ChartCalculator>,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        tokens: TokenIssuer,
        chart: ChartCalculator,
    ) -> Self {
        AppState {
            users,
            posts,
            tokens: Arc::new(tokens),
            chart: Arc::new(chart),
        }
    }
}
