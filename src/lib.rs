pub mod config;
pub mod model;
pub mod store;
pub mod web;

use std::sync::Arc;

use tera::Tera;

use model::ChatModel;
use store::ChatStore;

// App state structure, shared with every handler through `web::Data`.
pub struct AppState {
    pub tera: Tera,
    pub model: Arc<dyn ChatModel>,
    pub store: Arc<dyn ChatStore>,
}

impl AppState {
    pub fn new(tera: Tera, model: Arc<dyn ChatModel>, store: Arc<dyn ChatStore>) -> Self {
        Self { tera, model, store }
    }
}
