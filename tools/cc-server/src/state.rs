use std::sync::Arc;

use cc_store::Store;
use cc_webhook::Dispatcher;

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub dispatcher: Dispatcher,
    pub config: Arc<Config>,
}
