pub mod controller;

pub use controller::{ChatController, Submission};

use crate::{
    domain::common::{DietChatConfig, entities::app_errors::CoreError},
    infrastructure::http::HttpDietApi,
};

pub type DietChatController = ChatController<HttpDietApi>;

pub fn create_controller(config: DietChatConfig) -> Result<DietChatController, CoreError> {
    let api = HttpDietApi::new(&config.api)?;
    Ok(ChatController::new(api, config.session))
}
