use std::future::Future;

use crate::domain::{common::entities::app_errors::CoreError, share::entities::ShareCard};

/// Turns a share card into an image and returns where it was written.
pub trait ImageExporter: Send + Sync {
    fn export(&self, card: &ShareCard) -> impl Future<Output = Result<String, CoreError>> + Send;
}

pub trait Clipboard: Send + Sync {
    fn copy(&self, text: &str) -> Result<(), CoreError>;
}
