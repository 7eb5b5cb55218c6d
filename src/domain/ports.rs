use crate::domain::model::Catalog;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Supplies the listing catalog once at process start.
pub trait CatalogProvider: Send + Sync {
    fn load(&self) -> Result<Catalog>;
}

/// Generative text collaborator. Returns the raw model output; callers
/// validate its shape before trusting it.
#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    async fn generate(&self, system_instruction: &str, user_message: &str) -> Result<String>;
}
