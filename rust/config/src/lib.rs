pub mod helpers;

use async_trait::async_trait;
use ras_error::RasError;

/// A component that can be built from its configuration section.
#[async_trait]
pub trait Configurable<T, E = Box<dyn RasError>> {
    async fn try_from_config(config: &T) -> Result<Self, E>
    where
        Self: Sized;
}
