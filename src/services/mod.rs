pub mod embedding;
pub mod initializer;
pub mod pool;
pub mod providers;
pub mod recommendations;
pub mod similarity;
pub mod user_store;

pub use embedding::EmbeddingClient;
pub use initializer::PoolInitializer;
pub use pool::{ItemPool, PoolStats};
pub use recommendations::{RecommendationEngine, RecommendationRequest};
pub use user_store::UserStore;
