pub mod comments_repo;
pub mod migrations;
pub mod pool;
pub mod posts_repo;

pub use migrations::run_migrations;
pub use pool::{DbPool, DbPoolError, connect_lazy};
