pub mod memory;
pub mod session;
pub mod user;

pub use memory::InMemorySessionRepository;
pub use memory::InMemoryUserRepository;
pub use session::PostgresSessionRepository;
pub use user::PostgresUserRepository;
