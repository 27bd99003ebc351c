pub mod archive;
pub mod handle;
pub mod model;
pub mod qr;
pub mod repository;
pub mod repository_memory;
pub mod route;
pub mod schema;
pub mod service;
pub mod sweeper;
pub mod template;

pub use repository_memory::ShareRepositoryMemory;
pub use service::ShareService;
pub use sweeper::Sweeper;
