mod http_server;

pub use http_server::{build_router, AppError, AppState};
