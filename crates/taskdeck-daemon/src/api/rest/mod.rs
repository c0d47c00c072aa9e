//! REST endpoints under `/api`

pub mod handlers;
pub mod router;
pub mod state;
pub mod stream;
