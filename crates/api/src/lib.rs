//! Herald HTTP API: user registration, JWT authentication, notification and
//! contact CRUD, and the notification send endpoint backed by
//! `herald-dispatch`.

pub mod middleware;
pub mod routes;
pub mod state;
