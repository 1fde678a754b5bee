//! API Module
//!
//! HTTP handlers and routing for inspecting and driving the named caches.
//!
//! # Endpoints
//! - `PUT /caches/:kind` - Store an entity
//! - `GET /caches/:kind/:id` - Retrieve an entity
//! - `DELETE /caches/:kind/:id` - Delete an entity
//! - `DELETE /caches/:kind` - Clear one cache
//! - `PUT|GET|DELETE /sessions/:game_id` - Save, load or drop a game session
//! - `GET /stats/:kind` - Statistics for one cache
//! - `GET /stats` - Statistics for every cache
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
