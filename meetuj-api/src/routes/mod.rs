/// API route handlers, one module per resource
///
/// - `health`: liveness and database check
/// - `auth`: registration and login
/// - `users`: account lookup and profile management
/// - `pictures`: profile picture upload and download
/// - `contacts`: the caller's contact list
/// - `meetings`: meetings and their participants
/// - `ws`: WebSocket upgrade

pub mod auth;
pub mod contacts;
pub mod health;
pub mod meetings;
pub mod pictures;
pub mod users;
pub mod ws;
