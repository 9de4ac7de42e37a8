pub mod dto;
mod files;
mod groups;
mod objects;
mod pages;
pub mod response;
mod router;
mod users;

pub use router::{AppState, create_router};
