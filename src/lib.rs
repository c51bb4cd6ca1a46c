//! A minimal direct-messaging backend: registration, bearer-token sessions,
//! and per-correspondent message history.

pub mod cache;
pub mod config;
pub mod db;
pub mod doc;
pub mod error;
pub mod metrics;
pub mod routes;
pub mod state;

pub mod crypto {
    pub mod token;
}

pub mod models {
    pub mod message;
    pub mod session;
    pub mod user;
}

pub mod repositories {
    pub mod memory;
    pub mod message;
    pub mod session;
    pub mod user;
}

pub mod services {
    pub mod conversations;
    pub mod identity;
    pub mod messages;
    pub mod sessions;
}

pub mod handlers {
    pub mod auth;
    pub mod docs;
    pub mod health;
    pub mod messages;
    pub mod metrics;
}

pub mod middleware_layer {
    pub mod auth;
    pub mod metrics;
}

pub mod validation {
    pub mod auth;
    pub mod message;
    pub mod request;
}
