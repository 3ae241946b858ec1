//! Shared media catalog: users upload records, share them with other users, and
//! list everything they own or were granted.

pub mod blob;
pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod state;

pub mod crypto {
    pub mod token;
}

pub mod models {
    pub mod record;
    pub mod session;
    pub mod user;
}

pub mod repositories {
    pub mod grant;
    pub mod record;
    pub mod session;
    pub mod user;
}

pub mod services {
    pub mod auth;
    pub mod visibility;
}

pub mod handlers {
    pub mod auth;
    pub mod json;
    pub mod tracks;
    pub mod users;
}

pub mod middleware_layer {
    pub mod auth;
}

pub mod validation {
    pub mod auth;
    pub mod params;
}
