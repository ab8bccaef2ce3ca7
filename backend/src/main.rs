#![deny(clippy::all)]
#![warn(clippy::nursery)]
#![warn(clippy::pedantic)]
#![warn(clippy::todo)]
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]

#[tokio::main]
async fn main() {
    app::run().await;
}


pub mod cfg {
    mod app_settings;
    mod board_settings;
    mod database_settings;
    mod jwt_settings;
    mod server_settings;

    pub use app_settings::*;
    pub use board_settings::*;
    pub use database_settings::*;
    pub use jwt_settings::*;
    pub use server_settings::*;
}

pub mod core {
    mod context;
    mod dberror;
    mod error;

    pub use context::*;
    pub use dberror::*;
    pub use error::*;
}

pub mod auth {
    mod caller;
    mod jwt;
    mod password;

    pub use caller::*;
    pub use jwt::*;
    pub use password::*;
}

pub mod db {
    mod posts;
    mod sessions;
    mod tenants;
    mod users;
    mod votes;

    pub use posts::*;
    pub use sessions::*;
    pub use tenants::*;
    pub use users::*;
    pub use votes::*;
}

pub mod services {
    pub mod credentials;
    pub mod posts;
    pub mod tenants;
    pub mod votes;
}

pub mod routes {
    pub mod auth;
    pub mod health;
    pub mod posts;
    pub mod tenants;
}

pub mod app {
    mod cli;
    mod migrations;
    mod router;
    mod server;

    pub use cli::*;
    pub use migrations::*;
    pub use router::*;
    pub use server::*;
}
