//! Demo application.
//!
//! Controller sources live in `demos/routes/`; the same directory is walked
//! at startup to build the route table.
//!
//! ```text
//! cargo run --example demo -- --print-routes
//! cargo run --example demo -- --env e2e
//! ```

use std::path::PathBuf;

use clap::Parser;
use routewright::{launch, ControllerRegistry, LaunchArgs, StartupError};

#[path = "routes/_shared.rs"]
mod shared;

mod routes {
    pub mod index;
    pub mod users;

    pub mod api {
        pub mod projects;
    }
}

fn registry() -> ControllerRegistry {
    ControllerRegistry::new()
        .register::<routes::index::Home>("index")
        .register::<routes::users::Users>("users")
        .register::<routes::api::projects::Projects>("api/projects")
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let mut args = LaunchArgs::parse();
    args.config
        .get_or_insert_with(|| PathBuf::from("demos/app-settings.toml"));

    launch(args, registry()).await
}
