pub mod cli;
pub mod credentials;
pub mod error;
pub mod github;
pub mod logging;
pub mod model;
pub mod publish;
pub mod reconcile;
pub mod render;
pub mod retry;
pub mod show;
pub mod snapshot;
pub mod update;
pub mod util;
