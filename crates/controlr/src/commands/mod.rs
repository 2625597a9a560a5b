//! Command dispatch: bridges CLI args -> controller calls -> output formatting.

pub mod config_cmd;
pub mod devices;
pub mod heater;
pub mod property;
pub mod watch;

use controlr_core::Controller;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a cloud-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Devices(args) => devices::handle(controller, args, global).await,
        Command::Heater(args) => heater::handle(controller, args, global).await,
        Command::Property(args) => property::handle(controller, args, global).await,
        Command::Watch(args) => watch::handle(controller, args, global).await,
        // Handled before a controller is built
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
