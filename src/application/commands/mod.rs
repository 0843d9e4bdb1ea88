// src/application/commands/mod.rs
//
// Command Handlers
//
// ARCHITECTURE:
// - Commands are thin adapters between the command line and Services
// - Commands accept DTOs, return DTOs
// - Commands convert errors into ErrorResponse
// - Commands NEVER contain business logic

pub mod coffee_commands;
pub mod remote_commands;
pub mod statistics_commands;
pub mod transfer_commands;

pub use coffee_commands::*;
pub use remote_commands::*;
pub use statistics_commands::*;
pub use transfer_commands::*;
