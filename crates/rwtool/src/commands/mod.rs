//! Command handlers, one module per top-level noun.

pub mod auth;
pub mod config_cmd;
pub mod domains;
pub mod favorites;
pub mod folders;
pub mod groups;
pub mod reports;
pub mod requests;
pub mod util;

use rwtool_core::{Gateways, Session};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;
use crate::output;

/// Everything a handler needs besides its own arguments.
pub struct CommandContext {
    pub gateways: Gateways,
    pub session: Session,
    pub profile: String,
    /// Base URL of the server, for display.
    pub server: String,
    pub color: bool,
}

impl CommandContext {
    pub fn new(
        gateways: Gateways,
        session: Session,
        profile: String,
        server: String,
        global: &GlobalOpts,
    ) -> Self {
        Self {
            gateways,
            session,
            profile,
            server,
            color: output::should_color(&global.color),
        }
    }

    /// Email of the identity this invocation acts as.
    pub fn email(&self) -> Result<&str, CliError> {
        util::require_email(&self.session, &self.profile)
    }

    pub fn notice(&self, global: &GlobalOpts, message: &str) {
        output::print_notice(&global.output, message, global.quiet, self.color);
    }
}

/// Route a server-bound command to its handler.
pub async fn dispatch(
    cmd: Command,
    ctx: &CommandContext,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Domains(args) => domains::handle(args, ctx, global).await,
        Command::Requests(args) => requests::handle(args, ctx, global).await,
        Command::Groups(args) => groups::handle(args, ctx, global).await,
        Command::Folders(args) => folders::handle(args, ctx, global).await,
        Command::Reports(args) => reports::handle(args, ctx, global).await,
        Command::Favorites(args) => favorites::handle(args, ctx, global).await,
        Command::Auth(args) => auth::handle(args, ctx, global).await,
        // Handled in main before a client is built.
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
