//! `usermap create` subcommands.

pub mod user_identity_mapping;

use clap::Subcommand;

pub use user_identity_mapping::run_create_user_identity_mapping;

use user_identity_mapping::UserIdentityMappingArgs;

/// Resources that can be created.
#[derive(Subcommand, Debug)]
pub enum CreateCommands {
    /// Manually map an identity to a user.
    #[command(
        name = "useridentitymapping",
        override_usage = "usermap create useridentitymapping <IDENTITY_NAME> <USER_NAME> [OPTIONS]",
        long_about = user_identity_mapping::LONG_ABOUT,
        after_help = user_identity_mapping::EXAMPLES
    )]
    UserIdentityMapping(UserIdentityMappingArgs),
}
