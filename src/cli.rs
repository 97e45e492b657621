use clap::{Parser, Subcommand};

fn get_version() -> &'static str {
    const BASE_VERSION: &str = env!("CARGO_PKG_VERSION");

    // If there's a git tag at HEAD, use just the tag (release build)
    if let Some(tag) = option_env!("XBOX_EXTRA_GIT_TAG") {
        return tag;
    }

    // Not on a tag - include commit hash and branch (dev build)
    let commit = option_env!("XBOX_EXTRA_GIT_COMMIT").unwrap_or("unknown");
    let branch = option_env!("XBOX_EXTRA_GIT_BRANCH").unwrap_or("unknown");

    // Return a static string by leaking the formatted string
    // This is safe because it only happens once at startup
    let version = format!("v{}-{} ({})", BASE_VERSION, commit, branch);
    Box::leak(version.into_boxed_str())
}

#[derive(Parser)]
#[command(name = "xbox-extra")]
#[command(about = "Installer for the Cxbx-Reloaded / xemu Xbox emulation add-on")]
#[command(version = get_version(), propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (use multiple times for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Reduce output to errors only
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download the emulators, install the launcher and register the xbox system
    #[command(
        after_help = "Downloads Cxbx-Reloaded and xemu, unpacks them under\n\
                      /userdata/system/xbox-extra/, installs the launcher payload and\n\
                      writes es_systems_xbox.cfg. Aborts on the first failing step."
    )]
    Install,

    /// Remove the xbox-extra tree, the ES system entry and the batocera.conf keys
    #[command(
        after_help = "Best effort: artifacts that are already gone are reported as\n\
                      warnings, not errors, and the command still exits 0."
    )]
    Uninstall,

    /// Report which xbox-extra artifacts are currently present
    Status,

    /// Show the current version
    Version,
}
