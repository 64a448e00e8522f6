//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};

use crate::domain::{EntityId, ReleaseGroupRequest};

/// Manage FOSSA projects, teams, policies and release groups
#[derive(Parser, Debug)]
#[command(name = "fossa-release-groups")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// FOSSA API key
    #[arg(long, global = true, env = "FOSSA_API_KEY", hide_env_values = true)]
    pub fossa_api_key: Option<String>,

    /// Config file (overrides the global config)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List projects, teams, policies or release groups
    List {
        /// Resource to list
        #[arg(long = "type", value_enum)]
        resource: ResourceType,

        /// Include each release's projects (release groups only)
        #[arg(long)]
        release_projects: bool,
    },

    /// Create a release group, or add a version to an existing one
    Add(AddArgs),

    /// Copy a release's projects from one release group to another
    Copy {
        /// Release group to copy from
        #[arg(long)]
        release_group_name_src: String,

        /// Release group to copy to
        #[arg(long)]
        release_group_name_dest: String,

        /// Release (version) present in both groups
        #[arg(long)]
        release_group_version: String,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceType {
    Projects,
    Teams,
    Policies,
    ReleaseGroups,
}

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    /// Name of the release group
    #[arg(long)]
    pub release_group_name: String,

    /// Version of the release group
    #[arg(long)]
    pub release_group_version: String,

    /// ID of the licensing policy
    #[arg(long)]
    pub licensing_policy_id: Option<EntityId>,

    /// ID of the security policy
    #[arg(long)]
    pub security_policy_id: Option<EntityId>,

    /// ID of the quality policy
    #[arg(long)]
    pub quality_policy_id: Option<EntityId>,

    /// IDs of the teams
    #[arg(long, num_args = 1..)]
    pub teams: Vec<EntityId>,
}

impl From<&AddArgs> for ReleaseGroupRequest {
    fn from(args: &AddArgs) -> Self {
        Self {
            name: args.release_group_name.clone(),
            version: args.release_group_version.clone(),
            licensing_policy_id: args.licensing_policy_id.clone(),
            security_policy_id: args.security_policy_id.clone(),
            quality_policy_id: args.quality_policy_id.clone(),
            teams: args.teams.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },

    /// Show config paths
    Path,
}
