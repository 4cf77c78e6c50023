use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "leadflow", version, about = "Lead CSV imports and campaign activation")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Backend base URL (overrides LEADFLOW_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Tenant owner id (overrides LEADFLOW_OWNER_UID)
    #[arg(long, global = true)]
    pub owner_uid: Option<String>,

    /// Bearer token (overrides LEADFLOW_API_TOKEN)
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the header, a row sample and the proposed column mapping of a CSV file
    Preview {
        file: PathBuf,

        #[command(flatten)]
        parse: LocalParseArgs,
    },
    /// Import a CSV file and follow the batch until it finishes
    Import {
        file: PathBuf,

        /// Override the proposed mapping, e.g. --map "Agent Notes=notes". Use "COL=" to drop a column.
        #[arg(short, long = "map", value_name = "COLUMN=FIELD")]
        mappings: Vec<String>,

        /// Skip the confirmation prompt
        #[arg(short, long, default_value_t = false)]
        yes: bool,

        /// Stop following the batch after this many seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Build the mapping from a local parse instead of a backend preview.
        /// The file is uploaded unchanged, so local-only options such as
        /// --delimiter and --skip-top-rows are not accepted here.
        #[arg(long, default_value_t = false)]
        offline: bool,
    },
    /// Follow an existing import batch until it finishes
    Watch { batch_id: String },
    /// List past imports, newest first
    History {
        /// Show at most this many batches
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show the health of every lead source
    Sources,
    /// Campaign lifecycle actions
    Campaigns {
        #[command(subcommand)]
        command: CampaignCommands,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct LocalParseArgs {
    /// Parse the file locally instead of asking the backend for a preview
    #[arg(long, default_value_t = false)]
    pub offline: bool,

    /// Delimiter for local parsing: ",", ";", "\t", "|" or "auto"
    #[arg(long, requires = "offline")]
    pub delimiter: Option<String>,

    /// Rows to skip before the header when parsing locally
    #[arg(long, requires = "offline")]
    pub skip_top_rows: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum CampaignCommands {
    /// List campaigns with their connection warnings
    List,
    /// Activate a READY campaign after the preflight check
    Activate { campaign_id: String },
    /// Pause an ACTIVE campaign
    Pause { campaign_id: String },
    /// Copy a campaign into a new DRAFT
    Duplicate { campaign_id: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_import_with_mappings() {
        let cli = Cli::parse_from([
            "leadflow",
            "import",
            "leads.csv",
            "--map",
            "Agent Notes=notes",
            "--map",
            "Zip=",
            "--yes",
            "--owner-uid",
            "owner-1",
        ]);
        match cli.command {
            Commands::Import {
                file,
                mappings,
                yes,
                ..
            } => {
                assert_eq!(file, PathBuf::from("leads.csv"));
                assert_eq!(mappings, vec!["Agent Notes=notes", "Zip="]);
                assert!(yes);
            }
            _ => panic!("Expected import subcommand"),
        }
        assert_eq!(cli.global.owner_uid.as_deref(), Some("owner-1"));
    }

    #[test]
    fn test_parse_campaign_activate() {
        let cli = Cli::parse_from(["leadflow", "campaigns", "activate", "cmp-1"]);
        match cli.command {
            Commands::Campaigns {
                command: CampaignCommands::Activate { campaign_id },
            } => assert_eq!(campaign_id, "cmp-1"),
            _ => panic!("Expected campaigns activate"),
        }
    }

    #[test]
    fn test_import_rejects_local_only_parse_flags() {
        for flag in ["--skip-top-rows", "--delimiter"] {
            let result = Cli::try_parse_from([
                "leadflow",
                "import",
                "leads.csv",
                "--offline",
                flag,
                "1",
            ]);
            assert!(result.is_err(), "{} accepted on import", flag);
        }

        let cli = Cli::try_parse_from(["leadflow", "import", "leads.csv", "--offline"]).unwrap();
        match cli.command {
            Commands::Import { offline, .. } => assert!(offline),
            _ => panic!("Expected import subcommand"),
        }
    }

    #[test]
    fn test_local_parse_flags_require_offline() {
        let result = Cli::try_parse_from(["leadflow", "preview", "leads.csv", "--delimiter", ";"]);
        assert!(result.is_err());

        let cli = Cli::try_parse_from([
            "leadflow",
            "preview",
            "leads.csv",
            "--offline",
            "--delimiter",
            ";",
        ])
        .unwrap();
        match cli.command {
            Commands::Preview { parse, .. } => {
                assert!(parse.offline);
                assert_eq!(parse.delimiter.as_deref(), Some(";"));
            }
            _ => panic!("Expected preview subcommand"),
        }
    }
}
