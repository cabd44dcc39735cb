use {
    anyhow::{bail, Context},
    clap::{Parser, Subcommand},
    phonebook::config::Config,
    std::{env, path::PathBuf, str::FromStr},
};

/// The store used when neither `--store` nor the config file name one.
const DEFAULT_STORE_FILE: &str = "contacts.json";

#[derive(Debug, Parser)]
#[command(name = "phonebook", about = "Manage a small directory of contacts")]
pub struct Args {
    #[command(subcommand)]
    command: Command,
    /// The JSON file holding the contacts
    #[arg(short = 's', long = "store", visible_alias = "file", global = true)]
    store_path: Option<PathBuf>,
    /// Log debug output to STDERR
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,
}

impl Args {
    pub fn command(&self) -> &Command {
        &self.command
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// The absolute path of the contact store.
    ///
    /// `--store` wins over the config file, which wins over `contacts.json` in the current
    /// directory.
    pub fn store_path(&self, config: &Config) -> anyhow::Result<PathBuf> {
        let path = self
            .store_path
            .clone()
            .or_else(|| config.store_path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_FILE));

        if path.is_absolute() {
            Ok(path)
        } else {
            let current_dir = env::current_dir().context("Error resolving data file path")?;
            Ok(current_dir.join(path))
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List all contacts
    List,
    /// Add a new contact
    Add {
        #[arg(short = 'n', long = "name")]
        name: String,
        #[arg(short = 'p', long = "phone")]
        phone: String,
    },
    /// Delete a contact
    Delete {
        #[arg(short = 'n', long = "name")]
        name: String,
    },
    /// Edit an existing contact
    Edit {
        #[arg(short = 'n', long = "name")]
        name: String,
        /// New name
        #[arg(long = "new-name")]
        new_name: Option<String>,
        /// New phone number
        #[arg(long = "new-phone")]
        new_phone: Option<String>,
    },
    /// Check if a contact exists
    Exists {
        #[arg(short = 'n', long = "name")]
        name: String,
    },
    /// Show the contacts with the given name (all contacts if no name is given)
    Find {
        #[arg(short = 'n', long = "name", default_value = "")]
        name: String,
    },
    /// Output contacts to STDOUT in the given format (by default vCard)
    Export {
        /// The format of the output (vcard/json)
        #[arg(short = 'f', long = "fmt", default_value = "vcard")]
        format: OutputFormat,
    },
    /// Start the HTTP API
    Serve {
        /// Address to listen on, e.g. 127.0.0.1:8080
        #[arg(short = 'b', long = "bind")]
        bind: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OutputFormat {
    Json,
    Vcard,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;
    fn from_str(format: &str) -> anyhow::Result<Self> {
        Ok(match format.to_ascii_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "vcard" => OutputFormat::Vcard,
            _ => bail!("Invalid output format"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("phonebook").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn parses_add() {
        let args = parse(&["add", "--name", "John", "--phone", "0612345678"]);

        assert!(matches!(
            args.command(),
            Command::Add { name, phone } if name == "John" && phone == "0612345678"
        ));
    }

    #[test]
    fn parses_edit_with_optional_fields() {
        let args = parse(&["edit", "-n", "Jane", "--new-phone", "0622222222"]);

        assert!(matches!(
            args.command(),
            Command::Edit { name, new_name: None, new_phone: Some(phone) }
                if name == "Jane" && phone == "0622222222"
        ));
    }

    #[test]
    fn find_defaults_to_everything() {
        let args = parse(&["find"]);
        assert!(matches!(args.command(), Command::Find { name } if name.is_empty()));
    }

    #[test]
    fn export_format() {
        assert!(matches!(
            parse(&["export"]).command(),
            Command::Export {
                format: OutputFormat::Vcard
            }
        ));
        assert!(matches!(
            parse(&["export", "-f", "JSON"]).command(),
            Command::Export {
                format: OutputFormat::Json
            }
        ));
        assert!(Args::try_parse_from(["phonebook", "export", "-f", "csv"]).is_err());
    }

    #[test]
    fn add_requires_phone() {
        assert!(Args::try_parse_from(["phonebook", "add", "--name", "John"]).is_err());
    }

    #[test]
    fn global_options_after_subcommand() {
        let args = parse(&["list", "--file", "/tmp/book.json", "-v"]);

        assert!(args.verbose());
        assert_eq!(
            args.store_path(&Config::default()).unwrap(),
            PathBuf::from("/tmp/book.json")
        );
    }

    #[test]
    fn store_path_precedence() {
        let config = Config {
            store_path: Some(PathBuf::from("/etc/book.json")),
            ..Config::default()
        };

        let flagged = parse(&["--store", "/tmp/flag.json", "list"]);
        assert_eq!(
            flagged.store_path(&config).unwrap(),
            PathBuf::from("/tmp/flag.json")
        );

        let unflagged = parse(&["list"]);
        assert_eq!(
            unflagged.store_path(&config).unwrap(),
            PathBuf::from("/etc/book.json")
        );
        assert_eq!(
            unflagged.store_path(&Config::default()).unwrap(),
            env::current_dir().unwrap().join(DEFAULT_STORE_FILE)
        );
    }
}
