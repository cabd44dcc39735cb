use {
    anyhow::Context,
    serde::Deserialize,
    std::{
        env, fs,
        io::ErrorKind,
        path::{Path, PathBuf},
    },
};

/// Reads the config file.
///
/// If successful, returns the parsed config file. Returns [`None`] if the config file could not be
/// found.
pub fn obtain_config() -> anyhow::Result<Option<Config>> {
    match config_file_path() {
        Some(config_path) => read_config(&config_path),
        None => Ok(None),
    }
}

fn read_config(config_path: &Path) -> anyhow::Result<Option<Config>> {
    match fs::read_to_string(config_path) {
        Ok(config) => toml::from_str(&config)
            .map(Some)
            .with_context(|| format!("Failed to parse config file {}", config_path.display())),
        Err(error) => match error.kind() {
            ErrorKind::NotFound => Ok(None),
            _ => Err(error).context("Failed to read config file"),
        },
    }
}

/// Gets the path where the `phonebook.toml` config file is expected.
///
/// Returns [`None`] if the config directory could not be found.
fn config_file_path() -> Option<PathBuf> {
    let mut path = config_dir()?;
    path.push("phonebook.toml");
    Some(path)
}

/// Gets the config directory.
fn config_dir() -> Option<PathBuf> {
    // Return $XDG_CONFIG_HOME if it exists,
    // otherwise return $HOME/.config if it exists,
    // otherwise return None
    env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| {
            env::var_os("HOME").map(|home_dir| {
                let mut dir = PathBuf::from(home_dir);
                dir.push(".config");
                dir
            })
        })
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub store_path: Option<PathBuf>,
    /// Address the HTTP API listens on
    pub bind: Option<String>,
}

#[cfg(test)]
mod tests {
    use {super::*, tempfile::TempDir};

    #[test]
    fn missing_config_file() {
        let dir = TempDir::new().unwrap();
        assert!(read_config(&dir.path().join("phonebook.toml"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn full_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("phonebook.toml");
        fs::write(
            &path,
            "store_path = \"/srv/contacts.json\"\nbind = \"0.0.0.0:9000\"\n",
        )
        .unwrap();

        let config = read_config(&path).unwrap().unwrap();

        assert_eq!(config.store_path, Some(PathBuf::from("/srv/contacts.json")));
        assert_eq!(config.bind.as_deref(), Some("0.0.0.0:9000"));
    }

    #[test]
    fn empty_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("phonebook.toml");
        fs::write(&path, "").unwrap();

        let config = read_config(&path).unwrap().unwrap();

        assert!(config.store_path.is_none());
        assert!(config.bind.is_none());
    }

    #[test]
    fn malformed_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("phonebook.toml");
        fs::write(&path, "store_path = [").unwrap();

        assert!(read_config(&path).is_err());
    }

    #[test]
    fn unknown_key_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("phonebook.toml");
        fs::write(&path, "port = 8080").unwrap();

        assert!(read_config(&path).is_err());
    }
}
