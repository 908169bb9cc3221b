use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use pf_console::error::Result;

////////////////////////////////////////////////////////////
// Console profile
////////////////////////////////////////////////////////////

/// Connection profile for one forwarding service, loaded from YAML.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub endpoint: String,

    pub username: String,

    pub password: String,

    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,
}

fn default_refresh_interval_ms() -> u64 {
    3000
}

////////////////////////////////////////////////////////////
// Yaml parser
////////////////////////////////////////////////////////////

pub struct Parser;

impl Parser {
    pub fn parse_yaml<P: AsRef<Path>>(path: P) -> Result<Profile> {
        let reader = Self::file_reader(path)?;
        let profile: Profile = serde_yaml::from_reader(reader)?;
        Ok(profile)
    }

    fn file_reader<P: AsRef<Path>>(path: P) -> Result<BufReader<File>> {
        let f = std::fs::File::open(path)?;
        Ok(BufReader::new(f))
    }
}

////////////////////////////////////////////////////////////
// Unit test
////////////////////////////////////////////////////////////
#[cfg(test)]
#[path = "config_test.rs"]
mod test;
