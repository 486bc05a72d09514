//! Alias resolution for server and database names

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// Default server when no alias is given
pub const DEFAULT_SERVER: &str = "DC1Q2PSQLFE1V";

/// Default database when no alias is given
pub const DEFAULT_DATABASE: &str = "QuantDB";

/// Server holding the data dictionary
pub const DICTIONARY_SERVER: &str = "vdbedcisandbox";

/// Database holding the data dictionary
pub const DICTIONARY_DATABASE: &str = "RDM";

const BUILTIN_SERVERS: &[(&str, &str)] = &[
    ("quant", "DC1Q2PSQLFE1V"),
    ("sand", "vdbedcisandbox"),
    ("vision", "vdbeaglevision"),
];

const BUILTIN_DATABASES: &[(&str, &str)] = &[
    ("quant", "QuantDB"),
    ("cust", "CUSTDM_10012018"),
    ("loan", "RDM_loan"),
];

/// Short names for servers and databases that are hard to remember.
///
/// Lookups are total: a name that is not a key comes back unchanged.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct Aliases {
    #[serde(default)]
    servers: HashMap<String, String>,
    #[serde(default)]
    databases: HashMap<String, String>,
}

impl Aliases {
    /// The built-in alias tables
    pub fn builtin() -> Self {
        let collect = |pairs: &[(&str, &str)]| {
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        };

        Self {
            servers: collect(BUILTIN_SERVERS),
            databases: collect(BUILTIN_DATABASES),
        }
    }

    /// Process-wide built-in tables, constructed on first use
    pub fn global() -> &'static Aliases {
        static BUILTIN: OnceLock<Aliases> = OnceLock::new();
        BUILTIN.get_or_init(Aliases::builtin)
    }

    /// Add entries from `other`, replacing any that share a key
    pub fn extend(&mut self, other: Aliases) {
        self.servers.extend(other.servers);
        self.databases.extend(other.databases);
    }

    pub fn with_server(mut self, alias: &str, server: &str) -> Self {
        self.servers.insert(alias.to_string(), server.to_string());
        self
    }

    pub fn with_database(mut self, alias: &str, database: &str) -> Self {
        self.databases.insert(alias.to_string(), database.to_string());
        self
    }

    pub fn server<'a>(&'a self, name: &'a str) -> &'a str {
        self.servers.get(name).map(String::as_str).unwrap_or(name)
    }

    pub fn database<'a>(&'a self, name: &'a str) -> &'a str {
        self.databases.get(name).map(String::as_str).unwrap_or(name)
    }

    /// Resolve both halves of a target
    pub fn resolve(&self, database: &str, server: &str) -> Target {
        Target {
            server: self.server(server).to_string(),
            database: self.database(database).to_string(),
        }
    }

    pub fn servers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.servers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn databases(&self) -> impl Iterator<Item = (&str, &str)> {
        self.databases.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Resolve a server alias against the built-in table
pub fn resolve_server(name: &str) -> &str {
    Aliases::global().server(name)
}

/// Resolve a database alias against the built-in table
pub fn resolve_database(name: &str) -> &str {
    Aliases::global().database(name)
}

/// A resolved (server, database) pair
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct Target {
    pub server: String,
    pub database: String,
}

impl Target {
    pub fn new(server: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            database: database.into(),
        }
    }

    /// The implicit default environment
    pub fn default_environment() -> Self {
        Self::new(DEFAULT_SERVER, DEFAULT_DATABASE)
    }

    /// Where the data dictionary lives
    pub fn dictionary() -> Self {
        Self::new(DICTIONARY_SERVER, DICTIONARY_DATABASE)
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint::parse(&self.server)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.server, self.database)
    }
}

/// Network location parsed from a server string.
///
/// Accepts `host`, `host,port`, `host\instance` and `host\instance,port`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub instance: Option<String>,
    pub port: Option<u16>,
}

impl Endpoint {
    pub fn parse(server: &str) -> Self {
        let server = server.trim();

        let (rest, port) = match server.rsplit_once(',') {
            Some((rest, port)) => match port.trim().parse() {
                Ok(port) => (rest, Some(port)),
                Err(_) => (server, None),
            },
            None => (server, None),
        };

        let (host, instance) = match rest.split_once('\\') {
            Some((host, instance)) if !instance.is_empty() => (host, Some(instance.to_string())),
            Some((host, _)) => (host, None),
            None => (rest, None),
        };

        Self {
            host: host.trim().to_string(),
            instance,
            port,
        }
    }
}
