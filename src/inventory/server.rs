use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, Eq, PartialEq, Hash, Clone, Debug)]
pub struct Server {
    pub name: String,
    /// server_uuid, used to match the primary's replica registry
    pub uuid: Option<String>,
    /// YAML facts file exported for this server
    pub facts_file: Option<String>,
}

impl Server {
    pub fn from(from: &Server, facts_dir: &Option<String>) -> Self {
        let facts_file = from.facts_file.clone().or_else(|| {
            let file_name = format!("{}.yml", from.name);
            Some(match facts_dir {
                Some(dir) => format!("{}/{}", dir.trim_end_matches('/'), file_name),
                None => file_name,
            })
        });
        Self {
            name: from.name.clone(),
            uuid: from.uuid.clone(),
            facts_file,
        }
    }
}

impl fmt::Display for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.uuid {
            Some(uuid) => write!(f, "{} ({})", self.name, uuid),
            None => write!(f, "{}", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare(name: &str) -> Server {
        Server {
            name: name.to_string(),
            uuid: None,
            facts_file: None,
        }
    }

    #[test]
    fn test_defaults_are_applied() {
        let server = Server::from(&bare("db2"), &Some("facts/".to_string()));
        assert_eq!(server.facts_file.as_deref(), Some("facts/db2.yml"));
        assert_eq!(server.to_string(), "db2");

        let server = Server::from(&bare("db2"), &None);
        assert_eq!(server.facts_file.as_deref(), Some("db2.yml"));
    }

    #[test]
    fn test_explicit_values_win() {
        let mut explicit = bare("db3");
        explicit.uuid = Some("u3".to_string());
        explicit.facts_file = Some("/var/lib/facts/db3.yaml".to_string());
        let server = Server::from(&explicit, &Some("facts".to_string()));
        assert_eq!(server.facts_file.as_deref(), Some("/var/lib/facts/db3.yaml"));
        assert_eq!(server.to_string(), "db3 (u3)");
    }
}
