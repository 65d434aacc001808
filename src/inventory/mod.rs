// Inventory: the single host group a run targets

/// Pseudo-host used when a play runs on the controller itself
pub const LOCALHOST: &str = "localhost";

/// One named group of hosts, rendered as an INI inventory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inventory {
    pub group: String,
    pub hosts: Vec<String>,
}

impl Inventory {
    pub fn new(group: impl Into<String>, hosts: Vec<String>) -> Self {
        Inventory {
            group: group.into(),
            hosts,
        }
    }

    /// A group holding only the controller
    pub fn localhost(group: impl Into<String>) -> Self {
        Self::new(group, vec![LOCALHOST.to_string()])
    }

    /// Render as INI: the `[group]` header followed by one host per line
    pub fn to_ini(&self) -> String {
        let mut out = format!("[{}]\n", self.group);
        for host in &self.hosts {
            out.push_str(host);
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_localhost_inventory() {
        let inv = Inventory::localhost("single");
        assert_eq!(inv.to_ini(), "[single]\nlocalhost\n");
    }

    #[test]
    fn test_host_list_inventory() {
        let inv = Inventory::new("a", vec!["web01".to_string(), "web02".to_string()]);
        assert_eq!(inv.to_ini(), "[a]\nweb01\nweb02\n");
    }
}
