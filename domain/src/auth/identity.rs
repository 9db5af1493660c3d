//! Calling identity

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Caller classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access to every namespace and to cluster-scoped resources
    Cluster,
    /// Access restricted to an allow-list of namespaces
    Namespace,
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Cluster => "cluster",
            Role::Namespace => "namespace",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Who is calling. Built once per request and shared read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    role: Role,
    /// Only meaningful for [`Role::Namespace`]
    allowed_namespaces: BTreeSet<String>,
}

impl Identity {
    pub fn cluster() -> Self {
        Self {
            role: Role::Cluster,
            allowed_namespaces: BTreeSet::new(),
        }
    }

    pub fn namespaced<I, S>(namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            role: Role::Namespace,
            allowed_namespaces: namespaces
                .into_iter()
                .map(Into::into)
                .filter(|ns: &String| !ns.is_empty())
                .collect(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_cluster(&self) -> bool {
        self.role == Role::Cluster
    }

    pub fn allows(&self, namespace: &str) -> bool {
        match self.role {
            Role::Cluster => true,
            Role::Namespace => self.allowed_namespaces.contains(namespace),
        }
    }

    /// Namespaces a handler should enumerate when the caller asked for "all".
    ///
    /// `None` means unrestricted (cluster role).
    pub fn visible_namespaces(&self) -> Option<Vec<&str>> {
        match self.role {
            Role::Cluster => None,
            Role::Namespace => Some(self.allowed_namespaces.iter().map(String::as_str).collect()),
        }
    }

    pub fn allowed_namespaces(&self) -> &BTreeSet<String> {
        &self.allowed_namespaces
    }
}
