//! Namespace authorization.
//!
//! Handlers call [`check_namespace`] before touching state. The invoker does
//! not call it: it only knows safety levels, not which namespace a tool's
//! arguments point at.
//!
//! | Target | `namespace` | Cluster | Namespace role |
//! |--------|-------------|---------|----------------|
//! | cluster-scoped | any | allow | deny |
//! | namespaced | empty ("all") | allow | allow if allow-list non-empty |
//! | namespaced | specific | allow | allow if listed |

use super::identity::{Identity, Role};
use crate::tool::ToolError;
use tracing::debug;

pub fn check_namespace(
    identity: &Identity,
    namespace: &str,
    namespaced_resource: bool,
) -> Result<(), ToolError> {
    if identity.role() == Role::Cluster {
        return Ok(());
    }

    if !namespaced_resource {
        debug!(namespace, "denied cluster-scoped access to namespace identity");
        return Err(ToolError::forbidden(
            "cluster-scoped resources",
            "namespace-restricted identity cannot access cluster-scoped resources",
        ));
    }

    if namespace.is_empty() {
        if identity.allowed_namespaces().is_empty() {
            return Err(ToolError::forbidden(
                "all namespaces",
                "identity has no allowed namespaces",
            ));
        }
        return Ok(());
    }

    if identity.allows(namespace) {
        Ok(())
    } else {
        debug!(namespace, "denied namespace access");
        Err(ToolError::forbidden(
            format!("namespace '{}'", namespace),
            "not in allowed namespaces",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_role_always_allowed() {
        let identity = Identity::cluster();
        for (namespace, namespaced) in [("", true), ("a", true), ("", false), ("b", false)] {
            assert!(check_namespace(&identity, namespace, namespaced).is_ok());
        }
    }

    #[test]
    fn test_namespace_role_specific_namespace() {
        let identity = Identity::namespaced(["a"]);
        assert!(check_namespace(&identity, "a", true).is_ok());

        let err = check_namespace(&identity, "b", true).unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN");
        assert!(err.to_string().contains("'b'"));
    }

    #[test]
    fn test_namespace_role_cluster_scoped_always_denied() {
        let identity = Identity::namespaced(["a"]);
        assert!(check_namespace(&identity, "", false).is_err());
        assert!(check_namespace(&identity, "a", false).is_err());
    }

    #[test]
    fn test_namespace_role_all_namespaces() {
        assert!(check_namespace(&Identity::namespaced(["a"]), "", true).is_ok());
        let empty = Identity::namespaced(Vec::<String>::new());
        assert!(check_namespace(&empty, "", true).is_err());
    }
}
