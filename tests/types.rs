// ABOUTME: Integration tests for cluster handles and phantom-typed identifiers.
// ABOUTME: Tests parsing, validation, and type safety properties.

use settle::types::*;
use std::collections::HashSet;

mod cluster_handle_tests {
    use super::*;

    #[test]
    fn parse_and_new_agree() {
        let built = ClusterHandle::new("sub-1", "rg-1", "aks-1");
        let parsed = ClusterHandle::parse(built.id()).unwrap();

        assert_eq!(parsed, built);
        assert_eq!(parsed.subscription(), "sub-1");
        assert_eq!(parsed.to_string(), built.id());
    }

    #[test]
    fn storage_account_is_not_a_cluster() {
        let id = "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Storage/storageAccounts/logs";
        assert!(matches!(
            ClusterHandle::parse(id),
            Err(ClusterIdError::NotManagedCluster(_))
        ));
    }

    #[test]
    fn whitespace_only_is_empty() {
        assert_eq!(ClusterHandle::parse("   "), Err(ClusterIdError::Empty));
    }
}

mod id_tests {
    use super::*;

    #[test]
    fn operation_id_displays_its_value() {
        let id = OperationId::new("https://management.azure.com/operations/op-1");
        assert_eq!(id.to_string(), "https://management.azure.com/operations/op-1");
        assert_eq!(id.clone().into_inner(), id.as_str());
    }

    #[test]
    fn correlation_ids_are_distinct_hash_keys() {
        let ids: HashSet<CorrelationId> = (0..16).map(|_| CorrelationId::generate()).collect();
        assert_eq!(ids.len(), 16);
    }
}
