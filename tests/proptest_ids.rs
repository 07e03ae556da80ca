//! Property-based tests for resource id helpers
//!
//! Covers the round trip between child ids and their leaf names and parents,
//! and resolution of well-formed ids naming children that do not exist.

use proptest::prelude::*;
use tarm::network::application_gateway::BackendProperties;
use tarm::resource::{
    build_child_id, leaf_name_from_id, parent_id_from_child_id, Child, DeferredCollection,
    ReferenceError, ResourceId,
};

/// A single id segment: non-empty, no separator
fn segment() -> impl Strategy<Value = String> {
    "[A-Za-z0-9][A-Za-z0-9._()-]{0,15}"
}

/// A well-formed id made of 1..=4 type/name pairs
fn parent_id() -> impl Strategy<Value = String> {
    prop::collection::vec((segment(), segment()), 1..=4).prop_map(|pairs| {
        pairs
            .iter()
            .map(|(t, n)| format!("/{}/{}", t, n))
            .collect::<String>()
    })
}

proptest! {
    #[test]
    fn leaf_name_round_trips(parent in parent_id(), child_type in segment(), name in segment()) {
        let id = build_child_id(&parent, &child_type, &name).unwrap();
        prop_assert_eq!(leaf_name_from_id(&id).unwrap(), name.as_str());
    }

    #[test]
    fn parent_extraction_inverts_build(parent in parent_id(), child_type in segment(), name in segment()) {
        let id = build_child_id(&parent, &child_type, &name).unwrap();
        prop_assert_eq!(parent_id_from_child_id(&id).unwrap(), parent.as_str());
    }

    #[test]
    fn trailing_separator_on_parent_is_ignored(parent in parent_id(), child_type in segment(), name in segment()) {
        let with_slash = format!("{}/", parent);
        prop_assert_eq!(
            build_child_id(&with_slash, &child_type, &name).unwrap(),
            build_child_id(&parent, &child_type, &name).unwrap()
        );
    }

    #[test]
    fn unknown_target_resolves_to_none(parent in parent_id(), child_type in segment(), name in segment()) {
        let mut pools = DeferredCollection::<BackendProperties>::new();
        pools.attach(Child::new(format!("{}-existing", name)));

        let id = build_child_id(&parent, &child_type, &name).unwrap();
        let resolved = pools.resolve_reference(&id);
        prop_assert!(matches!(resolved, Ok(None)));
    }

    #[test]
    fn structured_id_agrees_with_helpers(parent in parent_id(), child_type in segment(), name in segment()) {
        let id = build_child_id(&parent, &child_type, &name).unwrap();
        let parsed = ResourceId::parse(&id).unwrap();
        prop_assert_eq!(parsed.name(), name.as_str());
        prop_assert_eq!(parsed.resource_type(), child_type.as_str());
        prop_assert_eq!(parsed.to_string(), id);
    }

    #[test]
    fn structured_parent_matches_helper(group in segment(), gw in segment(), name in segment()) {
        let gateway = ResourceId::future("sub", &group, "Microsoft.Network", "applicationGateways", &gw).unwrap();
        let child = gateway.child("backendAddressPools", &name).unwrap();
        let child_id = child.to_string();
        prop_assert_eq!(child.parent(), Some(gateway.clone()));
        prop_assert_eq!(parent_id_from_child_id(&child_id).unwrap(), gateway.to_string());
        prop_assert!(gateway.parent().is_none());
    }

    #[test]
    fn components_with_separators_are_rejected(parent in parent_id(), a in segment(), b in segment()) {
        let bad = format!("{}/{}", a, b);
        prop_assert!(
            matches!(
                build_child_id(&parent, &bad, "x"),
                Err(ReferenceError::SlashInComponent { what: "child type", .. })
            ),
            "slash in type accepted"
        );
        prop_assert!(
            matches!(
                build_child_id(&parent, "x", &bad),
                Err(ReferenceError::SlashInComponent { what: "child name", .. })
            ),
            "slash in name accepted"
        );
    }
}

#[test]
fn test_short_ids_have_no_parent() {
    assert!(matches!(
        parent_id_from_child_id("/a/b"),
        Err(ReferenceError::TooFewSegments { count: 2, min: 4, .. })
    ));
    assert!(matches!(parent_id_from_child_id(""), Err(ReferenceError::Empty)));
    assert!(matches!(
        parent_id_from_child_id("/a//b/c/d"),
        Err(ReferenceError::EmptySegment { .. })
    ));
}

#[test]
fn test_malformed_reference_is_an_error_not_absent() {
    let pools = DeferredCollection::<BackendProperties>::new();
    assert!(pools.resolve_reference("///").is_err());
}
