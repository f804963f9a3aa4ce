use filestate::identity::FileIdentity;
use proptest::prelude::*;

fn arb_identity() -> impl Strategy<Value = FileIdentity> {
    // Small ranges so generated sets contain collisions.
    prop_oneof![
        (0u64..3, 0u64..3).prop_map(|(device, inode)| FileIdentity::Posix { device, inode }),
        (0u64..3, 0u32..2, 0u32..3).prop_map(|(volume, index_high, index_low)| {
            FileIdentity::Windows {
                volume,
                index_high,
                index_low,
            }
        }),
    ]
}

proptest! {
    #[test]
    fn test_is_same_reflexive(a in arb_identity()) {
        prop_assert!(a.is_same(&a));
    }

    #[test]
    fn test_is_same_symmetric(a in arb_identity(), b in arb_identity()) {
        prop_assert_eq!(a.is_same(&b), b.is_same(&a));
    }

    #[test]
    fn test_is_same_transitive(a in arb_identity(), b in arb_identity(), c in arb_identity()) {
        if a.is_same(&b) && b.is_same(&c) {
            prop_assert!(a.is_same(&c));
        }
    }

    #[test]
    fn test_is_same_matches_fieldwise_equality(a in arb_identity(), b in arb_identity()) {
        let fieldwise = match (a, b) {
            (
                FileIdentity::Posix { device: d1, inode: i1 },
                FileIdentity::Posix { device: d2, inode: i2 },
            ) => d1 == d2 && i1 == i2,
            (
                FileIdentity::Windows { volume: v1, index_high: h1, index_low: l1 },
                FileIdentity::Windows { volume: v2, index_high: h2, index_low: l2 },
            ) => v1 == v2 && h1 == h2 && l1 == l2,
            _ => false,
        };
        prop_assert_eq!(a.is_same(&b), fieldwise);
    }

    #[test]
    fn test_serialized_form_omits_zero_fields(a in arb_identity()) {
        let value = serde_json::to_value(a).unwrap();
        let object = value.as_object().unwrap();
        for (key, field) in object {
            prop_assert_ne!(field.as_u64(), Some(0), "zero field {} serialized", key);
        }
        let restored: FileIdentity = serde_json::from_value(value).unwrap();
        if !a.is_zero() {
            prop_assert_eq!(restored, a);
        } else {
            prop_assert!(restored.is_zero());
        }
    }

    #[test]
    fn test_reader_tolerates_partial_field_sets(
        device in proptest::option::of(1u64..1000),
        inode in proptest::option::of(1u64..1000),
    ) {
        let mut object = serde_json::Map::new();
        if let Some(device) = device {
            object.insert("device".into(), device.into());
        }
        if let Some(inode) = inode {
            object.insert("inode".into(), inode.into());
        }
        let decoded: FileIdentity = serde_json::from_value(object.into()).unwrap();
        if device.is_some() || inode.is_some() {
            prop_assert_eq!(
                decoded,
                FileIdentity::Posix { device: device.unwrap_or(0), inode: inode.unwrap_or(0) }
            );
        } else {
            prop_assert_eq!(decoded, FileIdentity::native_zero());
        }
    }
}
