use keel_mask::FieldMask;
use proptest::prelude::*;

fn mask_strategy() -> impl Strategy<Value = FieldMask> {
    prop_oneof![
        1 => Just(FieldMask::all()),
        6 => prop::collection::vec("[a-e]", 0..5).prop_map(FieldMask::from),
    ]
}

proptest! {
    #[test]
    fn join_is_commutative(a in mask_strategy(), b in mask_strategy()) {
        prop_assert_eq!(a.join(&b), b.join(&a));
    }

    #[test]
    fn join_is_associative(a in mask_strategy(), b in mask_strategy(), c in mask_strategy()) {
        prop_assert_eq!(a.join(&b).join(&c), a.join(&b.join(&c)));
    }

    #[test]
    fn intersect_is_commutative_and_associative(
        a in mask_strategy(),
        b in mask_strategy(),
        c in mask_strategy(),
    ) {
        prop_assert_eq!(a.intersect(&b), b.intersect(&a));
        prop_assert_eq!(a.intersect(&b).intersect(&c), a.intersect(&b.intersect(&c)));
    }

    #[test]
    fn intersection_never_widens(a in mask_strategy(), b in mask_strategy(), name in "[a-f]") {
        let narrowed = a.intersect(&b);
        if narrowed.includes(&name) {
            prop_assert!(a.includes(&name) && b.includes(&name));
        }
    }

    #[test]
    fn join_includes_either_side(a in mask_strategy(), b in mask_strategy(), name in "[a-f]") {
        prop_assert_eq!(a.join(&b).includes(&name), a.includes(&name) || b.includes(&name));
    }

    #[test]
    fn empty_is_identity_for_join(a in mask_strategy()) {
        prop_assert_eq!(a.join(&FieldMask::empty()), a.clone());
        prop_assert!(a.intersect(&FieldMask::empty()).is_empty());
    }
}
