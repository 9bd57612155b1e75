use msgpatch::{
    EditError, Editor, FastMap, MsgValue, SmolStr, encode, fields, locate, replace, size_at,
};
use proptest::prelude::*;

// ── Proptest strategies ─────────────────────────────────────

fn arb_leaf() -> impl Strategy<Value = MsgValue> {
    prop_oneof![
        Just(MsgValue::Nil),
        any::<bool>().prop_map(MsgValue::from),
        any::<i64>().prop_map(MsgValue::from),
        any::<u64>().prop_map(MsgValue::from),
        any::<f64>().prop_map(MsgValue::from),
        any::<f32>().prop_map(MsgValue::from),
        "[a-zA-Z0-9 ]{0,40}".prop_map(MsgValue::from),
        prop::collection::vec(any::<u8>(), 0..300).prop_map(MsgValue::Bin),
        (any::<i8>(), prop::collection::vec(any::<u8>(), 0..20))
            .prop_map(|(t, data)| MsgValue::Ext(t, data)),
    ]
}

fn arb_value() -> impl Strategy<Value = MsgValue> {
    arb_leaf().prop_recursive(4, 64, 20, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..20).prop_map(MsgValue::Array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..20).prop_map(|m| {
                MsgValue::Map(m.into_iter().map(|(k, v)| (SmolStr::from(k), v)).collect())
            }),
        ]
    })
}

/// An encoded top-level map plus one of its keys.
fn arb_doc() -> impl Strategy<Value = (Vec<u8>, String)> {
    prop::collection::btree_map("[a-z_]{1,12}", arb_value(), 1..24).prop_flat_map(|fields| {
        let keys: Vec<String> = fields.keys().cloned().collect();
        let map: FastMap<SmolStr, MsgValue> = fields
            .into_iter()
            .map(|(k, v)| (SmolStr::from(k), v))
            .collect();
        let buf = encode(&MsgValue::Map(map));
        (Just(buf), prop::sample::select(keys))
    })
}

proptest! {
    #[test]
    fn size_at_matches_encoded_length(value in arb_value()) {
        let buf = encode(&value);
        prop_assert_eq!(size_at(&buf, 0), Ok(buf.len()));
    }

    #[test]
    fn truncated_input_never_panics((buf, key) in arb_doc(), cut in any::<prop::sample::Index>()) {
        let full = locate(&key, &buf).to_vec();
        let prefix = &buf[..cut.index(buf.len())];

        match Editor::default().scan(&key, prefix) {
            Ok(Some(value)) => prop_assert_eq!(value, full.as_slice()),
            Ok(None) => prop_assert!(false, "key vanished from a prefix"),
            Err(err) => prop_assert!(
                matches!(err, EditError::ShortBuffer { .. }),
                "unexpected error {:?}",
                err
            ),
        }
        let _ = locate(&key, prefix);
        prop_assert!(size_at(prefix, 0).is_err());
    }

    #[test]
    fn replace_then_locate((buf, key) in arb_doc(), new in arb_value()) {
        let new_value = encode(&new);
        let out = replace(&key, &buf, &new_value).unwrap();
        prop_assert_eq!(locate(&key, &out), new_value.as_slice());
        prop_assert_eq!(size_at(&out, 0), Ok(out.len()));

        for field in fields(&buf).unwrap() {
            let field = field.unwrap();
            if field.key != key {
                prop_assert_eq!(locate(field.key, &out), field.value);
            }
        }
    }

    #[test]
    fn absent_key_is_empty_and_unreplaceable((buf, _key) in arb_doc()) {
        // generated keys never contain digits
        prop_assert!(locate("k0", &buf).is_empty());
        prop_assert_eq!(replace("k0", &buf, &[0xc0]), Err(EditError::FieldNotFound));
    }

    #[test]
    fn replace_accounts_for_size((buf, key) in arb_doc(), new in arb_value()) {
        let old_len = locate(&key, &buf).len();
        let new_value = encode(&new);
        let out = replace(&key, &buf, &new_value).unwrap();
        prop_assert_eq!(out.len(), buf.len() - old_len + new_value.len());
    }

    #[test]
    fn replace_with_same_value_is_identity((buf, key) in arb_doc()) {
        let same = locate(&key, &buf).to_vec();
        prop_assert_eq!(replace(&key, &buf, &same).unwrap(), buf);
    }

    #[test]
    fn garbage_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..64), key in "[a-z]{1,3}") {
        let _ = locate(&key, &bytes);
        let _ = size_at(&bytes, 0);
        let _ = replace(&key, &bytes, &[0xc0]);
        let _ = msgpatch::decode(&bytes);
    }
}
