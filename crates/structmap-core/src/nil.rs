//! Absence checks
//!
//! Two predicates, because the entry point and the recursion ask different
//! questions. The entry point classifies arguments of unknown shape, where
//! the argument itself may be missing. The recursion already knows it holds
//! a pointer slot and only asks whether that pointer is set.

use crate::reflect::{Data, Value};

/// Whether an argument of unknown shape is absent
///
/// True for a missing argument, and for a pointer, map, sequence or channel
/// with no target. Scalars and structs are never absent.
pub fn is_any_nil(value: Option<&Value>) -> bool {
    match value {
        None => true,
        Some(value) => matches!(
            value.data(),
            Data::Pointer(None) | Data::Map(None) | Data::Sequence(None) | Data::Channel(None)
        ),
    }
}

/// Whether a value is a pointer with no target
pub fn is_nil_pointer(value: &Value) -> bool {
    matches!(value.data(), Data::Pointer(None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::{FieldDef, TypeId, Types};

    #[test]
    fn test_missing_argument_is_nil() {
        assert!(is_any_nil(None));
    }

    #[test]
    fn test_scalars_and_structs_are_present() {
        let mut types = Types::new();
        let empty = types.structure("Empty", Vec::<FieldDef>::new()).unwrap();
        assert!(!is_any_nil(Some(&Value::int(0))));
        assert!(!is_any_nil(Some(&Value::string(""))));
        assert!(!is_any_nil(Some(&types.zero(empty).unwrap())));
    }

    #[test]
    fn test_nil_references() {
        let mut types = Types::new();
        let ptr = types.pointer(TypeId::INT);
        let seq = types.sequence(TypeId::INT);
        let map = types.map(TypeId::STRING, TypeId::INT).unwrap();
        let chan = types.channel(TypeId::INT);

        for ty in [ptr, seq, map, chan] {
            assert!(is_any_nil(Some(&types.zero(ty).unwrap())));
        }

        let set = types.new_pointer(ptr, Value::int(1)).unwrap();
        assert!(!is_any_nil(Some(&set)));
        let open = types.new_channel(chan, Vec::new()).unwrap();
        assert!(!is_any_nil(Some(&open)));
    }

    #[test]
    fn test_nil_pointer_only_matches_pointers() {
        let mut types = Types::new();
        let ptr = types.pointer(TypeId::INT);
        let seq = types.sequence(TypeId::INT);

        assert!(is_nil_pointer(&types.zero(ptr).unwrap()));
        assert!(!is_nil_pointer(&types.zero(seq).unwrap()));
        assert!(!is_nil_pointer(&types.new_pointer(ptr, Value::int(3)).unwrap()));
    }
}
