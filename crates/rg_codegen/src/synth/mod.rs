//! Decoder synthesis for composite types.
//!
//! Resolution is driven by
//! [`GenerationPass::get_or_synthesize`](crate::pass::GenerationPass::get_or_synthesize).
//! Composites are decoded member by member in declaration order; nullable
//! shapes read a discriminator first. Recursive types are supported as long
//! as every cycle passes through a nullable type.

// -----------------------------------------------------------------------------
// Modules

mod composite;
mod exclusion;
mod routine;

pub(crate) mod resolve;

// -----------------------------------------------------------------------------
// Exports

pub use exclusion::ExclusionList;
pub use routine::{RoutineStep, SynthesizedRoutine};

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::String;
    use alloc::vec::Vec;
    use core::any::type_name;
    use std::collections::HashMap;

    use crate::derive::Typed;
    use crate::info::{NullCheck, Typed as _, TypeFlags};
    use crate::pass::{GenerationPass, PassConfig};
    use crate::reader::{AutoPackType, Reader};
    use crate::registry::Decoder;
    use crate::{CodegenError, DecodeError, Origin, Unsupported};

    fn pass() -> GenerationPass {
        let mut pass = GenerationPass::new(PassConfig::default());
        pass.load_catalog().unwrap();
        pass
    }

    #[derive(Typed, Default, Debug, PartialEq)]
    struct Pair {
        a: i32,
        b: bool,
    }

    #[derive(Typed, Default, Debug, PartialEq)]
    #[codegen(reference)]
    struct Player {
        id: u32,
        name: String,
    }

    #[derive(Typed, Default, Debug, PartialEq)]
    #[codegen(collection)]
    struct Inventory {
        slots: Vec<u16>,
    }

    #[derive(Typed, Default, Debug, PartialEq)]
    struct Missing {
        ok: u8,
        bad: usize,
    }

    #[derive(Typed, Default, Debug, PartialEq)]
    struct HoldsMissing {
        inner: Missing,
    }

    #[derive(Typed, Default, Debug, PartialEq)]
    #[codegen(reference)]
    struct Node {
        value: i64,
        next: Option<Box<Node>>,
    }

    #[derive(Typed, Default, Debug, PartialEq)]
    struct Tree {
        children: Vec<Tree>,
    }

    #[derive(Typed, Debug)]
    struct Chain {
        next: Box<Chain>,
    }

    impl Default for Chain {
        fn default() -> Self {
            unreachable!("never synthesized successfully")
        }
    }

    #[derive(Typed, Default, Debug, PartialEq)]
    struct Wrapper<T> {
        value: T,
    }

    #[derive(Typed, Default, Debug, PartialEq)]
    #[codegen(non_serializable)]
    struct Secret {
        key: u64,
    }

    #[test]
    fn value_composite() {
        let mut pass = pass();
        let decoder = pass.get_or_synthesize(&Pair::type_info(), true).unwrap();
        assert!(decoder.is_synthesized());

        let mut reader = Reader::new(&[0x54, 0x01]);
        let value = decoder.read(&mut reader, AutoPackType::Packed).unwrap();
        assert_eq!(value.downcast_ref::<Pair>(), Some(&Pair { a: 42, b: true }));

        let routine = &pass.module().unwrap().routines()[0];
        assert_eq!(routine.null_check(), NullCheck::None);
        assert_eq!(routine.steps()[0].pack, Some(AutoPackType::Packed));
        assert_eq!(routine.steps()[1].pack, None);
    }

    #[test]
    fn reference_null_short_circuits() {
        let mut pass = pass();
        let decoder = pass.get_or_synthesize(&Player::type_info(), true).unwrap();

        let mut reader = Reader::new(&[0x01, 0xFF]);
        let value = decoder.read(&mut reader, AutoPackType::Packed).unwrap();
        assert_eq!(value.downcast_ref::<Option<Player>>(), Some(&None));
        assert_eq!(reader.position(), 1);

        let mut reader = Reader::new(&[0x00, 0x05, 0x02, b'h', b'i']);
        let value = decoder.read(&mut reader, AutoPackType::Packed).unwrap();
        let expected = Player {
            id: 5,
            name: "hi".into(),
        };
        assert_eq!(value.downcast_ref::<Option<Player>>(), Some(&Some(expected)));
    }

    #[test]
    fn collection_null_short_circuits() {
        let mut pass = pass();
        let decoder = pass.get_or_synthesize(&Inventory::type_info(), true).unwrap();

        let mut reader = Reader::new(&[0xFF, 0xFF, 0xFF, 0xFF, 0x0F, 0x09]);
        let value = decoder.read(&mut reader, AutoPackType::Packed).unwrap();
        assert_eq!(value.downcast_ref::<Option<Inventory>>(), Some(&None));
        assert_eq!(reader.remaining(), 1);

        let mut reader = Reader::new(&[0x00, 0x02, 0x03, 0x04]);
        let value = decoder.read(&mut reader, AutoPackType::Packed).unwrap();
        let expected = Inventory { slots: vec![3, 4] };
        assert_eq!(value.downcast_ref::<Option<Inventory>>(), Some(&Some(expected)));
    }

    #[test]
    fn missing_member_leaves_nothing_registered() {
        let mut pass = pass();
        let err = pass.get_or_synthesize(&Missing::type_info(), true).unwrap_err();
        assert_eq!(
            err,
            CodegenError::MissingDecoder {
                type_path: "usize".into(),
                origin: Origin::Member {
                    owner: type_name::<Missing>().into(),
                    member: "bad",
                },
            }
        );
        assert!(pass.lookup(Missing::type_info().key(), true).is_none());
        assert_eq!(pass.faults().len(), 1);

        pass.get_or_synthesize(&HoldsMissing::type_info(), true).unwrap_err();
        assert!(pass.lookup(HoldsMissing::type_info().key(), true).is_none());
        assert!(pass.lookup(Missing::type_info().key(), true).is_none());
        assert!(pass.module().is_none_or(|module| module.routines().is_empty()));
    }

    #[test]
    fn nullable_self_reference() {
        let mut pass = pass();
        let decoder = pass.get_or_synthesize(&Node::type_info(), true).unwrap();
        assert!(!decoder.is_placeholder());

        // Some(Node { value: 1, next: Some(Node { value: -1, next: None }) })
        let bytes = [0x00, 0x02, 0x00, 0x01, 0x01];
        let value = decoder.read(&mut Reader::new(&bytes), AutoPackType::Packed).unwrap();
        let expected = Node {
            value: 1,
            next: Some(Box::new(Node { value: -1, next: None })),
        };
        assert_eq!(value.downcast_ref::<Option<Node>>(), Some(&Some(expected)));
    }

    #[test]
    fn reference_composites_inside_wrappers() {
        let mut pass = pass();

        let decoder = pass.get_or_synthesize(&Vec::<Player>::type_info(), true).unwrap();
        let bytes = [0x02, 0x00, 0x01, 0x01, b'a', 0x00, 0x02, 0x01, b'b'];
        let value = decoder.read(&mut Reader::new(&bytes), AutoPackType::Packed).unwrap();
        let expected = vec![
            Player { id: 1, name: "a".into() },
            Player { id: 2, name: "b".into() },
        ];
        assert_eq!(value.downcast_ref::<Vec<Player>>(), Some(&expected));

        // a null item where a value is required
        let err = decoder.read(&mut Reader::new(&[0x01, 0x01]), AutoPackType::Packed).unwrap_err();
        assert_eq!(
            err,
            DecodeError::UnexpectedNull {
                type_path: type_name::<Player>()
            }
        );

        let decoder = pass.get_or_synthesize(&Vec::<Option<Player>>::type_info(), true).unwrap();
        let bytes = [0x02, 0x01, 0x00, 0x03, 0x01, b'c'];
        let value = decoder.read(&mut Reader::new(&bytes), AutoPackType::Packed).unwrap();
        let expected = vec![None, Some(Player { id: 3, name: "c".into() })];
        assert_eq!(value.downcast_ref::<Vec<Option<Player>>>(), Some(&expected));

        let decoder = pass.get_or_synthesize(&Box::<Player>::type_info(), true).unwrap();
        let bytes = [0x00, 0x04, 0x01, b'd'];
        let value = decoder.read(&mut Reader::new(&bytes), AutoPackType::Packed).unwrap();
        let expected = Some(Box::new(Player { id: 4, name: "d".into() }));
        assert_eq!(value.downcast_ref::<Option<Box<Player>>>(), Some(&expected));
        assert_eq!(Option::<Box<Player>>::type_info().id(), Box::<Player>::type_info().id());
    }

    #[test]
    fn maps() {
        let mut pass = pass();
        let decoder = pass.get_or_synthesize(&HashMap::<u8, String>::type_info(), true).unwrap();
        assert_eq!(decoder.name(), format!("read_map::<u8, {}>", type_name::<String>()));

        let bytes = [0x02, 0x01, 0x01, b'a', 0x02, 0x01, b'b'];
        let value = decoder.read(&mut Reader::new(&bytes), AutoPackType::Packed).unwrap();
        let expected = HashMap::from([(1_u8, String::from("a")), (2, String::from("b"))]);
        assert_eq!(value.downcast_ref::<HashMap<u8, String>>(), Some(&expected));

        let mut reader = Reader::new(&[0xFF, 0xFF, 0xFF, 0xFF, 0x0F]);
        let value = decoder.read(&mut reader, AutoPackType::Packed).unwrap();
        assert!(value.downcast_ref::<HashMap<u8, String>>().unwrap().is_empty());
        assert!(reader.is_empty());

        let decoder = pass.get_or_synthesize(&HashMap::<u8, Player>::type_info(), true).unwrap();
        let err = decoder.read(&mut Reader::new(&[0x01, 0x07, 0x01]), AutoPackType::Packed).unwrap_err();
        assert_eq!(
            err,
            DecodeError::UnexpectedNull {
                type_path: type_name::<Player>()
            }
        );

        let err = pass.get_or_synthesize(&HashMap::<usize, u8>::type_info(), true).unwrap_err();
        assert!(matches!(
            err,
            CodegenError::MissingDecoder { origin: Origin::GenericArgument { .. }, .. }
        ));
    }

    #[test]
    fn fixed_arrays() {
        let mut pass = pass();
        let decoder = pass.get_or_synthesize(&<[u16; 3]>::type_info(), true).unwrap();

        let value = decoder.read(&mut Reader::new(&[0x03, 0x01, 0x02, 0x03]), AutoPackType::Packed).unwrap();
        assert_eq!(value.downcast_ref::<[u16; 3]>(), Some(&[1, 2, 3]));

        let err = decoder.read(&mut Reader::new(&[0x02, 0x01, 0x02]), AutoPackType::Packed).unwrap_err();
        assert_eq!(
            err,
            DecodeError::LengthMismatch {
                type_path: type_name::<[u16; 3]>(),
                expected: 3,
                found: 2,
            }
        );

        // every length shares the one generic definition
        let pairs = pass.get_or_synthesize(&<[Pair; 2]>::type_info(), true).unwrap();
        assert_ne!(pairs.returns(), decoder.returns());
        let value = pairs.read(&mut Reader::new(&[0x02, 0x02, 0x00, 0x04, 0x01]), AutoPackType::Packed).unwrap();
        let expected = [Pair { a: 1, b: false }, Pair { a: 2, b: true }];
        assert_eq!(value.downcast_ref::<[Pair; 2]>(), Some(&expected));
    }

    #[test]
    fn self_reference_through_list() {
        let mut pass = pass();
        let decoder = pass.get_or_synthesize(&Tree::type_info(), true).unwrap();

        let bytes = [0x02, 0x00, 0x01, 0x00];
        let value = decoder.read(&mut Reader::new(&bytes), AutoPackType::Packed).unwrap();
        let expected = Tree {
            children: vec![Tree::default(), Tree { children: vec![Tree::default()] }],
        };
        assert_eq!(value.downcast_ref::<Tree>(), Some(&expected));
    }

    #[test]
    fn cycle_without_nullable_break() {
        let mut pass = pass();
        let err = pass.get_or_synthesize(&Chain::type_info(), true).unwrap_err();
        let CodegenError::CyclicType { cycle, .. } = err else {
            panic!("expected a cycle, got {err:?}");
        };
        assert_eq!(cycle.len(), 3);
        assert!(pass.lookup(Chain::type_info().key(), true).is_none());
    }

    #[test]
    fn generic_composites_are_per_instantiation() {
        let mut pass = pass();
        let a = pass.get_or_synthesize(&Wrapper::<u8>::type_info(), true).unwrap();
        let b = pass.get_or_synthesize(&Wrapper::<String>::type_info(), true).unwrap();
        assert_ne!(a.returns(), b.returns());

        let value = b.read(&mut Reader::new(&[0x01, b'x']), AutoPackType::Packed).unwrap();
        assert_eq!(value.downcast_ref::<Wrapper<String>>().unwrap().value, "x");

        let err = pass.get_or_synthesize(&Wrapper::<usize>::type_info(), true).unwrap_err();
        assert!(matches!(
            err,
            CodegenError::MissingDecoder { origin: Origin::GenericArgument { .. }, .. }
        ));
    }

    #[test]
    fn registered_instances_still_need_argument_decoders() {
        let mut pass = pass();
        let custom = Decoder::from_fn("read_wrapper_usize", |_| Ok(Wrapper::<usize> { value: 0 }));
        pass.register(custom, true, true).unwrap();

        let err = pass.get_or_synthesize(&Wrapper::<usize>::type_info(), true).unwrap_err();
        assert_eq!(
            err,
            CodegenError::MissingDecoder {
                type_path: "usize".into(),
                origin: Origin::GenericArgument {
                    owner: type_name::<Wrapper<usize>>().into(),
                },
            }
        );

        let mut pass = self::pass();
        let custom = Decoder::from_fn("read_wrapper_u8", |_| Ok(Wrapper::<u8> { value: 9 }));
        pass.register(custom, true, true).unwrap();
        let decoder = pass.get_or_synthesize(&Wrapper::<u8>::type_info(), true).unwrap();
        assert_eq!(decoder.name(), "read_wrapper_u8");
    }

    #[test]
    fn refused_types() {
        let mut pass = pass();
        let err = pass.get_or_synthesize(&Secret::type_info(), true).unwrap_err();
        assert!(matches!(
            err,
            CodegenError::UnsupportedType { reason: Unsupported::NonSerializable, .. }
        ));

        let info = Pair::type_info().with_flags(TypeFlags::NON_SERIALIZABLE);
        assert!(pass.get_or_synthesize(&info, true).is_err());

        let excluded = Pair::type_info().with_path("std::net::Pair");
        let err = pass.get_or_synthesize(&excluded, true).unwrap_err();
        assert!(matches!(
            err,
            CodegenError::UnsupportedType { reason: Unsupported::ExcludedPrefix(_), .. }
        ));
    }

    #[test]
    fn registered_decoders_win() {
        let mut pass = pass();
        let custom = Decoder::from_fn("read_pair_fixed", |_| Ok(Pair { a: 1, b: false }));
        pass.register(custom, false, true).unwrap();

        let decoder = pass.get_or_synthesize(&Pair::type_info(), true).unwrap();
        assert_eq!(decoder.name(), "read_pair_fixed");
        assert!(pass.module().is_none());
    }
}
