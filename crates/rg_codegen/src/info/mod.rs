//! Type information consumed by the decoder synthesizer.
//!
//! [`TypeInfo`] describes what the synthesizer needs to know about a type:
//! its identity and [`TypeKey`], what its decoder produces, and whether it
//! is a [`CompositeInfo`] that can be decoded member by member.

// -----------------------------------------------------------------------------
// Modules

mod composite_info;
mod return_type;
mod type_info;
mod type_key;
mod type_path;
mod typed;
mod wrapper_info;

// -----------------------------------------------------------------------------
// Exports

pub use composite_info::{CompositeInfo, MemberInfo, MemberKind, NullCheck, Shape};
pub use return_type::{AdapterFn, ReturnType};
pub use type_info::{TypeFlags, TypeInfo, TypeKind};
pub use type_key::TypeKey;
pub use type_path::Type;
pub use typed::Typed;
pub use wrapper_info::{ArrayInfo, BoxedInfo, ElementInfo, ListInfo, MapInfo, OptionalInfo};

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{CompositeInfo, MemberInfo, MemberKind, Shape, TypeInfo, TypeKind, Typed};

    #[derive(Default, Debug, PartialEq)]
    struct Pair {
        a: i32,
        b: bool,
    }

    impl Typed for Pair {
        fn type_info() -> TypeInfo {
            TypeInfo::composite::<Self>(CompositeInfo::reference::<Self>([
                MemberInfo::field::<Self, i32>("a", |this, value| this.a = value),
                MemberInfo::property::<Self, bool>("b", |this, value| this.b = value),
            ]))
        }
    }

    #[test]
    fn reference_composites_decode_to_option() {
        let info = Pair::type_info();
        assert!(info.decoded().is::<Option<Pair>>());
        assert!(info.is_nullable());
        assert_eq!(info.key().as_str(), info.path());

        let composite = info.as_composite().unwrap();
        assert_eq!(composite.shape(), Shape::Reference);
        assert_eq!(composite.member("b").unwrap().kind(), MemberKind::Property);
    }

    #[test]
    fn members_populate_an_allocated_value() {
        let info = Pair::type_info();
        let composite = info.as_composite().unwrap();

        let mut value = composite.allocate();
        composite.members()[0].set(value.as_mut(), Box::new(7_i32)).unwrap();
        composite.members()[1].set(value.as_mut(), Box::new(true)).unwrap();

        let value = composite.finish(value).unwrap();
        assert_eq!(value.downcast_ref::<Option<Pair>>(), Some(&Some(Pair { a: 7, b: true })));

        let null = composite.null();
        assert_eq!(null.downcast_ref::<Option<Pair>>(), Some(&None));
    }

    #[test]
    fn member_type_mismatch_is_reported() {
        let info = Pair::type_info();
        let composite = info.as_composite().unwrap();
        let mut value = composite.allocate();

        let err = composite.members()[0].set(value.as_mut(), Box::new(1_u8));
        assert!(err.is_err());
    }

    #[test]
    fn option_of_reference_composite_is_the_composite() {
        let info = <Option<Pair>>::type_info();
        assert!(matches!(info.kind(), TypeKind::Composite(_)));
        assert!(info.ty().is::<Pair>());

        let info = <Option<i32>>::type_info();
        assert!(matches!(info.kind(), TypeKind::Optional(_)));
        assert_eq!(info.key().as_str(), "core::option::Option`1");
        assert_eq!(info.generics().len(), 1);
    }

    #[test]
    fn wrappers_see_through_nullable_elements() {
        let info = <Vec<Pair>>::type_info();
        let TypeKind::List(list) = info.kind() else {
            panic!("expected a list, got {}", info.kind().name());
        };
        assert!(list.item().is_nullable());
        assert!(list.item().decoded().is::<Option<Pair>>());
        assert!(info.decoded().is::<Vec<Pair>>());

        let info = <Box<Pair>>::type_info();
        assert!(info.is_nullable());
        assert!(info.decoded().is::<Option<Box<Pair>>>());
        assert!(<Option<Box<Pair>>>::type_info().ty().is::<Box<Pair>>());

        let info = <Box<i32>>::type_info();
        assert!(!info.is_nullable());
        assert!(info.decoded().is::<Box<i32>>());

        let info = <[i32; 4]>::type_info();
        assert_eq!(info.key().as_str(), "[T; N]");
        let TypeKind::Array(array) = info.kind() else {
            panic!("expected an array, got {}", info.kind().name());
        };
        assert_eq!(array.len(), 4);
        assert!(!array.item().is_nullable());
    }
}
