//! Items used by code generated from `rg_codegen_derive`.

pub use crate::info::{CompositeInfo, MemberInfo, TypeFlags, TypeInfo, Typed};
pub use crate::reader::AutoPackType;

#[cfg(feature = "auto_register")]
pub mod auto_register {
    pub use inventory;

    use crate::info::{TypeInfo, Typed};

    /// A type submitted for synthesis by
    /// [`GenerationPass::synthesize_registered`](crate::pass::GenerationPass::synthesize_registered).
    pub struct AutoRegistration {
        pub type_info: fn() -> TypeInfo,
    }

    impl AutoRegistration {
        pub const fn of<T: Typed>() -> Self {
            Self {
                type_info: T::type_info,
            }
        }
    }

    inventory::collect!(AutoRegistration);
}
