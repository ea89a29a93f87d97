use crate::info::TypeInfo;

// -----------------------------------------------------------------------------
// Typed

/// A static accessor to the decode-relevant shape of a type.
///
/// Implemented for primitives, `String`, `Duration`, `Vec<T>`, `Option<T>`
/// and `Box<T>` by this crate, and for user types by
/// [`#[derive(Typed)]`](crate::derive::Typed).
///
/// # Examples
///
/// ```
/// use rg_codegen::derive::Typed;
/// use rg_codegen::info::{Typed, TypeKind};
///
/// #[derive(Typed, Default)]
/// struct Position {
///     x: f32,
///     y: f32,
/// }
///
/// let info = Position::type_info();
/// let TypeKind::Composite(composite) = info.kind() else { unreachable!() };
/// assert_eq!(composite.members().len(), 2);
/// assert!(info.decoded().is::<Position>());
/// ```
///
/// # Manually Impl
///
/// ```
/// use rg_codegen::info::{CompositeInfo, MemberInfo, TypeInfo, Typed};
///
/// #[derive(Default)]
/// struct Health(u16);
///
/// impl Typed for Health {
///     fn type_info() -> TypeInfo {
///         TypeInfo::composite::<Self>(CompositeInfo::value::<Self>([
///             MemberInfo::field::<Self, u16>("0", |this, value| this.0 = value),
///         ]))
///     }
/// }
///
/// assert_eq!(Health::type_info().key().as_str(), Health::type_info().path());
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `Typed`",
    note = "consider annotating `{Self}` with `#[derive(Typed)]`"
)]
pub trait Typed: 'static {
    /// Returns the type information of `Self`.
    fn type_info() -> TypeInfo;
}
