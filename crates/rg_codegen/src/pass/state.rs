use core::fmt;

/// The lifecycle of a [`GenerationPass`](crate::pass::GenerationPass).
///
/// `Uninitialized -> CatalogLoaded -> Registering <-> Synthesizing ->
/// DispatchMaterialized -> Sealed`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PassState {
    #[default]
    Uninitialized,
    CatalogLoaded,
    Registering,
    Synthesizing,
    DispatchMaterialized,
    Sealed,
}

impl PassState {
    /// Whether decoders may still be registered or synthesized.
    #[inline]
    pub const fn is_building(self) -> bool {
        matches!(self, Self::CatalogLoaded | Self::Registering | Self::Synthesizing)
    }
}

impl fmt::Display for PassState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Uninitialized => "uninitialized",
            Self::CatalogLoaded => "catalog loaded",
            Self::Registering => "registering",
            Self::Synthesizing => "synthesizing",
            Self::DispatchMaterialized => "dispatch materialized",
            Self::Sealed => "sealed",
        })
    }
}
