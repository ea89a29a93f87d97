use alloc::string::String;
use alloc::vec::Vec;

use crate::Unsupported;
use crate::info::Type;

/// Types the synthesizer refuses to decompose.
///
/// A type is excluded when its path starts with one of `type_prefixes`, or
/// when its first path segment is listed in `crates`. Excluded types need a
/// registered decoder.
///
/// # Examples
///
/// ```
/// use rg_codegen::info::Type;
/// use rg_codegen::synth::ExclusionList;
///
/// let exclusions = ExclusionList::default().with_crate("rg_codegen");
/// assert!(exclusions.check(&Type::of::<String>()).is_some());
/// assert!(exclusions.check(&Type::of::<rg_codegen::reader::AutoPackType>()).is_some());
/// assert!(exclusions.check(&Type::of::<u8>()).is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default, deny_unknown_fields))]
pub struct ExclusionList {
    pub type_prefixes: Vec<String>,
    pub crates: Vec<String>,
}

impl Default for ExclusionList {
    fn default() -> Self {
        Self {
            type_prefixes: ["core::", "alloc::", "std::"].map(String::from).to_vec(),
            crates: Vec::new(),
        }
    }
}

impl ExclusionList {
    /// An empty list.
    pub fn none() -> Self {
        Self {
            type_prefixes: Vec::new(),
            crates: Vec::new(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.type_prefixes.push(prefix.into());
        self
    }

    pub fn with_crate(mut self, name: impl Into<String>) -> Self {
        self.crates.push(name.into());
        self
    }

    /// Why `ty` is excluded, if it is.
    pub fn check(&self, ty: &Type) -> Option<Unsupported> {
        let path = ty.path();
        if let Some(prefix) = self.type_prefixes.iter().find(|p| path.starts_with(p.as_str())) {
            return Some(Unsupported::ExcludedPrefix(prefix.clone()));
        }
        let name = ty.crate_name()?;
        self.crates
            .iter()
            .any(|excluded| excluded == name)
            .then(|| Unsupported::ExcludedCrate(name.into()))
    }
}
