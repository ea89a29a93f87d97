use alloc::collections::BTreeMap;
use alloc::string::String;

use crate::catalog::AutoPackPolicy;
use crate::info::TypeKey;
use crate::reader::AutoPackType;
use crate::synth::ExclusionList;

/// Settings of a [`GenerationPass`](crate::pass::GenerationPass).
///
/// With the `serde` feature the config deserializes from any self-describing
/// format; missing fields keep their defaults.
///
/// ```ron
/// (
///     module_name: "net_readers",
///     base_module: false,
///     exclusions: (crates: ["glam"]),
///     pack_overrides: { "game::Tick": unpacked },
/// )
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default, deny_unknown_fields))]
pub struct PassConfig {
    /// Name of the generated module.
    pub module_name: String,
    /// Whether this pass owns the built-in catalog decoders, and therefore
    /// materializes dispatch for the instanced tier as well.
    pub base_module: bool,
    /// Tier searched first by [`include`](crate::pass::GenerationPass::include).
    pub favor_instanced: bool,
    pub exclusions: ExclusionList,
    /// Pack mode of auto-packed types without an override.
    pub default_pack: AutoPackType,
    pub pack_overrides: BTreeMap<TypeKey, AutoPackType>,
}

impl Default for PassConfig {
    fn default() -> Self {
        Self {
            module_name: String::from("GeneratedReaders"),
            base_module: true,
            favor_instanced: true,
            exclusions: ExclusionList::default(),
            default_pack: AutoPackType::Packed,
            pack_overrides: BTreeMap::new(),
        }
    }
}

impl PassConfig {
    pub fn with_module_name(mut self, name: impl Into<String>) -> Self {
        self.module_name = name.into();
        self
    }

    pub fn with_base_module(mut self, base_module: bool) -> Self {
        self.base_module = base_module;
        self
    }

    pub fn with_exclusions(mut self, exclusions: ExclusionList) -> Self {
        self.exclusions = exclusions;
        self
    }

    pub fn with_pack_override(mut self, key: TypeKey, pack: AutoPackType) -> Self {
        self.pack_overrides.insert(key, pack);
        self
    }

    /// The default pack mode per type described by this config.
    pub fn policy(&self) -> AutoPackPolicy {
        self.pack_overrides
            .iter()
            .fold(AutoPackPolicy::new(self.default_pack), |policy, (key, pack)| {
                policy.with_override(key.clone(), *pack)
            })
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::PassConfig;
    use crate::info::TypeKey;
    use crate::reader::AutoPackType;

    #[test]
    fn from_ron() {
        let config: PassConfig = ron::from_str(
            r#"(
                module_name: "net_readers",
                base_module: false,
                exclusions: (crates: ["glam"]),
                default_pack: packed_less,
                pack_overrides: { "game::Tick<u8>": unpacked },
            )"#,
        )
        .unwrap();

        assert_eq!(config.module_name, "net_readers");
        assert!(!config.base_module);
        assert!(config.favor_instanced);
        assert_eq!(config.exclusions.crates, ["glam"]);
        assert_eq!(config.exclusions.type_prefixes, ["core::", "alloc::", "std::"]);

        let policy = config.policy();
        assert_eq!(policy.default_for(&TypeKey::new("game::Tick<i64>")), AutoPackType::Unpacked);
        assert_eq!(policy.default_for(&TypeKey::of::<u32>()), AutoPackType::PackedLess);
    }

    #[test]
    fn empty_ron_is_default() {
        let config: PassConfig = ron::from_str("()").unwrap();
        assert_eq!(config, PassConfig::default());
    }
}
