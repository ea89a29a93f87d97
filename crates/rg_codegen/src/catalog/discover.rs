use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::catalog::{AutoPackSet, MethodBody, Param, ReadMethod, extensions};
use crate::info::TypeKey;
use crate::reader::Reader;
use crate::registry::{Decoder, DecoderFlags, ReadFn};

/// Every catalogued read method starts with this prefix.
pub const READ_PREFIX: &str = "read";

// -----------------------------------------------------------------------------
// Catalog

/// A decoder found by discovery, with the tier it belongs to.
#[derive(Clone, Debug)]
pub struct CatalogEntry {
    pub decoder: Decoder,
    pub instanced: bool,
}

/// The decoders and auto-packed types found in the two method sources.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    pub entries: Vec<CatalogEntry>,
    pub auto_packed: AutoPackSet,
}

impl Catalog {
    /// Catalogs [`Reader::methods`] and the static extension routines.
    pub fn discover() -> Self {
        Self::from_sources(&Reader::methods(), &extensions::methods())
    }

    /// Catalogs custom method tables.
    pub fn from_sources(instance: &[ReadMethod], statics: &[ReadMethod]) -> Self {
        let mut catalog = Self::default();
        for method in instance {
            catalog.visit(method, false);
        }
        for method in statics {
            catalog.visit(method, true);
        }
        catalog
    }

    fn visit(&mut self, method: &ReadMethod, from_static_source: bool) {
        let accepted = if from_static_source {
            accepts_static(method)
        } else {
            accepts_instance(method)
        };
        if !accepted {
            return;
        }

        let auto_packed = method.is_auto_packed();
        let mut flags = DecoderFlags::empty();
        if !from_static_source {
            flags |= DecoderFlags::INSTANCED;
        }
        if auto_packed {
            flags |= DecoderFlags::AUTO_PACKED;
        }

        let decoder = match method.body {
            MethodBody::Concrete { returns, read } => {
                let read: ReadFn = Arc::new(read);
                Decoder::concrete(method.name, returns, read, flags)
            }
            MethodBody::Generic(routine) => {
                Decoder::generic(method.name, TypeKey::new(method.returns), routine, flags)
            }
            MethodBody::Unbound => {
                log::debug!("`{}` matches the read signature but has no body, skipped", method.name);
                return;
            }
        };

        if auto_packed {
            self.auto_packed.insert(decoder.key().clone());
        }
        self.entries.push(CatalogEntry {
            decoder,
            instanced: !from_static_source,
        });
    }
}

/// `read*` methods on the reader taking nothing, or only a pack mode.
fn accepts_instance(method: &ReadMethod) -> bool {
    if method.codegen_exclude || !method.name.starts_with(READ_PREFIX) || method.is_static {
        return false;
    }
    matches!(method.params, [] | [Param::AutoPack])
}

/// Static `read*` functions taking the reader, optionally followed by a pack mode.
fn accepts_static(method: &ReadMethod) -> bool {
    if method.codegen_exclude || !method.is_static || !method.name.starts_with(READ_PREFIX) {
        return false;
    }
    matches!(method.params, [Param::Reader] | [Param::Reader, Param::AutoPack])
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use core::any::Any;

    use super::Catalog;
    use crate::catalog::{Param, ReadMethod};
    use crate::info::TypeKey;

    fn instance(name: &'static str, params: &'static [Param]) -> ReadMethod {
        ReadMethod::concrete::<u8>(name, params, false, |reader, _| {
            Ok(Box::new(reader.read_u8()?) as Box<dyn Any>)
        })
    }

    fn key_of(catalog: &Catalog, name: &str) -> Option<TypeKey> {
        catalog
            .entries
            .iter()
            .find(|entry| entry.decoder.name() == name)
            .map(|entry| entry.decoder.key().clone())
    }

    #[test]
    fn instance_rules() {
        let methods = [
            instance("read_plain", &[]),
            instance("read_packed", &[Param::AutoPack]),
            instance("read_extra", &[Param::Other("usize")]),
            instance("read_two", &[Param::AutoPack, Param::AutoPack]),
            instance("peek", &[]),
            instance("read_excluded", &[]).exclude(),
        ];
        let catalog = Catalog::from_sources(&methods, &[]);

        let names: Vec<_> = catalog.entries.iter().map(|e| e.decoder.name()).collect();
        assert_eq!(names, ["read_plain", "read_packed"]);
        assert!(catalog.entries.iter().all(|e| e.instanced));
        assert!(catalog.auto_packed.contains(&TypeKey::of::<u8>()));
    }

    #[test]
    fn static_rules() {
        let mut leading = instance("read_leading", &[Param::Reader]);
        leading.is_static = true;
        let mut packed = instance("read_with_pack", &[Param::Reader, Param::AutoPack]);
        packed.is_static = true;
        let mut reader_last = instance("read_reader_last", &[Param::AutoPack, Param::Reader]);
        reader_last.is_static = true;
        let not_static = instance("read_not_static", &[Param::Reader]);

        let catalog = Catalog::from_sources(&[], &[leading, packed, reader_last, not_static]);
        let names: Vec<_> = catalog.entries.iter().map(|e| e.decoder.name()).collect();
        assert_eq!(names, ["read_leading", "read_with_pack"]);
        assert!(catalog.entries.iter().all(|e| !e.instanced));
    }

    #[test]
    fn builtin_sources() {
        let catalog = Catalog::discover();

        assert_eq!(key_of(&catalog, "read_i32"), Some(TypeKey::of::<i32>()));
        assert_eq!(key_of(&catalog, "read_string"), Some(TypeKey::of::<String>()));
        assert_eq!(key_of(&catalog, "read_list").unwrap().as_str(), "alloc::vec::Vec`1");
        assert_eq!(key_of(&catalog, "read_packed_whole"), None);
        assert_eq!(key_of(&catalog, "read_into"), None);
        assert_eq!(key_of(&catalog, "read_packed_length"), None);

        assert!(catalog.auto_packed.contains(&TypeKey::of::<i64>()));
        assert!(catalog.auto_packed.contains(&TypeKey::of::<core::time::Duration>()));
        assert!(!catalog.auto_packed.contains(&TypeKey::of::<bool>()));
    }
}
