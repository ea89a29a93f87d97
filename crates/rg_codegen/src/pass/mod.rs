//! The generation pass and its sealed output.

// -----------------------------------------------------------------------------
// Modules

mod artifact;
mod config;
mod generation;
mod state;

// -----------------------------------------------------------------------------
// Exports

pub use artifact::Artifact;
pub use config::PassConfig;
pub use generation::GenerationPass;
pub use state::PassState;

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec::Vec;
    use core::time::Duration;

    use super::{GenerationPass, PassConfig, PassState};
    use crate::catalog::{Catalog, Param, ReadMethod};
    use crate::derive::Typed;
    use crate::info::{TypeKey, Typed as _};
    use crate::reader::{AutoPackType, Reader};
    use crate::registry::Decoder;
    use crate::{CodegenError, DecodeError};

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
    struct Profile {
        name: String,
        #[codegen(pack = unpacked)]
        level: u16,
        #[codegen(skip)]
        cached: u64,
    }

    #[derive(Typed, Default, Debug, PartialEq)]
    struct Settings {
        #[codegen(setter = Settings::set_volume)]
        volume: u8,
    }

    impl Settings {
        fn set_volume(&mut self, volume: u8) {
            self.volume = volume.min(100);
        }
    }

    #[derive(Typed, Default, Debug, PartialEq)]
    struct Broken {
        len: usize,
    }

    #[cfg(feature = "auto_register")]
    #[derive(Typed, Default, Debug, PartialEq)]
    #[codegen(auto_register)]
    struct Beacon {
        channel: u8,
        label: String,
    }

    #[test]
    fn state_machine() {
        let mut pass = GenerationPass::new(PassConfig::default());
        assert_eq!(pass.state(), PassState::Uninitialized);
        assert!(matches!(
            pass.include::<i32>(),
            Err(CodegenError::InvalidState { .. })
        ));

        pass.load_catalog().unwrap();
        assert_eq!(pass.state(), PassState::CatalogLoaded);
        assert!(pass.load_catalog().is_err());

        pass.include::<i32>().unwrap();
        assert_eq!(pass.state(), PassState::Registering);

        pass.materialize_dispatch().unwrap();
        assert_eq!(pass.state(), PassState::DispatchMaterialized);
        assert!(pass.include::<Pair>().is_err());

        pass.seal().unwrap();
        assert_eq!(pass.state(), PassState::Sealed);
        assert!(pass.seal().is_err());

        pass.reset();
        assert_eq!(pass.state(), PassState::Uninitialized);
        assert!(pass.faults().is_empty());
    }

    #[test]
    fn primitives_are_catalogued() {
        let pass = pass();
        let decoder = pass.lookup(&TypeKey::of::<i32>(), true).unwrap();
        assert!(decoder.is_auto_packed());

        let value = decoder.read(&mut Reader::new(&[0x54]), AutoPackType::Packed).unwrap();
        assert_eq!(value.downcast_ref::<i32>(), Some(&42));

        assert!(pass.lookup(&TypeKey::of::<Duration>(), true).is_none());
        assert!(pass.lookup(&TypeKey::of::<Duration>(), false).is_some());
    }

    #[test]
    fn decode_by_type() {
        let mut pass = pass();
        pass.include::<Pair>().unwrap();
        let artifact = pass.seal().unwrap();

        let mut reader = Reader::new(&[0x00, 0x54, 0x01]);
        assert_eq!(artifact.decode::<bool>(&mut reader), Ok(false));
        assert_eq!(artifact.decode::<Pair>(&mut reader), Ok(Pair { a: 42, b: true }));

        let mut reader = Reader::new(&[0x2A, 0x00, 0x00, 0x00]);
        assert_eq!(
            artifact.decode_packed::<i32>(&mut reader, AutoPackType::Unpacked),
            Ok(42)
        );

        let read = artifact.generic_read::<i64>().unwrap();
        assert!(read.is_auto_packed());
        assert!(!artifact.generic_read::<String>().unwrap().is_auto_packed());

        assert_eq!(
            artifact.decode::<Vec<Pair>>(&mut Reader::new(&[])),
            Err(DecodeError::NotMaterialized {
                type_path: core::any::type_name::<Vec<Pair>>()
            })
        );
        assert_eq!(artifact.routines().len(), 1);
        assert!(artifact.routines()[0].to_string().contains("value.a = read_i32(reader, Packed)?;"));
    }

    #[test]
    fn decoders_by_type() {
        let mut pass = pass();
        pass.include::<Profile>().unwrap();
        pass.include::<Vec<Pair>>().unwrap();
        let artifact = pass.seal().unwrap();

        let profile = artifact.decoder_for::<Profile>(true).unwrap();
        assert!(profile.returns().unwrap().is::<Option<Profile>>());
        assert_eq!(artifact.decoder_for::<Option<Profile>>(true).unwrap().name(), profile.name());

        assert!(artifact.decoder_for::<Pair>(true).unwrap().is_synthesized());
        assert!(artifact.decoder_for::<Vec<Pair>>(true).is_some());
        assert_eq!(artifact.decoder_for::<i32>(false).unwrap().name(), "read_i32");
        assert!(artifact.decoder_for::<Option<u8>>(true).is_none());
    }

    #[test]
    fn members_honor_attributes() {
        let mut pass = pass();
        pass.include::<Profile>().unwrap();
        pass.include::<Settings>().unwrap();
        let artifact = pass.seal().unwrap();

        // not null, "ab", level fixed width
        let mut reader = Reader::new(&[0x00, 0x02, b'a', b'b', 0x05, 0x00]);
        let profile = artifact.decode::<Option<Profile>>(&mut reader).unwrap();
        assert_eq!(
            profile,
            Some(Profile {
                name: "ab".into(),
                level: 5,
                cached: 0,
            })
        );

        let settings = artifact.decode::<Settings>(&mut Reader::new(&[0xFF])).unwrap();
        assert_eq!(settings.volume, 100);
    }

    #[test]
    fn duplicate_registration_is_a_fault() {
        let mut pass = pass();
        let custom = Decoder::from_fn("read_i32_custom", |reader| Ok(reader.read_i32(AutoPackType::Unpacked)?));

        let err = pass.register(custom.clone(), true, true).unwrap_err();
        assert!(matches!(err, CodegenError::DuplicateRegistration { .. }));
        assert_eq!(pass.lookup(&TypeKey::of::<i32>(), true).unwrap().name(), "read_i32");

        let failed = pass.seal().unwrap_err();
        assert_eq!(failed.faults.len(), 1);
    }

    #[test]
    fn faults_accumulate_until_seal() {
        let mut pass = pass();
        let missing = pass.include::<Broken>().unwrap_err();
        let custom = Decoder::from_fn("read_i32_again", |reader| Ok(reader.read_i32(AutoPackType::Unpacked)?));
        let duplicate = pass.register(custom, true, true).unwrap_err();

        // unrelated work carries on
        assert!(pass.include::<Pair>().unwrap().is_synthesized());
        assert_eq!(pass.state(), PassState::Registering);
        assert_eq!(pass.faults().len(), 2);

        let failed = pass.seal().unwrap_err();
        assert_eq!(failed.faults.to_vec(), vec![missing, duplicate]);
        assert_eq!(pass.state(), PassState::Sealed);
    }

    #[cfg(feature = "auto_register")]
    #[test]
    fn registered_types_are_synthesized() {
        let mut pass = pass();
        assert_eq!(pass.synthesize_registered(), Ok(1));
        assert!(pass.lookup(Beacon::type_info().key(), true).is_some());

        let artifact = pass.seal().unwrap();
        let mut reader = Reader::new(&[0x03, 0x01, b'x']);
        let expected = Beacon {
            channel: 3,
            label: "x".into(),
        };
        assert_eq!(artifact.decode::<Beacon>(&mut reader), Ok(expected));
    }

    #[test]
    fn auto_pack_set_is_fixed_once_synthesis_begins() {
        let mut pass = pass();
        let early = Decoder::from_packed_fn("read_u32_pair", |reader, pack| {
            Ok((reader.read_u32(pack)?, reader.read_u32(pack)?))
        });
        pass.register(early, true, true).unwrap();
        assert!(pass.auto_packed().contains(&TypeKey::of::<(u32, u32)>()));

        pass.include::<Pair>().unwrap();
        let late = Decoder::from_packed_fn("read_u16_pair", |reader, pack| {
            Ok((reader.read_u16(pack)?, reader.read_u16(pack)?))
        });
        pass.register(late, true, true).unwrap();
        assert!(pass.lookup(&TypeKey::of::<(u16, u16)>(), true).unwrap().is_auto_packed());
        assert!(!pass.auto_packed().contains(&TypeKey::of::<(u16, u16)>()));

        let artifact = pass.seal().unwrap();
        assert!(artifact.is_auto_packed(&TypeKey::of::<(u32, u32)>()));
        assert!(!artifact.is_auto_packed(&TypeKey::of::<(u16, u16)>()));
    }

    #[test]
    fn replacing_a_builtin() {
        let mut pass = pass();
        let custom = Decoder::from_fn("read_i32_fixed", |reader| Ok(reader.read_i32(AutoPackType::Unpacked)?));
        let previous = pass.register(custom, true, false).unwrap();
        assert_eq!(previous.unwrap().name(), "read_i32");

        let artifact = pass.seal().unwrap();
        let mut reader = Reader::new(&[0xFE, 0xFF, 0xFF, 0xFF]);
        assert_eq!(artifact.decode::<i32>(&mut reader), Ok(-2));
    }

    #[test]
    fn duplicate_dispatch_keeps_first() {
        let mut pass = pass();
        let first = Decoder::from_fn("read_pair_first", |_| Ok(Pair { a: 1, b: true }));
        let second = Decoder::from_fn("read_pair_second", |_| Ok(Pair { a: 2, b: false }));

        assert_eq!(pass.materialize(&first, true), Ok(true));
        let err = pass.materialize(&second, true).unwrap_err();
        assert!(matches!(err, CodegenError::DuplicateDispatch { .. }));

        let module = pass.module().unwrap();
        let entry = module.dispatch().iter().find(|entry| entry.type_path().ends_with("Pair"));
        assert_eq!(entry.unwrap().decoder(), "read_pair_first");
        assert_eq!(pass.faults().len(), 1);
    }

    #[test]
    fn sweep_skips_already_materialized() {
        let mut pass = pass();
        let decoder = pass.include::<Pair>().unwrap();
        assert_eq!(pass.materialize(&decoder, false), Ok(true));

        let artifact = pass.seal().unwrap();
        assert!(artifact.generic_read::<Pair>().is_some());
    }

    #[test]
    fn generic_definitions_are_not_materialized() {
        let mut pass = pass();
        let list = pass.lookup(&TypeKey::new("alloc::vec::Vec<T>"), false).unwrap().clone();
        assert_eq!(pass.materialize(&list, true), Ok(false));
        assert!(pass.faults().is_empty());
    }

    #[test]
    fn non_base_module_skips_builtin_instances() {
        let mut pass = GenerationPass::new(PassConfig::default().with_base_module(false));
        pass.load_catalog().unwrap();
        pass.include::<Pair>().unwrap();
        let artifact = pass.seal().unwrap();

        assert!(artifact.generic_read::<Pair>().is_some());
        assert!(artifact.generic_read::<i32>().is_none());
        assert!(artifact.generic_read::<Duration>().is_some());
    }

    #[test]
    fn pack_overrides_and_duration() {
        let config = PassConfig::default()
            .with_pack_override(TypeKey::of::<Duration>(), AutoPackType::Unpacked);
        let mut pass = GenerationPass::new(config);
        pass.load_catalog().unwrap();
        let artifact = pass.seal().unwrap();

        let mut bytes = 3_u64.to_le_bytes().to_vec();
        bytes.extend_from_slice(&500_u32.to_le_bytes());
        let value = artifact.decode::<Duration>(&mut Reader::new(&bytes)).unwrap();
        assert_eq!(value, Duration::new(3, 500));
    }

    #[test]
    fn custom_catalog() {
        fn read_byte_pair(reader: &mut Reader<'_>) -> Result<(u8, u8), DecodeError> {
            Ok((reader.read_u8()?, reader.read_u8()?))
        }

        let statics = [ReadMethod::concrete::<(u8, u8)>(
            "read_byte_pair",
            &[Param::Reader],
            true,
            |reader, _| Ok(alloc::boxed::Box::new(read_byte_pair(reader)?)),
        )];
        let mut pass = GenerationPass::new(PassConfig::default());
        pass.load_catalog_from(Catalog::from_sources(&[], &statics)).unwrap();
        let artifact = pass.seal().unwrap();

        assert_eq!(artifact.decode::<(u8, u8)>(&mut Reader::new(&[1, 2])), Ok((1, 2)));
        assert!(artifact.generic_read::<i32>().is_none());
    }
}
