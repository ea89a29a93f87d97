use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use thiserror::Error;

use crate::info::TypeKey;
use crate::pass::PassState;
use crate::reader::ReadError;
use crate::registry::Tier;

// -----------------------------------------------------------------------------
// DecodeError

/// Failure while running a decoder against a byte stream.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeError {
    #[error(transparent)]
    Read(#[from] ReadError),

    #[error("no generic read was materialized for `{type_path}`")]
    NotMaterialized { type_path: &'static str },

    #[error("decoder did not produce a `{expected}`")]
    MismatchedValue { expected: &'static str },

    #[error("member `{member}` expects a `{expected}`")]
    MismatchedMember {
        member: &'static str,
        expected: &'static str,
    },

    #[error("decoder for `{type_path}` was invoked before its synthesis completed")]
    Unresolved { type_path: &'static str },

    #[error("a null `{type_path}` was read where a value is required")]
    UnexpectedNull { type_path: &'static str },

    #[error("`{type_path}` holds {expected} item(s), the stream has {found}")]
    LengthMismatch {
        type_path: &'static str,
        expected: usize,
        found: usize,
    },
}

// -----------------------------------------------------------------------------
// CodegenError

/// Where a missing decoder was required from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Requested directly.
    Root,
    /// Required by a member of a composite.
    Member { owner: String, member: &'static str },
    /// Required by a generic argument of an instantiation.
    GenericArgument { owner: String },
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => Ok(()),
            Self::Member { owner, member } => write!(f, " (member `{member}` of `{owner}`)"),
            Self::GenericArgument { owner } => write!(f, " (generic argument of `{owner}`)"),
        }
    }
}

/// Why a type was refused by the composite synthesizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unsupported {
    /// The type path starts with an excluded prefix.
    ExcludedPrefix(String),
    /// The type lives in an excluded crate.
    ExcludedCrate(String),
    /// The type is marked `non_serializable`.
    NonSerializable,
    /// A member's declared type differs from what its decoder produces.
    ///
    /// Reference composites decode to `Option<T>`, so they must be held as one.
    MemberShape {
        member: &'static str,
        declared: &'static str,
        decoded: &'static str,
    },
    /// A generic routine was handed an argument decoder of the wrong type.
    ArgumentMismatch {
        expected: &'static str,
        found: &'static str,
    },
    /// A generic routine was handed the wrong number of arguments.
    ArgumentCount { expected: usize, found: usize },
}

impl fmt::Display for Unsupported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExcludedPrefix(prefix) => write!(f, "paths starting with `{prefix}` are excluded"),
            Self::ExcludedCrate(name) => write!(f, "crate `{name}` is excluded"),
            Self::NonSerializable => f.write_str("the type is marked non-serializable"),
            Self::MemberShape {
                member,
                declared,
                decoded,
            } => write!(
                f,
                "member `{member}` is declared as `{declared}` but decodes to `{decoded}`"
            ),
            Self::ArgumentMismatch { expected, found } => {
                write!(f, "expected an argument decoding `{expected}`, found `{found}`")
            }
            Self::ArgumentCount { expected, found } => {
                write!(f, "expected {expected} generic argument(s), found {found}")
            }
        }
    }
}

/// A build-time fault raised during a generation pass.
///
/// Faults never abort the pass; they are reported, accumulated and
/// returned together by [`GenerationPass::seal`](crate::pass::GenerationPass::seal).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CodegenError {
    #[error("could not create deserializer for `{type_path}`{origin}")]
    MissingDecoder {
        type_path: Cow<'static, str>,
        origin: Origin,
    },

    #[error("a deserializer for `{key}` is already registered in the {tier} tier")]
    DuplicateRegistration { key: TypeKey, tier: Tier },

    #[error("generic read already created for `{type_path}`")]
    DuplicateDispatch { type_path: &'static str },

    #[error("`{type_path}` cannot be synthesized: {reason}")]
    UnsupportedType {
        type_path: Cow<'static, str>,
        reason: Unsupported,
    },

    #[error("`{type_path}` contains itself without a nullable break: {}", .cycle.join(" -> "))]
    CyclicType {
        type_path: Cow<'static, str>,
        cycle: Vec<Cow<'static, str>>,
    },

    #[error("`{operation}` is not allowed while the pass is {state}")]
    InvalidState {
        operation: &'static str,
        state: PassState,
    },
}

impl CodegenError {
    /// Attributes a directly missing decoder to the member or argument that
    /// required it. Faults already attributed deeper pass through unchanged.
    pub(crate) fn required_by(self, origin: Origin) -> Self {
        match self {
            Self::MissingDecoder {
                type_path,
                origin: Origin::Root,
            } => Self::MissingDecoder { type_path, origin },
            other => other,
        }
    }
}

// -----------------------------------------------------------------------------
// PassFailed

/// Every fault recorded by a generation pass that could not be sealed.
#[derive(Debug, Error, Clone)]
#[error("generation pass failed with {} fault(s)", .faults.len())]
pub struct PassFailed {
    pub faults: Box<[CodegenError]>,
}

impl PassFailed {
    /// Iterates over the recorded faults, in the order they were reported.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &CodegenError> {
        self.faults.iter()
    }
}
