//! Schema module for MSBuild project names and lookup helpers

mod matching;
mod msbuild;

pub use matching::Match;
pub use msbuild::{
    MsBuildSchema, QualifiedName, DEFAULT_LANG_VERSION, INCLUDE, LANG_VERSION, NONE,
    PROPERTY_GROUP,
};
