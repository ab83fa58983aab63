//! Deserializable override configuration.
//!
//! Mirrors the option shape lint rules receive:
//!
//! ```json
//! [
//!   { "type": "Foo", "to": "Immutable" },
//!   { "type": { "from": "package", "package": "immutable", "pattern": "^Map<.+>$" },
//!     "to": "Immutable" },
//!   { "type": { "from": "file", "name": "Cache" }, "to": "Mutable", "from": "ReadonlyDeep" }
//! ]
//! ```
//!
//! Records are converted into [`ImmutabilityOverride`]s with `TryFrom`, which
//! compiles patterns and checks the provenance fields.

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::immutability::{Immutability, ParseImmutabilityError};
use crate::overrides::{DeclarationSource, ImmutabilityOverride, TypeSpecifier};

#[derive(Debug, Error)]
pub enum OverrideConfigError {
    #[error("invalid type pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("a `package` type specifier needs a `package` field")]
    MissingPackage,
    #[error("type specifier has neither a name nor a pattern")]
    EmptySpecifier,
    #[error(transparent)]
    InvalidImmutability(#[from] ParseImmutabilityError),
}

/// One string or a list of strings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    File,
    Lib,
    Package,
}

/// Object form of a type specifier.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TypeSpecifierConfig {
    pub name: Option<OneOrMany>,
    pub pattern: Option<OneOrMany>,
    pub ignore_name: Option<OneOrMany>,
    pub ignore_pattern: Option<OneOrMany>,
    pub from: Option<SourceKind>,
    pub path: Option<String>,
    pub package: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum TypeSpecifierInput {
    Name(String),
    Detailed(TypeSpecifierConfig),
}

/// One configured override. Levels stay textual until conversion so a bad
/// level surfaces as [`OverrideConfigError::InvalidImmutability`].
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct OverrideConfig {
    #[serde(rename = "type")]
    pub type_specifier: TypeSpecifierInput,
    pub to: String,
    #[serde(default)]
    pub from: Option<String>,
}

fn compile(patterns: Option<OneOrMany>) -> Result<Vec<Regex>, OverrideConfigError> {
    patterns
        .map(OneOrMany::into_vec)
        .unwrap_or_default()
        .into_iter()
        .map(|pattern| {
            Regex::new(&pattern)
                .map_err(|source| OverrideConfigError::InvalidPattern { pattern, source })
        })
        .collect()
}

impl TryFrom<TypeSpecifierInput> for TypeSpecifier {
    type Error = OverrideConfigError;

    fn try_from(input: TypeSpecifierInput) -> Result<Self, Self::Error> {
        let config = match input {
            TypeSpecifierInput::Name(name) => return Ok(Self::named(name)),
            TypeSpecifierInput::Detailed(config) => config,
        };

        let names = config.name.map(OneOrMany::into_vec).unwrap_or_default();
        let patterns = compile(config.pattern)?;
        if names.is_empty() && patterns.is_empty() {
            return Err(OverrideConfigError::EmptySpecifier);
        }

        let from = match config.from {
            None => None,
            Some(SourceKind::File) => Some(DeclarationSource::File { path: config.path }),
            Some(SourceKind::Lib) => Some(DeclarationSource::Lib),
            Some(SourceKind::Package) => Some(DeclarationSource::Package {
                package: config.package.ok_or(OverrideConfigError::MissingPackage)?,
            }),
        };

        Ok(Self {
            names,
            patterns,
            ignore_names: config.ignore_name.map(OneOrMany::into_vec).unwrap_or_default(),
            ignore_patterns: compile(config.ignore_pattern)?,
            from,
        })
    }
}

impl TryFrom<OverrideConfig> for ImmutabilityOverride {
    type Error = OverrideConfigError;

    fn try_from(config: OverrideConfig) -> Result<Self, Self::Error> {
        let to: Immutability = config.to.parse()?;
        let from = config
            .from
            .map(|from| from.parse::<Immutability>())
            .transpose()?;
        Ok(Self {
            specifier: TypeSpecifier::try_from(config.type_specifier)?,
            to,
            from,
        })
    }
}

/// Converts a list of configured overrides, stopping at the first invalid one.
pub fn compile_overrides(
    configs: impl IntoIterator<Item = OverrideConfig>,
) -> Result<Vec<ImmutabilityOverride>, OverrideConfigError> {
    configs
        .into_iter()
        .map(ImmutabilityOverride::try_from)
        .collect()
}

#[cfg(test)]
#[path = "../tests/config_tests.rs"]
mod tests;
