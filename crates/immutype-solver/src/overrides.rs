//! Override rules and the matcher that decides when one applies.
//!
//! An override forces the classification of every type its
//! [`TypeSpecifier`] matches. Rules are checked in order and the first match
//! wins. A rule without `from` fires unconditionally; a rule with `from`
//! only replaces the structurally computed value when that value lies
//! between `from` and `to`.

use regex::Regex;
use tracing::debug;

use crate::adapter::StructuralAdapter;
use crate::immutability::Immutability;
use crate::type_name::TypeName;
use crate::types::{SourceFileInfo, TypeRef};

/// Where a matched type must be declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclarationSource {
    /// In the user's project. With a `path`, in exactly that file (relative
    /// to the project directory).
    File { path: Option<String> },
    /// In the host's standard library, or intrinsic.
    Lib,
    /// In an installed external package.
    Package { package: String },
}

/// Which types a rule applies to.
///
/// A type matches when one of its names is listed in `names` or one of its
/// textual forms matches a pattern, none of the ignore lists veto it, and the
/// declaration provenance (if any) checks out.
#[derive(Debug, Clone, Default)]
pub struct TypeSpecifier {
    pub names: Vec<String>,
    pub patterns: Vec<Regex>,
    pub ignore_names: Vec<String>,
    pub ignore_patterns: Vec<Regex>,
    pub from: Option<DeclarationSource>,
}

impl TypeSpecifier {
    /// Matches types named `name`, wherever declared.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            names: vec![name.into()],
            ..Self::default()
        }
    }

    /// Matches types whose textual forms match `pattern`.
    pub fn pattern(pattern: Regex) -> Self {
        Self {
            patterns: vec![pattern],
            ..Self::default()
        }
    }

    pub fn from_source(mut self, source: DeclarationSource) -> Self {
        self.from = Some(source);
        self
    }

    pub fn ignoring_name(mut self, name: impl Into<String>) -> Self {
        self.ignore_names.push(name.into());
        self
    }

    pub fn ignoring_pattern(mut self, pattern: Regex) -> Self {
        self.ignore_patterns.push(pattern);
        self
    }

    /// Tests `ty` against this specifier.
    pub fn matches<A: StructuralAdapter + ?Sized>(&self, db: &A, ty: TypeRef) -> bool {
        let type_name = db.type_name(ty);
        if !name_matches(&type_name, &self.names, &self.patterns) {
            return false;
        }
        if (!self.ignore_names.is_empty() || !self.ignore_patterns.is_empty())
            && name_matches(&type_name, &self.ignore_names, &self.ignore_patterns)
        {
            return false;
        }

        let Some(source) = &self.from else {
            return true;
        };
        let files = db.declaration_files(ty.id);
        match source {
            DeclarationSource::File { path } => declared_in_project(db, path.as_deref(), &files),
            DeclarationSource::Lib => declared_in_lib(&files),
            DeclarationSource::Package { package } => declared_in_package(package, &files),
        }
    }
}

/// A rule forcing the classification of the types it matches.
#[derive(Debug, Clone)]
pub struct ImmutabilityOverride {
    pub specifier: TypeSpecifier,
    pub to: Immutability,
    /// When set, the rule only applies to computed values between `from` and
    /// `to` (inclusive, either direction).
    pub from: Option<Immutability>,
}

impl ImmutabilityOverride {
    pub fn new(specifier: TypeSpecifier, to: Immutability) -> Self {
        Self {
            specifier,
            to,
            from: None,
        }
    }

    pub fn with_from(mut self, from: Immutability) -> Self {
        self.from = Some(from);
        self
    }
}

/// Library types whose mutability is behavioural: their members are all
/// methods or readonly, yet the values they hold can change.
pub fn default_overrides() -> Vec<ImmutabilityOverride> {
    ["Map", "Set", "Date", "URL", "URLSearchParams"]
        .into_iter()
        .map(|name| {
            ImmutabilityOverride::new(
                TypeSpecifier::named(name).from_source(DeclarationSource::Lib),
                Immutability::Mutable,
            )
        })
        .collect()
}

/// The first override in `overrides` whose specifier matches `ty`.
pub fn find_override<'a, A: StructuralAdapter + ?Sized>(
    db: &A,
    ty: TypeRef,
    overrides: &'a [ImmutabilityOverride],
) -> Option<&'a ImmutabilityOverride> {
    let found = overrides
        .iter()
        .find(|rule| rule.specifier.matches(db, ty));
    if let Some(rule) = found {
        debug!(
            type_id = ty.id.0,
            to = rule.to.as_str(),
            from = rule.from.map(Immutability::as_str),
            "override matched"
        );
    }
    found
}

/// Does any name form of `type_name` match one of `names` or `patterns`?
fn name_matches(type_name: &TypeName, names: &[String], patterns: &[Regex]) -> bool {
    let listed = |candidate: &str| names.iter().any(|name| name == candidate);
    let matched = |candidate: &str| patterns.iter().any(|pattern| pattern.is_match(candidate));

    if let Some(name) = type_name.name.as_deref() {
        if listed(name) {
            return true;
        }
        if matched(type_name.name_with_arguments.as_deref().unwrap_or(name)) {
            return true;
        }
    }

    if let Some(alias) = type_name.alias.as_deref()
        && (listed(alias) || matched(alias))
    {
        return true;
    }

    if let Some(alias_with_arguments) = type_name.alias_with_arguments.as_deref()
        && matched(alias_with_arguments)
    {
        return true;
    }

    if listed(&type_name.evaluated) || matched(&type_name.evaluated) {
        return true;
    }

    type_name.written.as_deref().is_some_and(matched)
}

fn declared_in_lib(files: &[SourceFileInfo]) -> bool {
    // Intrinsics have no declaration.
    files.is_empty() || files.iter().any(|file| file.is_default_library)
}

/// `@scope/name` is published to `@types` as `scope__name`.
fn types_package_name(package: &str) -> String {
    if let Some(scoped) = package.strip_prefix('@')
        && let Some((scope, name)) = scoped.split_once('/')
    {
        return format!("{scope}__{name}");
    }
    package.to_string()
}

fn declared_in_package(package: &str, files: &[SourceFileInfo]) -> bool {
    let types_name = types_package_name(package);
    files.iter().any(|file| {
        file.is_external_library
            && file
                .package_name
                .as_deref()
                .is_some_and(|name| name.contains(package) || name.contains(&types_name))
    })
}

fn declared_in_project<A: StructuralAdapter + ?Sized>(
    db: &A,
    path: Option<&str>,
    files: &[SourceFileInfo],
) -> bool {
    let cwd = db.current_directory();
    match path {
        None => {
            let cwd = cwd.to_lowercase();
            let type_roots: Vec<String> = db
                .type_roots()
                .iter()
                .map(|root| root.to_lowercase())
                .collect();
            files.iter().any(|file| {
                if file.is_external_library {
                    return false;
                }
                let file_name = file.file_name.to_lowercase();
                file_name.starts_with(&cwd)
                    && !type_roots.iter().any(|root| file_name.starts_with(root))
            })
        }
        Some(relative) => {
            let absolute = join_path(&cwd, relative).to_lowercase();
            files
                .iter()
                .any(|file| file.file_name.to_lowercase() == absolute)
        }
    }
}

/// Joins `relative` onto `base` and normalizes `.` and `..` segments.
fn join_path(base: &str, relative: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in base.split('/').chain(relative.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    let joined = segments.join("/");
    if base.starts_with('/') {
        format!("/{joined}")
    } else {
        joined
    }
}

#[cfg(test)]
#[path = "../tests/overrides_tests.rs"]
mod tests;
