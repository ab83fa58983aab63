//! Textual forms of a type, as seen by override matching.

/// The different ways a type can be spelled.
///
/// Given `type Wrapper<T> = Box<T>` used as `Wrapper<string>`:
///
/// | field | value |
/// |-------|-------|
/// | `name` | `Box` |
/// | `name_with_arguments` | `Box<string>` |
/// | `alias` | `Wrapper` |
/// | `alias_with_arguments` | `Wrapper<string>` |
/// | `evaluated` | `Wrapper<string>` |
/// | `written` | the source text, when the type came from a type node |
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeName {
    /// Declared name: intrinsic name, or the declaring symbol's name.
    /// `None` for anonymous types such as object literals.
    pub name: Option<String>,
    pub name_with_arguments: Option<String>,
    pub alias: Option<String>,
    pub alias_with_arguments: Option<String>,
    /// The host's fully evaluated rendering. Always present.
    pub evaluated: String,
    pub written: Option<String>,
}

impl TypeName {
    pub fn evaluated(evaluated: impl Into<String>) -> Self {
        Self {
            evaluated: evaluated.into(),
            ..Self::default()
        }
    }

    /// How this type renders when it appears as a type argument.
    pub fn as_argument(&self) -> &str {
        self.name_with_arguments
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or(self.evaluated.as_str())
    }
}
