//! Level properties form
//!
//! Text fields are keyed by [`EditorField`] rather than by name, so the
//! active field can only ever be one that exists.

use std::collections::BTreeMap;
use std::fmt;

use crate::sim::level::limits;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EditorField {
    Name,
    Width,
    Height,
}

impl EditorField {
    pub const ALL: [EditorField; 3] = [EditorField::Name, EditorField::Width, EditorField::Height];

    pub fn label(self) -> &'static str {
        match self {
            EditorField::Name => "Name",
            EditorField::Width => "Width",
            EditorField::Height => "Height",
        }
    }

    /// Longest text the field accepts
    fn max_len(self) -> usize {
        match self {
            EditorField::Name => limits::MAX_NAME_LEN,
            EditorField::Width | EditorField::Height => 4,
        }
    }

    fn accepts(self, c: char) -> bool {
        match self {
            EditorField::Name => !c.is_control(),
            EditorField::Width | EditorField::Height => c.is_ascii_digit(),
        }
    }
}

/// Parsed form contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelProperties {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    Empty(EditorField),
    Invalid { field: EditorField, value: String },
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormError::Empty(field) => write!(f, "{} must not be empty", field.label()),
            FormError::Invalid { field, value } => {
                write!(f, "{} '{}' must be between 3 and {}", field.label(), value, limits::MAX_DIMENSION)
            }
        }
    }
}

impl std::error::Error for FormError {}

#[derive(Debug, Clone, Default)]
pub struct PropertiesForm {
    values: BTreeMap<EditorField, String>,
    active: Option<EditorField>,
}

impl PropertiesForm {
    pub fn from_properties(props: &LevelProperties) -> Self {
        let mut values = BTreeMap::new();
        values.insert(EditorField::Name, props.name.clone());
        values.insert(EditorField::Width, props.width.to_string());
        values.insert(EditorField::Height, props.height.to_string());
        Self { values, active: None }
    }

    pub fn value(&self, field: EditorField) -> &str {
        self.values.get(&field).map_or("", String::as_str)
    }

    pub fn active(&self) -> Option<EditorField> {
        self.active
    }

    pub fn focus(&mut self, field: Option<EditorField>) {
        self.active = field;
    }

    /// Move focus to the next field, wrapping around
    pub fn focus_next(&mut self) {
        self.active = Some(match self.active {
            None | Some(EditorField::Height) => EditorField::Name,
            Some(EditorField::Name) => EditorField::Width,
            Some(EditorField::Width) => EditorField::Height,
        });
    }

    /// Type into the active field. Returns false if nothing changed.
    pub fn type_char(&mut self, c: char) -> bool {
        let Some(field) = self.active else {
            return false;
        };
        if !field.accepts(c) {
            return false;
        }
        let value = self.values.entry(field).or_default();
        if value.chars().count() >= field.max_len() {
            return false;
        }
        value.push(c);
        true
    }

    pub fn backspace(&mut self) -> bool {
        let Some(field) = self.active else {
            return false;
        };
        self.values.get_mut(&field).and_then(|v| v.pop()).is_some()
    }

    pub fn parse(&self) -> Result<LevelProperties, FormError> {
        let name = self.value(EditorField::Name).trim();
        if name.is_empty() {
            return Err(FormError::Empty(EditorField::Name));
        }
        Ok(LevelProperties {
            name: name.to_string(),
            width: self.parse_dimension(EditorField::Width)?,
            height: self.parse_dimension(EditorField::Height)?,
        })
    }

    fn parse_dimension(&self, field: EditorField) -> Result<u32, FormError> {
        let raw = self.value(field);
        if raw.is_empty() {
            return Err(FormError::Empty(field));
        }
        match raw.parse::<u32>() {
            Ok(n) if (3..=limits::MAX_DIMENSION).contains(&n) => Ok(n),
            _ => Err(FormError::Invalid {
                field,
                value: raw.to_string(),
            }),
        }
    }
}
