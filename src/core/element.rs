use crate::types::DataType;

/// One parsed tag: a bare marker or a name/value pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Tag name, ASCII-lowercased.
    pub name: String,
    /// Raw value bytes; `None` for bare tags.
    pub value: Option<Vec<u8>>,
    /// Optional type code, ASCII-uppercased.
    pub type_code: Option<char>,
}

impl Element {
    /// Builds a bare marker element such as `<eor>`.
    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            type_code: None,
        }
    }

    /// True when the tag declared a length and carried a value.
    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    /// True for a bare tag named `name`.
    pub fn is_marker(&self, name: &str) -> bool {
        self.value.is_none() && self.name == name
    }

    /// Number of value bytes, which always equals the declared length.
    pub fn declared_len(&self) -> Option<usize> {
        self.value.as_ref().map(Vec::len)
    }

    /// Data type implied by the type code, if one was given and known.
    pub fn data_type(&self) -> Option<DataType> {
        self.type_code.and_then(DataType::from_type_code)
    }
}
