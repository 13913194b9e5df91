//! Column schema: ordered, typed, optionally named columns.
//!
//! A schema is fixed when the parser is built. Names are only needed for
//! name-addressed sinks; index-addressed rows work with anonymous columns.

use std::fmt;

use phf::phf_map;
use thiserror::Error;
use unicode_xid::UnicodeXID;

/// Declared type of one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ColumnType {
    Int,
    Float,
    Double,
    String,
    /// Tokenized but never decoded or delivered.
    Skip,
}

static TYPE_NAMES: phf::Map<&'static str, ColumnType> = phf_map! {
    "int" => ColumnType::Int,
    "integer" => ColumnType::Int,
    "i64" => ColumnType::Int,
    "float" => ColumnType::Float,
    "f32" => ColumnType::Float,
    "double" => ColumnType::Double,
    "f64" => ColumnType::Double,
    "real" => ColumnType::Double,
    "string" => ColumnType::String,
    "str" => ColumnType::String,
    "text" => ColumnType::String,
    "skip" => ColumnType::Skip,
    "ignore" => ColumnType::Skip,
};

impl ColumnType {
    /// Look up a type by any of its accepted names.
    pub fn from_name(name: &str) -> Option<Self> {
        TYPE_NAMES.get(name).copied()
    }

    /// Canonical name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Double => "double",
            Self::String => "string",
            Self::Skip => "skip",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("schema has no columns")]
    Empty,
    #[error("invalid column name {0:?}")]
    InvalidName(String),
    #[error("duplicate column {0:?}")]
    DuplicateColumn(String),
    #[error("unknown column type {0:?}")]
    UnknownType(String),
    #[error("sink has no field named {0:?}")]
    UnknownField(String),
    #[error("column {column} needs a name for this sink")]
    Unnamed { column: usize },
    #[error("column {column} is {declared} but the sink slot cannot hold it")]
    TypeMismatch { column: usize, declared: ColumnType },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: Option<String>,
    pub ty: ColumnType,
}

impl Column {
    pub fn named(name: impl Into<String>, ty: ColumnType) -> Self {
        Self { name: Some(name.into()), ty }
    }

    pub fn anonymous(ty: ColumnType) -> Self {
        Self { name: None, ty }
    }
}

/// Immutable list of columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> Result<Self, SchemaError> {
        if columns.is_empty() {
            return Err(SchemaError::Empty);
        }
        for (i, column) in columns.iter().enumerate() {
            let Some(name) = column.name.as_deref() else {
                continue;
            };
            if !is_identifier(name) {
                return Err(SchemaError::InvalidName(name.to_owned()));
            }
            if columns[..i].iter().any(|c| c.name.as_deref() == Some(name)) {
                return Err(SchemaError::DuplicateColumn(name.to_owned()));
            }
        }
        Ok(Self { columns })
    }

    /// `n` anonymous columns of one type.
    pub fn uniform(n: usize, ty: ColumnType) -> Result<Self, SchemaError> {
        Self::new(vec![Column::anonymous(ty); n])
    }

    /// Build from a declaration such as `"id:int, score:double, _:skip"`.
    ///
    /// Each entry is `name:type` or a bare `type`. A name of `_` leaves the
    /// column anonymous.
    pub fn parse(decl: &str) -> Result<Self, SchemaError> {
        let columns = decl
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                let (name, ty) = match entry.split_once(':') {
                    Some((name, ty)) => (Some(name.trim()), ty.trim()),
                    None => (None, entry),
                };
                let ty = ColumnType::from_name(ty)
                    .ok_or_else(|| SchemaError::UnknownType(ty.to_owned()))?;
                Ok(match name {
                    Some("_") | None => Column::anonymous(ty),
                    Some(name) => Column::named(name, ty),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(columns)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    #[inline]
    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    #[inline]
    pub fn column_type(&self, index: usize) -> Option<ColumnType> {
        self.columns.get(index).map(|c| c.ty)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter()
    }

    /// Index of the column called `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name.as_deref() == Some(name))
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            match &column.name {
                Some(name) => write!(f, "{}:{}", name, column.ty)?,
                None => write!(f, "{}", column.ty)?,
            }
        }
        Ok(())
    }
}

/// `_` may also open a name.
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_xid_start() => chars.all(|c| c.is_xid_continue()),
        _ => false,
    }
}
