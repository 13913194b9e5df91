//! Row sinks: where decoded fields go.
//!
//! A sink is bound to the schema once, when the parser is built. After that
//! the parser addresses it purely by column index; any name lookup happens
//! inside [`RowSink::bind`].
//!
//! Two sinks are provided:
//!
//! - [`IndexedRow<T>`]: homogeneous, `values[column]`.
//! - [`NamedRow<R>`]: a caller struct whose fields are matched to columns
//!   by name through [`NamedRecord`].

use std::ops::Index;

use crate::schema::{ColumnType, Schema, SchemaError};
use crate::value::Value;

/// Destination for one record's typed fields.
///
/// For every completed record each non-skip column is set exactly once, in
/// increasing column order.
pub trait RowSink {
    /// Check the schema and precompute whatever addressing the sink needs.
    fn bind(&mut self, schema: &Schema) -> Result<(), SchemaError> {
        let _ = schema;
        Ok(())
    }

    fn set_int(&mut self, column: usize, value: i64);
    fn set_float(&mut self, column: usize, value: f32);
    fn set_double(&mut self, column: usize, value: f64);
    fn set_string(&mut self, column: usize, value: &str);
}

/// Element type of an [`IndexedRow`].
pub trait Slot: Clone {
    /// Value before any field is stored.
    fn empty() -> Self;

    /// Can a column of type `ty` be stored here?
    fn accepts(ty: ColumnType) -> bool;

    fn put_int(&mut self, _value: i64) {}
    fn put_float(&mut self, _value: f32) {}
    fn put_double(&mut self, _value: f64) {}
    fn put_str(&mut self, _value: &str) {}
}

impl Slot for i64 {
    fn empty() -> Self {
        0
    }

    fn accepts(ty: ColumnType) -> bool {
        ty == ColumnType::Int
    }

    fn put_int(&mut self, value: i64) {
        *self = value;
    }
}

impl Slot for f32 {
    fn empty() -> Self {
        f32::NAN
    }

    fn accepts(ty: ColumnType) -> bool {
        ty == ColumnType::Float
    }

    fn put_float(&mut self, value: f32) {
        *self = value;
    }
}

/// Also holds float columns, widened.
impl Slot for f64 {
    fn empty() -> Self {
        f64::NAN
    }

    fn accepts(ty: ColumnType) -> bool {
        matches!(ty, ColumnType::Float | ColumnType::Double)
    }

    fn put_float(&mut self, value: f32) {
        *self = f64::from(value);
    }

    fn put_double(&mut self, value: f64) {
        *self = value;
    }
}

impl Slot for String {
    fn empty() -> Self {
        String::new()
    }

    fn accepts(ty: ColumnType) -> bool {
        ty == ColumnType::String
    }

    fn put_str(&mut self, value: &str) {
        self.clear();
        self.push_str(value);
    }
}

impl Slot for Value {
    fn empty() -> Self {
        Value::Empty
    }

    fn accepts(_ty: ColumnType) -> bool {
        true
    }

    fn put_int(&mut self, value: i64) {
        *self = Value::Int(value);
    }

    fn put_float(&mut self, value: f32) {
        *self = Value::Float(value);
    }

    fn put_double(&mut self, value: f64) {
        *self = Value::Double(value);
    }

    fn put_str(&mut self, value: &str) {
        self.assign_str(value);
    }
}

/// Homogeneous row addressed by column index.
///
/// Holds the most recently completed record. Skip columns keep
/// [`Slot::empty`].
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedRow<T> {
    values: Vec<T>,
}

impl<T: Slot> IndexedRow<T> {
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    #[inline]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    #[inline]
    pub fn get(&self, column: usize) -> Option<&T> {
        self.values.get(column)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Owned copy of the current values.
    pub fn to_vec(&self) -> Vec<T> {
        self.values.clone()
    }

    #[inline]
    fn slot(&mut self, column: usize) -> Option<&mut T> {
        self.values.get_mut(column)
    }
}

impl<T: Slot> Default for IndexedRow<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<usize> for IndexedRow<T> {
    type Output = T;

    fn index(&self, column: usize) -> &T {
        &self.values[column]
    }
}

impl<T: Slot> RowSink for IndexedRow<T> {
    fn bind(&mut self, schema: &Schema) -> Result<(), SchemaError> {
        for (column, c) in schema.iter().enumerate() {
            if c.ty != ColumnType::Skip && !T::accepts(c.ty) {
                return Err(SchemaError::TypeMismatch { column, declared: c.ty });
            }
        }
        self.values.clear();
        self.values.resize(schema.len(), T::empty());
        Ok(())
    }

    fn set_int(&mut self, column: usize, value: i64) {
        if let Some(slot) = self.slot(column) {
            slot.put_int(value);
        }
    }

    fn set_float(&mut self, column: usize, value: f32) {
        if let Some(slot) = self.slot(column) {
            slot.put_float(value);
        }
    }

    fn set_double(&mut self, column: usize, value: f64) {
        if let Some(slot) = self.slot(column) {
            slot.put_double(value);
        }
    }

    fn set_string(&mut self, column: usize, value: &str) {
        if let Some(slot) = self.slot(column) {
            slot.put_str(value);
        }
    }
}

/// A caller-defined record filled by field name.
///
/// ```
/// use chunkcsv_core::{ColumnType, NamedRecord};
///
/// #[derive(Default)]
/// struct Reading {
///     station: String,
///     celsius: f64,
/// }
///
/// impl NamedRecord for Reading {
///     fn resolve(&self, name: &str) -> Option<(usize, ColumnType)> {
///         match name {
///             "station" => Some((0, ColumnType::String)),
///             "celsius" => Some((1, ColumnType::Double)),
///             _ => None,
///         }
///     }
///
///     fn set_double(&mut self, _slot: usize, value: f64) {
///         self.celsius = value;
///     }
///
///     fn set_string(&mut self, _slot: usize, value: &str) {
///         self.station = value.to_owned();
///     }
/// }
/// ```
pub trait NamedRecord {
    /// Slot number and stored type of the field called `name`.
    fn resolve(&self, name: &str) -> Option<(usize, ColumnType)>;

    fn set_int(&mut self, _slot: usize, _value: i64) {}
    fn set_float(&mut self, _slot: usize, _value: f32) {}
    fn set_double(&mut self, _slot: usize, _value: f64) {}
    fn set_string(&mut self, _slot: usize, _value: &str) {}
}

/// Name-addressed sink over a [`NamedRecord`].
///
/// Column names are resolved to slots once in [`bind`](RowSink::bind).
#[derive(Debug, Clone, Default)]
pub struct NamedRow<R> {
    record: R,
    slots: Vec<Option<usize>>,
}

impl<R: NamedRecord> NamedRow<R> {
    pub fn new(record: R) -> Self {
        Self { record, slots: Vec::new() }
    }

    #[inline]
    pub fn record(&self) -> &R {
        &self.record
    }

    #[inline]
    pub fn record_mut(&mut self) -> &mut R {
        &mut self.record
    }

    pub fn into_record(self) -> R {
        self.record
    }

    #[inline]
    fn slot(&self, column: usize) -> Option<usize> {
        self.slots.get(column).copied().flatten()
    }
}

impl<R: NamedRecord> RowSink for NamedRow<R> {
    fn bind(&mut self, schema: &Schema) -> Result<(), SchemaError> {
        let mut slots = Vec::with_capacity(schema.len());
        for (column, c) in schema.iter().enumerate() {
            if c.ty == ColumnType::Skip {
                slots.push(None);
                continue;
            }
            let name = c.name.as_deref().ok_or(SchemaError::Unnamed { column })?;
            let (slot, stored) = self
                .record
                .resolve(name)
                .ok_or_else(|| SchemaError::UnknownField(name.to_owned()))?;
            if stored != c.ty {
                return Err(SchemaError::TypeMismatch { column, declared: c.ty });
            }
            slots.push(Some(slot));
        }
        self.slots = slots;
        Ok(())
    }

    fn set_int(&mut self, column: usize, value: i64) {
        if let Some(slot) = self.slot(column) {
            self.record.set_int(slot, value);
        }
    }

    fn set_float(&mut self, column: usize, value: f32) {
        if let Some(slot) = self.slot(column) {
            self.record.set_float(slot, value);
        }
    }

    fn set_double(&mut self, column: usize, value: f64) {
        if let Some(slot) = self.slot(column) {
            self.record.set_double(slot, value);
        }
    }

    fn set_string(&mut self, column: usize, value: &str) {
        if let Some(slot) = self.slot(column) {
            self.record.set_string(slot, value);
        }
    }
}
