//! Categorical encoders.
//!
//! An [`Encoder`] is a bijection between the distinct values of one column and
//! dense integer codes `0..len`, assigned in first-seen order. Encoders live in
//! an [`EncoderRegistry`] owned by the dataset and survive across calls, so a
//! column can be encoded incrementally: values already carrying one of the
//! encoder's codes are left alone, unseen values get the next code.
//!
//! Decoding restores the original values as long as encoded cells were not
//! overwritten in between; an overwritten cell decodes to whatever key its new
//! content happens to name, which is not detected.

use crate::row::RowStore;
use crate::value::Value;
use std::collections::HashMap;

/// Mapping between one column's raw values and their codes.
#[derive(Debug, Clone)]
pub struct Encoder {
    column: String,
    keys: Vec<Value>,
    codes: Vec<u32>,
    next_code: u32,
    index: HashMap<Value, usize>,
}

impl Encoder {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            keys: Vec::new(),
            codes: Vec::new(),
            next_code: 0,
            index: HashMap::new(),
        }
    }

    #[must_use]
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Number of distinct values seen so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Original values in code-assignment order.
    #[must_use]
    pub fn keys(&self) -> &[Value] {
        &self.keys
    }

    #[must_use]
    pub fn codes(&self) -> &[u32] {
        &self.codes
    }

    /// Code of a value, if it has been seen.
    #[must_use]
    pub fn code_of(&self, value: &Value) -> Option<u32> {
        self.index.get(value).map(|&i| self.codes[i])
    }

    /// Code of a value, assigning the next code if it is new.
    pub fn encode_value(&mut self, value: &Value) -> u32 {
        if let Some(code) = self.code_of(value) {
            return code;
        }
        let code = self.next_code;
        self.next_code += 1;
        self.index.insert(value.clone(), self.keys.len());
        self.keys.push(value.clone());
        self.codes.push(code);
        code
    }

    /// Original value of a code.
    #[must_use]
    pub fn decode_value(&self, code: u32) -> Option<&Value> {
        self.codes
            .iter()
            .position(|&c| c == code)
            .map(|i| &self.keys[i])
    }

    /// One-hot vector of width [`Encoder::len`] for a code.
    #[must_use]
    pub fn one_hot(&self, code: u32) -> Option<Vec<u8>> {
        let slot = self.codes.iter().position(|&c| c == code)?;
        let mut out = vec![0u8; self.keys.len()];
        out[slot] = 1;
        Some(out)
    }

    fn owns(&self, code: u32) -> bool {
        code < self.next_code
    }

    /// Replace every present value of the column with its code.
    ///
    /// Returns the number of codes newly assigned.
    pub fn encode_rows(&mut self, rows: &mut RowStore) -> usize {
        let before = self.keys.len();
        for row in rows.iter_mut() {
            let Some(cell) = row.get_mut(&self.column) else {
                continue;
            };
            match cell {
                Value::Absent => {}
                Value::Code(c) if self.owns(*c) => {}
                other => {
                    let code = self.encode_value(other);
                    *other = Value::Code(code);
                }
            }
        }
        self.keys.len() - before
    }

    /// Replace every code of the column with its original value.
    ///
    /// Cells that hold no code of this encoder are left untouched.
    pub fn decode_rows(&self, rows: &mut RowStore) {
        for row in rows.iter_mut() {
            if let Some(cell) = row.get_mut(&self.column)
                && let Value::Code(code) = cell
                && let Some(key) = self.decode_value(*code)
            {
                *cell = key.clone();
            }
        }
    }
}

/// All encoders of a dataset, in creation order.
#[derive(Debug, Clone, Default)]
pub struct EncoderRegistry {
    encoders: Vec<Encoder>,
}

impl EncoderRegistry {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            encoders: Vec::new(),
        }
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Encoder> {
        self.encoders.iter().find(|e| e.column == column)
    }

    /// The column's encoder, created empty on first use.
    pub fn entry(&mut self, column: &str) -> &mut Encoder {
        let idx = match self.encoders.iter().position(|e| e.column == column) {
            Some(idx) => idx,
            None => {
                self.encoders.push(Encoder::new(column));
                self.encoders.len() - 1
            }
        };
        &mut self.encoders[idx]
    }

    pub fn remove(&mut self, column: &str) -> Option<Encoder> {
        let idx = self.encoders.iter().position(|e| e.column == column)?;
        Some(self.encoders.remove(idx))
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.encoders.iter().map(Encoder::column)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Encoder> {
        self.encoders.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.encoders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty()
    }
}
