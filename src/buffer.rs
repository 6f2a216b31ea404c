use crate::error::{JunctionError, Result};
use serde::Deserialize;
use std::io::Read;

/// Where the product lands on the template: `top_offset` is the row of the
/// product's top edge, `target_height` its height after resizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub top_offset: i64,
    pub target_height: u32,
}

impl Placement {
    /// Manual override from the "advanced setting" controls.
    pub fn manual(buffer1: i64, buffer2: i64) -> Result<Self> {
        Self::from_buffers("(advanced setting)", buffer1 as f64, buffer2 as f64)
    }

    fn from_buffers(product: &str, buffer1: f64, buffer2: f64) -> Result<Self> {
        let target_height = buffer2.trunc();
        if target_height < 1.0 {
            return Err(JunctionError::InvalidPlacement {
                product: product.to_string(),
            });
        }
        Ok(Self {
            top_offset: buffer1.trunc() as i64,
            target_height: target_height as u32,
        })
    }
}

#[derive(Debug, Deserialize)]
struct BufferRow {
    product: String,
    buffer1: f64,
    buffer2: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BufferEntry {
    pub product: String,
    pub buffer1: f64,
    pub buffer2: f64,
}

/// Per-platform table of `product,buffer1,buffer2` rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BufferTable {
    entries: Vec<BufferEntry>,
}

impl BufferTable {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let mut entries = Vec::new();
        for row in csv_reader.deserialize::<BufferRow>() {
            let row = row?;
            entries.push(BufferEntry {
                product: row.product,
                buffer1: row.buffer1,
                buffer2: row.buffer2,
            });
        }
        Ok(Self { entries })
    }

    pub fn parse(text: &str) -> Result<Self> {
        Self::from_reader(text.as_bytes())
    }

    pub fn entries(&self) -> &[BufferEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn products(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.product.as_str()).collect()
    }

    /// First row for `product` wins if the table repeats it.
    pub fn lookup(&self, product: &str) -> Result<Placement> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.product == product)
            .ok_or_else(|| JunctionError::UnknownProduct(product.to_string()))?;
        Placement::from_buffers(product, entry.buffer1, entry.buffer2)
    }
}
