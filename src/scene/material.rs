//! Material catalog loaded from a `<id>=<name>` text list

use std::collections::BTreeMap;
use std::io::{BufRead, BufReader};
use std::num::NonZeroU16;
use std::path::Path;

use crate::core::error::MaterialError;

/// File extension for material lists (by convention only)
pub const MATERIAL_EXTENSION: &str = "amt";

/// Advisory id -> display name mapping used to label models
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MaterialCatalog {
    entries: BTreeMap<u16, String>,
}

impl MaterialCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a material list.
    ///
    /// Whitespace anywhere in a line is removed before splitting on the first
    /// `=`. Blank lines are skipped; a repeated id replaces the earlier name.
    pub fn parse(text: &str) -> Result<Self, MaterialError> {
        let mut catalog = Self::new();
        for (i, line) in text.lines().enumerate() {
            catalog.parse_line(i + 1, line)?;
        }
        Ok(catalog)
    }

    /// Read a material list from any buffered reader
    pub fn read_from(reader: impl BufRead) -> Result<Self, MaterialError> {
        let mut catalog = Self::new();
        for (i, line) in reader.lines().enumerate() {
            catalog.parse_line(i + 1, &line?)?;
        }
        Ok(catalog)
    }

    /// Load a material list file
    pub fn load_file(path: &Path) -> Result<Self, MaterialError> {
        let catalog = Self::read_from(BufReader::new(std::fs::File::open(path)?))?;
        log::info!("Loaded {} materials from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    fn parse_line(&mut self, line_no: usize, line: &str) -> Result<(), MaterialError> {
        let compact: String = line.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            return Ok(());
        }

        let Some((id, name)) = compact.split_once('=') else {
            return Err(MaterialError::MalformedLine { line: line_no, text: line.to_string() });
        };

        let id = id
            .parse::<NonZeroU16>()
            .map_err(|_| MaterialError::InvalidId { line: line_no, value: id.to_string() })?;

        if self.entries.insert(id.get(), name.to_string()).is_some() {
            log::warn!("Material id {} redefined on line {}", id, line_no);
        }
        Ok(())
    }

    /// Add or replace an entry
    pub fn insert(&mut self, id: NonZeroU16, name: impl Into<String>) {
        self.entries.insert(id.get(), name.into());
    }

    pub fn name(&self, id: u16) -> Option<&str> {
        self.entries.get(&id).map(String::as_str)
    }

    pub fn contains(&self, id: u16) -> bool {
        self.entries.contains_key(&id)
    }

    /// Check that an id names a catalog entry before assigning it to a model
    pub fn resolve(&self, id: u16) -> Result<NonZeroU16, MaterialError> {
        NonZeroU16::new(id)
            .filter(|id| self.contains(id.get()))
            .ok_or(MaterialError::UnknownId(id))
    }

    /// UI label `"<id> (<name>)"`, or the bare id when unknown
    pub fn label(&self, id: u16) -> String {
        match self.name(id) {
            Some(name) => format!("{} ({})", id, name),
            None => id.to_string(),
        }
    }

    /// Entries in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = (u16, &str)> {
        self.entries.iter().map(|(id, name)| (*id, name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
