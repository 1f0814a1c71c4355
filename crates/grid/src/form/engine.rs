use tracing::debug;

use super::section::FormSection;
use super::table::TableSection;
use crate::error::SchemaError;

pub enum Section {
    Form(FormSection),
    Table(TableSection),
}

impl Section {
    pub fn title(&self) -> &str {
        match self {
            Section::Form(s) => &s.title,
            Section::Table(s) => &s.title,
        }
    }
}

impl std::fmt::Debug for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Section::Form(s) => f.debug_tuple("Form").field(s).finish(),
            Section::Table(s) => f.debug_tuple("Table").field(s).finish(),
        }
    }
}

/// Accordion of independent sections. At most one section is expanded; the
/// first one starts open. Submitting one section never touches another.
#[derive(Debug)]
pub struct FormEngine {
    sections: Vec<Section>,
    expanded: Option<usize>,
}

impl FormEngine {
    pub fn new(sections: Vec<Section>) -> Self {
        let expanded = (!sections.is_empty()).then_some(0);
        Self { sections, expanded }
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, idx: usize) -> Option<&Section> {
        self.sections.get(idx)
    }

    pub fn expanded(&self) -> Option<usize> {
        self.expanded
    }

    pub fn is_expanded(&self, idx: usize) -> bool {
        self.expanded == Some(idx)
    }

    /// Open a collapsed section (closing the open one) or close an open one.
    pub fn toggle(&mut self, idx: usize) -> Result<(), SchemaError> {
        self.check(idx)?;
        self.expanded = if self.expanded == Some(idx) {
            None
        } else {
            Some(idx)
        };
        debug!(section = idx, expanded = ?self.expanded, "accordion toggled");
        Ok(())
    }

    pub fn expand(&mut self, idx: usize) -> Result<(), SchemaError> {
        self.check(idx)?;
        self.expanded = Some(idx);
        Ok(())
    }

    pub fn form(&self, idx: usize) -> Result<&FormSection, SchemaError> {
        match self.sections.get(idx) {
            Some(Section::Form(s)) => Ok(s),
            Some(Section::Table(_)) => Err(SchemaError::WrongSection {
                index: idx,
                expected: "form",
            }),
            None => Err(SchemaError::SectionOutOfRange(idx)),
        }
    }

    pub fn form_mut(&mut self, idx: usize) -> Result<&mut FormSection, SchemaError> {
        match self.sections.get_mut(idx) {
            Some(Section::Form(s)) => Ok(s),
            Some(Section::Table(_)) => Err(SchemaError::WrongSection {
                index: idx,
                expected: "form",
            }),
            None => Err(SchemaError::SectionOutOfRange(idx)),
        }
    }

    pub fn table(&self, idx: usize) -> Result<&TableSection, SchemaError> {
        match self.sections.get(idx) {
            Some(Section::Table(s)) => Ok(s),
            Some(Section::Form(_)) => Err(SchemaError::WrongSection {
                index: idx,
                expected: "table",
            }),
            None => Err(SchemaError::SectionOutOfRange(idx)),
        }
    }

    pub fn table_mut(&mut self, idx: usize) -> Result<&mut TableSection, SchemaError> {
        match self.sections.get_mut(idx) {
            Some(Section::Table(s)) => Ok(s),
            Some(Section::Form(_)) => Err(SchemaError::WrongSection {
                index: idx,
                expected: "table",
            }),
            None => Err(SchemaError::SectionOutOfRange(idx)),
        }
    }

    fn check(&self, idx: usize) -> Result<(), SchemaError> {
        if idx < self.sections.len() {
            Ok(())
        } else {
            Err(SchemaError::SectionOutOfRange(idx))
        }
    }
}
