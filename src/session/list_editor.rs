//! Row editor for list fields
//!
//! The session owns the canonical value of a list field. A [`ListEditor`] is a
//! short-lived view over it: every edit builds the new row list and writes it
//! straight back through [`FormSession::set_value`], so there is never a
//! second copy of the rows to fall out of sync.

use super::controller::FormSession;
use super::error::SessionResult;
use crate::models::FieldValue;
use crate::storage::FormBackend;

pub struct ListEditor<'a, B: FormBackend> {
    session: &'a mut FormSession<B>,
    field_name: String,
    max_items: Option<usize>,
}

impl<'a, B: FormBackend> ListEditor<'a, B> {
    pub(super) fn new(
        session: &'a mut FormSession<B>,
        field_name: &str,
        max_items: Option<usize>,
    ) -> Self {
        Self {
            session,
            field_name: field_name.to_string(),
            max_items,
        }
    }

    /// Current rows, blank rows included
    pub fn rows(&self) -> Vec<String> {
        self.session
            .value(&self.field_name)
            .and_then(FieldValue::as_list)
            .map(<[String]>::to_vec)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.rows().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether another row fits under `maxItems`
    pub fn can_add_row(&self) -> bool {
        self.max_items.is_none_or(|max| self.len() < max)
    }

    /// Append a blank row; returns `false` when the row limit is reached
    pub fn add_row(&mut self) -> SessionResult<bool> {
        if !self.can_add_row() {
            return Ok(false);
        }
        let mut rows = self.rows();
        rows.push(String::new());
        self.write(rows)?;
        Ok(true)
    }

    /// Remove the row at `index`; returns `false` when there is no such row
    pub fn remove_row(&mut self, index: usize) -> SessionResult<bool> {
        let mut rows = self.rows();
        if index >= rows.len() {
            return Ok(false);
        }
        rows.remove(index);
        self.write(rows)?;
        Ok(true)
    }

    /// Replace the text of the row at `index`
    pub fn set_row(&mut self, index: usize, value: impl Into<String>) -> SessionResult<bool> {
        let mut rows = self.rows();
        let Some(row) = rows.get_mut(index) else {
            return Ok(false);
        };
        *row = value.into();
        self.write(rows)?;
        Ok(true)
    }

    fn write(&mut self, rows: Vec<String>) -> SessionResult<()> {
        self.session.set_value(&self.field_name, FieldValue::List(rows))
    }
}
