//! List rows and paginated list results

use crate::value::Value;

/// One row of a device list
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListRow {
    /// 0-based position of this row within the device's full list
    pub index: usize,
    /// The `key` attribute the device attached to the row, if any
    ///
    /// Keys identify entries for follow-up calls (e.g. selecting a mode by
    /// key) and need not match `index`.
    pub key: Option<String>,
    /// Named fields in device order
    pub fields: Vec<(String, Value)>,
}

impl ListRow {
    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field_name, _)| field_name == name)
            .map(|(_, value)| value)
    }
}

/// Outcome of a (possibly multi-page) list retrieval
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListResult {
    /// Contiguous rows starting at the requested offset, in device order
    pub rows: Vec<ListRow>,
    /// Total list size, if the device reported one
    pub total_count: Option<usize>,
    /// Whether the device has no rows beyond the last one returned
    pub end_of_list: bool,
}

impl ListResult {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ListRow> {
        self.rows.iter()
    }

    /// Offset at which a follow-up retrieval should start
    pub fn next_offset(&self) -> Option<usize> {
        self.rows.last().map(|row| row.index.saturating_add(1))
    }
}

impl IntoIterator for ListResult {
    type Item = ListRow;
    type IntoIter = std::vec::IntoIter<ListRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

/// Parameters for a list retrieval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    /// Position of the first row wanted
    pub start_offset: usize,
    /// Rows requested per page
    pub page_size: usize,
    /// Stop once this many rows are collected; `None` reads to the end
    pub limit: Option<usize>,
}

impl ListQuery {
    /// Read everything from `start_offset` in pages of `page_size`
    pub fn new(start_offset: usize, page_size: usize) -> Self {
        Self {
            start_offset,
            page_size,
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}
