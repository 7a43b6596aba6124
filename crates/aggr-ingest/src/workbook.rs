use crate::sheet::RawSheet;

/// An ordered set of named sheets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Workbook {
    sheets: Vec<RawSheet>,
}

impl Workbook {
    pub fn new(sheets: Vec<RawSheet>) -> Self {
        Self { sheets }
    }

    pub fn sheets(&self) -> &[RawSheet] {
        &self.sheets
    }

    pub fn into_sheets(self) -> Vec<RawSheet> {
        self.sheets
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// Looks a sheet up by exact name.
    pub fn sheet(&self, name: &str) -> Option<&RawSheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn push(&mut self, sheet: RawSheet) {
        self.sheets.push(sheet);
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

impl FromIterator<RawSheet> for Workbook {
    fn from_iter<T: IntoIterator<Item = RawSheet>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
