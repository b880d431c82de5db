#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Head,
    Body,
    Foot,
}

impl SectionKind {
    pub(crate) const fn tag(self) -> &'static str {
        match self {
            Self::Head => "thead",
            Self::Body => "tbody",
            Self::Foot => "tfoot",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Header,
    Data,
}

impl CellKind {
    pub(crate) const fn tag(self) -> &'static str {
        match self {
            Self::Header => "th",
            Self::Data => "td",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub kind: CellKind,
    pub text: String,
    pub colspan: Option<usize>,
    pub rowspan: Option<usize>,
}

impl Cell {
    #[must_use]
    pub fn new(kind: CellKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            colspan: None,
            rowspan: None,
        }
    }

    #[must_use]
    pub fn header(text: impl Into<String>) -> Self {
        Self::new(CellKind::Header, text)
    }

    #[must_use]
    pub fn data(text: impl Into<String>) -> Self {
        Self::new(CellKind::Data, text)
    }

    #[must_use]
    pub fn empty(kind: CellKind) -> Self {
        Self::new(kind, String::new())
    }

    #[must_use]
    pub fn with_colspan(mut self, colspan: usize) -> Self {
        self.colspan = Some(colspan);
        self
    }

    #[must_use]
    pub fn with_rowspan(mut self, rowspan: usize) -> Self {
        self.rowspan = Some(rowspan);
        self
    }

    #[must_use]
    pub fn trimmed(&self) -> &str {
        self.text.trim()
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub(crate) fn span_width(&self) -> usize {
        self.colspan.unwrap_or(1).max(1)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub cells: Vec<Cell>,
}

impl Row {
    #[must_use]
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    #[must_use]
    pub fn has_data_cells(&self) -> bool {
        self.cells.iter().any(|cell| cell.kind == CellKind::Data)
    }

    #[must_use]
    pub fn has_header_cells(&self) -> bool {
        self.cells.iter().any(|cell| cell.kind == CellKind::Header)
    }

    /// Data cells only, in row order.
    pub fn data_cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(|cell| cell.kind == CellKind::Data)
    }

    pub fn data_cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.cells
            .iter_mut()
            .filter(|cell| cell.kind == CellKind::Data)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub kind: SectionKind,
    pub rows: Vec<Row>,
}

impl Section {
    #[must_use]
    pub fn new(kind: SectionKind, rows: Vec<Row>) -> Self {
        Self { kind, rows }
    }

    pub fn header_cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.rows
            .iter_mut()
            .flat_map(|row| row.cells.iter_mut())
            .filter(|cell| cell.kind == CellKind::Header)
    }

    pub fn header_cells(&self) -> impl Iterator<Item = &Cell> {
        self.rows
            .iter()
            .flat_map(|row| row.cells.iter())
            .filter(|cell| cell.kind == CellKind::Header)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlTable {
    pub sections: Vec<Section>,
}

impl HtmlTable {
    #[must_use]
    pub fn new(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    #[must_use]
    pub fn head_count(&self) -> usize {
        self.heads().count()
    }

    pub fn heads(&self) -> impl Iterator<Item = &Section> {
        self.sections
            .iter()
            .filter(|section| section.kind == SectionKind::Head)
    }

    #[must_use]
    pub fn first_head(&self) -> Option<&Section> {
        self.heads().next()
    }

    #[must_use]
    pub fn first_body(&self) -> Option<&Section> {
        self.sections
            .iter()
            .find(|section| section.kind == SectionKind::Body)
    }

    /// Every row of the table in document order, header rows included.
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.sections.iter().flat_map(|section| section.rows.iter())
    }

    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut Row> {
        self.sections
            .iter_mut()
            .flat_map(|section| section.rows.iter_mut())
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.sections.iter().map(|section| section.rows.len()).sum()
    }

    pub(crate) fn row_at_mut(&mut self, index: usize) -> Option<&mut Row> {
        self.rows_mut().nth(index)
    }

    /// Text of every `<th>` cell in the table, in document order.
    #[must_use]
    pub fn header_texts(&self) -> Vec<String> {
        self.sections
            .iter()
            .flat_map(Section::header_cells)
            .map(|cell| cell.text.clone())
            .collect()
    }
}
