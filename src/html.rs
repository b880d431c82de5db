use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::trace;

use crate::model::{Cell, CellKind, HtmlTable, Row, Section, SectionKind};

static TABLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("table").expect("hardcoded selector 'table' is valid")
});

fn parse_span(element: &ElementRef<'_>, name: &str) -> Option<usize> {
    element
        .value()
        .attr(name)
        .and_then(|value| value.trim().parse::<usize>().ok())
}

fn parse_cell(element: ElementRef<'_>) -> Option<Cell> {
    let kind = match element.value().name() {
        "th" => CellKind::Header,
        "td" => CellKind::Data,
        _ => return None,
    };

    Some(Cell {
        kind,
        text: element.text().collect::<String>(),
        colspan: parse_span(&element, "colspan"),
        rowspan: parse_span(&element, "rowspan"),
    })
}

fn parse_row(element: ElementRef<'_>) -> Row {
    Row::new(
        element
            .children()
            .filter_map(ElementRef::wrap)
            .filter_map(parse_cell)
            .collect(),
    )
}

fn parse_section(element: ElementRef<'_>, kind: SectionKind) -> Section {
    let rows = element
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "tr")
        .map(parse_row)
        .collect();
    Section::new(kind, rows)
}

/// Parses the first `<table>` of an HTML fragment.
///
/// Returns `None` when the fragment holds no table at all. Rows placed
/// directly under `<table>` end up in an implicit `<tbody>`, the way every
/// HTML5 parser treats them.
#[must_use]
pub fn parse_table(html: &str) -> Option<HtmlTable> {
    let fragment = Html::parse_fragment(html);
    let table = fragment.select(&TABLE_SELECTOR).next()?;

    let mut sections = Vec::new();
    for child in table.children().filter_map(ElementRef::wrap) {
        let kind = match child.value().name() {
            "thead" => SectionKind::Head,
            "tbody" => SectionKind::Body,
            "tfoot" => SectionKind::Foot,
            "tr" => {
                sections.push(Section::new(SectionKind::Body, vec![parse_row(child)]));
                continue;
            }
            other => {
                trace!(element = other, "ignoring non-row table child");
                continue;
            }
        };
        sections.push(parse_section(child, kind));
    }

    Some(HtmlTable::new(sections))
}

fn write_cell(out: &mut String, cell: &Cell) {
    let tag = cell.kind.tag();
    out.push('<');
    out.push_str(tag);
    if let Some(colspan) = cell.colspan {
        out.push_str(&format!(" colspan=\"{colspan}\""));
    }
    if let Some(rowspan) = cell.rowspan {
        out.push_str(&format!(" rowspan=\"{rowspan}\""));
    }
    out.push('>');
    out.push_str(&html_escape::encode_text(&cell.text));
    out.push_str(&format!("</{tag}>"));
}

impl HtmlTable {
    /// Renders the table back to HTML. Only span attributes survive.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::from("<table>");
        for section in &self.sections {
            let tag = section.kind.tag();
            out.push_str(&format!("<{tag}>"));
            for row in &section.rows {
                out.push_str("<tr>");
                for cell in &row.cells {
                    write_cell(&mut out, cell);
                }
                out.push_str("</tr>");
            }
            out.push_str(&format!("</{tag}>"));
        }
        out.push_str("</table>");
        out
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::parse_table;
    use crate::model::{CellKind, SectionKind};

    #[test]
    fn parses_sections_rows_and_spans() {
        let table = parse_table(
            r#"<p>intro</p><table>
                <thead><tr><th colspan="2">Amount</th></tr></thead>
                <thead><tr><th>Net</th><th>Gross</th></tr></thead>
                <tbody><tr><td rowspan="2">A</td><td>1</td></tr></tbody>
            </table>"#,
        )
        .expect("table should parse");

        let kinds = table
            .sections
            .iter()
            .map(|section| section.kind)
            .collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![SectionKind::Head, SectionKind::Head, SectionKind::Body]
        );
        assert_eq!(table.sections[0].rows[0].cells[0].colspan, Some(2));
        assert_eq!(table.sections[2].rows[0].cells[0].rowspan, Some(2));
        assert_eq!(table.sections[2].rows[0].cells[1].kind, CellKind::Data);
    }

    #[test]
    fn bare_rows_land_in_a_body_section() {
        let table = parse_table("<table><tr><td>x</td></tr></table>").expect("table");
        assert_eq!(table.sections.len(), 1);
        assert_eq!(table.sections[0].kind, SectionKind::Body);
        assert_eq!(table.sections[0].rows[0].cells[0].text, "x");
    }

    #[test]
    fn returns_none_without_table() {
        assert!(parse_table("<div>no table</div>").is_none());
    }

    #[test]
    fn renders_escaped_text_and_spans() {
        let table = parse_table(
            "<table><thead><tr><th colspan=\"2\">P&amp;L</th></tr></thead>\
             <tbody><tr><td>a &lt; b</td><td>2</td></tr></tbody></table>",
        )
        .expect("table");

        assert_eq!(
            table.to_html(),
            "<table><thead><tr><th colspan=\"2\">P&amp;L</th></tr></thead>\
             <tbody><tr><td>a &lt; b</td><td>2</td></tr></tbody></table>"
        );
    }

    #[test]
    fn unparseable_span_is_ignored() {
        let table = parse_table("<table><tr><td colspan=\"wide\">x</td></tr></table>")
            .expect("table");
        assert_eq!(table.sections[0].rows[0].cells[0].colspan, None);
    }
}
