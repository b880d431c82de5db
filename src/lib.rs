mod convert;
mod embedding;
mod error;
mod extract;
mod header;
mod html;
mod junk;
mod layout;
mod matching;
mod model;
mod options;
mod pipeline;
mod rowspan;
mod schema;
mod semantic;
mod templates;
mod warning;

pub use convert::{CellValue, convert_value};
pub use embedding::{Embedder, LexicalEmbedder, cosine_similarity, similarity_matrix};
pub use error::TableError;
pub use extract::{
    EmptyReason, ExtractedItem, ExtractionReport, ExtractionResult, TableExtraction,
    extract_table_with_report, fetch_table_data,
};
pub use header::{
    clean_html_table_header_names, merge_table_header_thead, update_table_header_colspan,
};
pub use html::parse_table;
pub use junk::{
    ColumnScore, JUNK_SIMILARITY_THRESHOLD, detect_and_remove_junk_columns, score_columns,
};
pub use layout::{merge_colspan_columns, normalize_html_table};
pub use matching::{
    COLUMN_MATCH_THRESHOLD, ColumnMatch, SUBSTRING_SCORE, best_column_match,
    find_best_column_match, normalize_text,
};
pub use model::{Cell, CellKind, HtmlTable, Row, Section, SectionKind};
pub use options::{ColumnList, SemanticOptions};
pub use pipeline::{merge_html_table_headers, normalize_table};
pub use rowspan::{fix_rowspan_elements, merge_rows_with_rowspan};
pub use schema::{FieldSpec, FieldType, parse_query_structure};
pub use semantic::{
    ColumnAssignment, SemanticExtractor, SimilarityAssignment, TARGET_SIMILARITY_THRESHOLD,
    extract_columns_from_table,
};
pub use templates::{GENERIC_TABLE, TemplateFn, TemplateRegistry};
pub use warning::{ExtractWarning, WarningCode};
