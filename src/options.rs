use std::ops::Deref;
use std::str::FromStr;

/// Comma separated column names, as accepted on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnList {
    columns: Vec<String>,
}

impl ColumnList {
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.columns
    }
}

impl Deref for ColumnList {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.columns
    }
}

impl FromStr for ColumnList {
    type Err = String;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let columns = spec
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(ToString::to_string)
            .collect::<Vec<_>>();

        if columns.is_empty() {
            return Err("column list cannot be empty".to_string());
        }

        Ok(Self { columns })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SemanticOptions {
    /// One JSON object per row instead of one array per column.
    pub group_by_rows: bool,
    /// Only look for still-unmatched targets in later tables.
    pub update_targets: bool,
    pub debug: bool,
}

impl Default for SemanticOptions {
    fn default() -> Self {
        Self {
            group_by_rows: true,
            update_targets: false,
            debug: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ColumnList, SemanticOptions};
    use std::str::FromStr;

    #[test]
    fn parse_column_list_trims_and_skips_blanks() {
        let list = ColumnList::from_str(" description, qty ,,net_price ").expect("list should parse");
        assert_eq!(&*list, ["description", "qty", "net_price"]);
        assert_eq!(list.into_vec().len(), 3);
    }

    #[test]
    fn reject_empty_column_list() {
        let err = ColumnList::from_str(" , ,").expect_err("blank list should fail");
        assert!(err.contains("cannot be empty"));
    }

    #[test]
    fn semantic_defaults_group_rows() {
        let options = SemanticOptions::default();
        assert!(options.group_by_rows);
        assert!(!options.update_targets);
        assert!(!options.debug);
    }
}
