//! Projection of data rows onto the report layout.

use reqview_model::ColumnSpec;

use crate::csv::HeaderIndex;

/// Required columns resolved against one CSV header.
///
/// Resolution happens once per upload; applying it to a row never fails.
/// Columns the header lacks, and positions past the end of a short row,
/// project to an empty string.
#[derive(Debug, Clone)]
pub struct Projection {
    sources: Vec<Option<usize>>,
}

impl Projection {
    pub fn resolve(index: &HeaderIndex, spec: &ColumnSpec) -> Self {
        let sources = spec
            .columns()
            .iter()
            .map(|column| index.position(&column.source))
            .collect();
        Self { sources }
    }

    /// Output width, equal to the number of required columns.
    pub fn width(&self) -> usize {
        self.sources.len()
    }

    /// Source headers from `spec` that the CSV header did not contain.
    pub fn missing_sources<'a>(&self, spec: &'a ColumnSpec) -> Vec<&'a str> {
        spec.columns()
            .iter()
            .zip(&self.sources)
            .filter(|(_, source)| source.is_none())
            .map(|(column, _)| column.source.as_str())
            .collect()
    }

    pub fn apply(&self, row: &[String]) -> Vec<String> {
        self.sources
            .iter()
            .map(|source| {
                source
                    .and_then(|idx| row.get(idx))
                    .cloned()
                    .unwrap_or_default()
            })
            .collect()
    }
}

/// Projects a single row; see [`Projection`] for the padding rules.
pub fn project_row(row: &[String], index: &HeaderIndex, spec: &ColumnSpec) -> Vec<String> {
    Projection::resolve(index, spec).apply(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqview_model::RequiredColumn;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| (*s).to_string()).collect()
    }

    fn spec() -> ColumnSpec {
        ColumnSpec::new(vec![
            RequiredColumn::same("C"),
            RequiredColumn::same("A"),
            RequiredColumn::new("Id", "Source Id"),
            RequiredColumn::same("Absent"),
        ])
    }

    #[test]
    fn test_reorders_and_renames() {
        let index = HeaderIndex::build(&strings(&["A", "B", "C", "Source Id"]));
        let row = strings(&["a", "b", "c", "X-1"]);
        assert_eq!(project_row(&row, &index, &spec()), vec!["c", "a", "X-1", ""]);
    }

    #[test]
    fn test_short_row_pads_with_empty() {
        let index = HeaderIndex::build(&strings(&["A", "B", "C", "Source Id"]));
        let row = strings(&["a"]);
        assert_eq!(project_row(&row, &index, &spec()), vec!["", "a", "", ""]);
    }

    #[test]
    fn test_missing_sources_reported() {
        let spec = spec();
        let index = HeaderIndex::build(&strings(&["A"]));
        let projection = Projection::resolve(&index, &spec);
        assert_eq!(projection.missing_sources(&spec), vec!["C", "Source Id", "Absent"]);
        assert_eq!(projection.width(), 4);
    }

    #[test]
    fn test_values_are_not_reformatted() {
        let spec = ColumnSpec::new(vec![RequiredColumn::same("Id")]);
        let index = HeaderIndex::build(&strings(&["Id"]));
        let row = strings(&["000123-ABC/7"]);
        assert_eq!(project_row(&row, &index, &spec), vec!["000123-ABC/7"]);
    }
}
