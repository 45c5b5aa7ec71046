//! Header name resolution.

use std::collections::HashMap;

/// Column name to position map for one CSV, built from its header row.
///
/// When a name repeats, the first occurrence wins.
#[derive(Debug, Clone, Default)]
pub struct HeaderIndex {
    positions: HashMap<String, usize>,
    width: usize,
}

impl HeaderIndex {
    /// Builds the index from a parsed header row.
    pub fn build(header: &[String]) -> Self {
        let mut positions = HashMap::with_capacity(header.len());
        for (idx, name) in header.iter().enumerate() {
            positions.entry(name.trim().to_string()).or_insert(idx);
        }
        Self {
            positions,
            width: header.len(),
        }
    }

    /// Position of `name`, or `None` when the header does not contain it.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name.trim()).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Number of fields in the header row.
    pub fn width(&self) -> usize {
        self.width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_position_lookup() {
        let index = HeaderIndex::build(&header(&["Requisition #", "Status", "Net total"]));
        assert_eq!(index.position("Status"), Some(1));
        assert_eq!(index.position(" Net total "), Some(2));
        assert_eq!(index.position("Missing"), None);
        assert_eq!(index.width(), 3);
    }

    #[test]
    fn test_first_duplicate_wins() {
        let index = HeaderIndex::build(&header(&["A", "B", "A"]));
        assert_eq!(index.position("A"), Some(0));
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let index = HeaderIndex::build(&header(&["Status"]));
        assert!(index.contains("Status"));
        assert!(!index.contains("status"));
    }
}
