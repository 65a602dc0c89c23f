//! Search Filter
//! Case-folded substring matching over listing names, tolerant of spacing
//! differences ("위닝 글러브" matches "위닝글러브").

use crate::models::ListingSummary;

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Does `name` match the free-text `query`?
///
/// Two checks are OR-ed: a plain case-folded substring match, and a
/// whitespace-stripped match so queries and names that differ only in
/// spacing still hit. An empty query matches everything.
pub fn matches_query(name: &str, query: &str) -> bool {
    let raw_query = query.to_lowercase().trim().to_string();
    if raw_query.is_empty() {
        return true;
    }
    let name = name.to_lowercase();

    if name.contains(&raw_query) {
        return true;
    }
    strip_whitespace(&name).contains(&strip_whitespace(&raw_query))
}

/// Apply the query to a listing collection. `filtered ⊆ items` always,
/// and the empty query is the identity.
pub fn filter_by_query(items: Vec<ListingSummary>, query: &str) -> Vec<ListingSummary> {
    if query.trim().is_empty() {
        return items;
    }
    items
        .into_iter()
        .filter(|item| matches_query(&item.name, query))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str) -> ListingSummary {
        ListingSummary {
            id: "id".to_string(),
            name: name.to_string(),
            price: 0.0,
            image_url: String::new(),
            description: String::new(),
        }
    }

    #[test]
    fn empty_query_returns_everything() {
        let items = vec![item("a"), item("b")];
        let filtered = filter_by_query(items.clone(), "");
        assert_eq!(filtered.len(), items.len());
    }

    #[test]
    fn match_is_case_insensitive_substring() {
        assert!(matches_query("Winning Glove", "glove"));
        assert!(matches_query("Winning Glove", "WINNING"));
        assert!(!matches_query("Winning Glove", "bat"));
    }

    #[test]
    fn spacing_differences_are_tolerated() {
        // query with a space, stored name without
        assert!(matches_query("위닝글러브", "위닝 글러브"));
        // and the other way round
        assert!(matches_query("위닝 글러브", "위닝글러브"));
    }

    #[test]
    fn filtered_is_a_subset_of_items() {
        let items = vec![item("Winning Glove"), item("Old Bat"), item("glove box")];
        let filtered = filter_by_query(items, "glove");
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|i| i.name.to_lowercase().contains("glove")));
    }
}
