//! SeaORM entities and their domain conversions.

pub mod post;
pub mod provider;
pub mod search_keyword;
pub mod user;

/// List columns are stored as a comma-joined string.
pub(crate) fn join_list(items: &[String]) -> String {
    items.join(",")
}

pub(crate) fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_columns() {
        let items = vec!["twitter".to_string(), "instagram".to_string()];
        assert_eq!(join_list(&items), "twitter,instagram");
        assert_eq!(split_list("twitter, instagram,"), items);
        assert!(split_list("").is_empty());
    }
}
