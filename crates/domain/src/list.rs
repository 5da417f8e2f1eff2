use std::cmp::Ordering;
use std::slice::Iter;

use chrono::DateTime;

use crate::ListItem;

/// Catalog list orderings, selectable in the sidebar.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SortOrder {
    #[default]
    Name,
    CreatedAt,
    HasImage,
    MissingImage,
}

impl SortOrder {
    pub fn iter() -> Iter<'static, SortOrder> {
        static SORT_ORDERS: [SortOrder; 4] = [
            SortOrder::Name,
            SortOrder::CreatedAt,
            SortOrder::HasImage,
            SortOrder::MissingImage,
        ];
        SORT_ORDERS.iter()
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            SortOrder::Name => "Name",
            SortOrder::CreatedAt => "Created at",
            SortOrder::HasImage => "Has image",
            SortOrder::MissingImage => "Missing image",
        }
    }

    fn compare(self, a: &ListItem, b: &ListItem) -> Ordering {
        match self {
            SortOrder::Name => compare_by_name(a, b),
            SortOrder::CreatedAt => created_at_stamp(b)
                .cmp(&created_at_stamp(a))
                .then_with(|| compare_by_name(a, b)),
            SortOrder::HasImage => has_image(b)
                .cmp(&has_image(a))
                .then_with(|| compare_by_name(a, b)),
            SortOrder::MissingImage => has_image(a)
                .cmp(&has_image(b))
                .then_with(|| compare_by_name(a, b)),
        }
    }
}

/// Search text plus sort order; applying it to the fetched list yields the
/// rows the sidebar renders.
#[derive(Clone, Debug, Default)]
pub struct ListFilter {
    pub search: String,
    pub order: SortOrder,
}

impl ListFilter {
    #[must_use]
    pub fn apply(&self, items: &[ListItem]) -> Vec<ListItem> {
        let query = self.search.trim().to_lowercase();

        let mut filtered: Vec<ListItem> = items
            .iter()
            .filter(|item| {
                query.is_empty() || item.entity.name.to_lowercase().contains(&query)
            })
            .cloned()
            .collect();

        filtered.sort_by(|a, b| self.order.compare(a, b));
        filtered
    }
}

fn compare_by_name(a: &ListItem, b: &ListItem) -> Ordering {
    let name_a = a.entity.name.trim().to_lowercase();
    let name_b = b.entity.name.trim().to_lowercase();

    name_a
        .cmp(&name_b)
        .then_with(|| a.entity.id.cmp(&b.entity.id))
}

/// Millisecond timestamp of the record's creation; unparsable or missing
/// dates sort last under newest-first ordering.
fn created_at_stamp(item: &ListItem) -> i64 {
    item.entity
        .created_at
        .as_deref()
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map_or(0, |moment| moment.timestamp_millis())
}

fn has_image(item: &ListItem) -> bool {
    !item.entity.image_url.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::Entity;

    fn item(id: &str, name: &str, created_at: Option<&str>, image_url: &str) -> ListItem {
        ListItem {
            entity: Entity {
                id: id.to_string(),
                name: name.to_string(),
                image_url: image_url.to_string(),
                created_at: created_at.map(str::to_string),
                ..Entity::default()
            },
            usage_count: 0,
            last_used: None,
        }
    }

    fn items() -> Vec<ListItem> {
        vec![
            item("e-3", "Squat", Some("2024-03-01T10:00:00Z"), ""),
            item("e-1", "bench press", Some("2024-05-01T10:00:00Z"), "https://img/1"),
            item("e-2", "Deadlift", None, "https://img/2"),
        ]
    }

    fn ids(items: &[ListItem]) -> Vec<&str> {
        items.iter().map(|item| item.entity.id.as_str()).collect()
    }

    #[test]
    fn test_name_order_is_case_insensitive() {
        let filter = ListFilter::default();

        assert_eq!(ids(&filter.apply(&items())), vec!["e-1", "e-2", "e-3"]);
    }

    #[test]
    fn test_name_order_breaks_ties_by_id() {
        let rows = vec![item("e-2", "Squat", None, ""), item("e-1", "Squat", None, "")];
        let filter = ListFilter::default();

        assert_eq!(ids(&filter.apply(&rows)), vec!["e-1", "e-2"]);
    }

    #[test]
    fn test_created_at_newest_first() {
        let filter = ListFilter {
            order: SortOrder::CreatedAt,
            ..ListFilter::default()
        };

        assert_eq!(ids(&filter.apply(&items())), vec!["e-1", "e-3", "e-2"]);
    }

    #[test]
    fn test_image_orderings() {
        let with_images_first = ListFilter {
            order: SortOrder::HasImage,
            ..ListFilter::default()
        };
        let without_images_first = ListFilter {
            order: SortOrder::MissingImage,
            ..ListFilter::default()
        };

        assert_eq!(ids(&with_images_first.apply(&items())), vec!["e-1", "e-2", "e-3"]);
        assert_eq!(ids(&without_images_first.apply(&items())), vec!["e-3", "e-1", "e-2"]);
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let filter = ListFilter {
            search: "  PRESS ".to_string(),
            ..ListFilter::default()
        };

        assert_eq!(ids(&filter.apply(&items())), vec!["e-1"]);
    }

    #[test]
    fn test_blank_search_keeps_everything() {
        let filter = ListFilter {
            search: "   ".to_string(),
            ..ListFilter::default()
        };

        assert_eq!(filter.apply(&items()).len(), 3);
    }
}
