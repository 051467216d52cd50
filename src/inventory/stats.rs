use serde::Serialize;

use crate::backend::contains_ignore_case;
use crate::models::Part;

/// How many of the newest parts the dashboard shows.
pub const RECENT_PARTS_LIMIT: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_parts: usize,
    pub low_stock_count: usize,
    pub recent_parts: Vec<Part>,
}

impl DashboardStats {
    /// `parts` must already be ordered newest first.
    pub fn from_parts(parts: &[Part]) -> Self {
        Self {
            total_parts: parts.len(),
            low_stock_count: parts.iter().filter(|p| p.is_low_stock()).count(),
            recent_parts: parts.iter().take(RECENT_PARTS_LIMIT).cloned().collect(),
        }
    }
}

/// Inventory table filter: case-insensitive substring of `part_id` or `name`.
/// An empty term keeps every row.
pub fn filter_parts(parts: Vec<Part>, term: &str) -> Vec<Part> {
    let term = term.trim();
    if term.is_empty() {
        return parts;
    }
    parts
        .into_iter()
        .filter(|p| contains_ignore_case(&p.part_id, term) || contains_ignore_case(&p.name, term))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn part(part_id: &str, name: &str, quantity: u32) -> Part {
        Part {
            id: uuid::Uuid::new_v4().to_string(),
            part_id: part_id.to_string(),
            name: name.to_string(),
            quantity,
            price: 1.0,
            image_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            user_id: "user-1".to_string(),
        }
    }

    #[test]
    fn test_dashboard_stats() {
        let parts: Vec<Part> = (0..7)
            .map(|i| part(&format!("P-{}", i), "Filter", i))
            .collect();
        let stats = DashboardStats::from_parts(&parts);

        assert_eq!(stats.total_parts, 7);
        // quantities 0..=4 are below the threshold
        assert_eq!(stats.low_stock_count, 5);
        assert_eq!(stats.recent_parts.len(), 5);
        assert_eq!(stats.recent_parts[0].part_id, "P-0");
    }

    #[test]
    fn test_dashboard_stats_empty() {
        let stats = DashboardStats::from_parts(&[]);
        assert_eq!(stats.total_parts, 0);
        assert_eq!(stats.low_stock_count, 0);
        assert!(stats.recent_parts.is_empty());
    }

    #[test]
    fn test_filter_parts() {
        let parts = vec![
            part("BRK-001", "Brake Pad", 3),
            part("OIL-010", "Oil Filter", 9),
            part("AIR-002", "Air filter", 1),
        ];

        let brake = filter_parts(parts.clone(), "brk");
        assert_eq!(brake.len(), 1);

        let filters = filter_parts(parts.clone(), "FILTER");
        assert_eq!(filters.len(), 2);

        assert_eq!(filter_parts(parts.clone(), "  ").len(), 3);
        assert!(filter_parts(parts, "zzz").is_empty());
    }
}
