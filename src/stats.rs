// Dashboard aggregate

use crate::store::Store;
use serde::{Serialize, Serializer};

/// Retention is not tracked anywhere yet, the dashboard shows a fixed figure
pub const RETENTION: &str = "92%";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Members whose status is "active", ignoring case. A missing, empty or
    /// non-string status (`null`, a number) counts as active. Entries that are
    /// not objects are not members and are skipped.
    pub active_members: usize,

    /// Sum of `amount` over invoices with status exactly "paid"
    #[serde(serialize_with = "whole_as_integer")]
    pub revenue: f64,
}

impl DashboardStats {
    pub fn compute(store: &Store) -> Self {
        let active_members = store
            .members
            .iter()
            .filter(|m| m.is_object())
            .filter(|m| {
                let status = m.get_str("status").filter(|s| !s.is_empty());
                status.unwrap_or("active").to_lowercase() == "active"
            })
            .count();

        let revenue: f64 = store
            .invoices
            .iter()
            .filter(|i| i.get_str("status") == Some("paid"))
            .map(|i| i.get("amount").and_then(|a| a.as_f64()).unwrap_or(0.0))
            .sum();

        DashboardStats {
            active_members,
            revenue,
        }
    }
}

/// 50.0 goes out as `50`, 49.5 stays `49.5`
fn whole_as_integer<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Entity;
    use serde_json::json;

    fn store_with(members: Vec<Entity>, invoices: Vec<Entity>) -> Store {
        Store {
            members,
            invoices,
            ..Store::default()
        }
    }

    #[test]
    fn test_active_members_default_and_case() {
        let store = store_with(
            vec![
                Entity::new().with("status", "active"),
                Entity::new().with("status", "Inactive"),
                Entity::new(),
                Entity::new().with("status", "ACTIVE"),
                Entity::new().with("status", ""),
            ],
            vec![],
        );

        assert_eq!(DashboardStats::compute(&store).active_members, 4);
    }

    #[test]
    fn test_non_string_status_counts_as_active() {
        let store = store_with(
            vec![
                Entity::new().with("status", serde_json::Value::Null),
                Entity::new().with("status", 1),
                Entity::new().with("status", "inactive"),
            ],
            vec![],
        );

        assert_eq!(DashboardStats::compute(&store).active_members, 2);
    }

    #[test]
    fn test_non_object_member_entries_are_skipped() {
        let store = Store::from_value(json!({ "members": ["walk-in", 3, { "status": "active" }] }))
            .unwrap();
        assert_eq!(DashboardStats::compute(&store).active_members, 1);
    }

    #[test]
    fn test_revenue_counts_paid_only() {
        let store = store_with(
            vec![],
            vec![
                Entity::new().with("status", "paid").with("amount", 50),
                Entity::new().with("status", "pending").with("amount", 30),
                Entity::new().with("status", "Paid").with("amount", 20),
                Entity::new().with("status", "paid"),
                Entity::new().with("status", "paid").with("amount", "12"),
            ],
        );

        assert_eq!(DashboardStats::compute(&store).revenue, 50.0);
    }

    #[test]
    fn test_serialized_shape() {
        let stats = DashboardStats {
            active_members: 2,
            revenue: 50.0,
        };
        assert_eq!(
            serde_json::to_value(&stats).unwrap(),
            json!({ "activeMembers": 2, "revenue": 50 })
        );

        let fractional = DashboardStats {
            active_members: 0,
            revenue: 12.5,
        };
        assert_eq!(serde_json::to_value(&fractional).unwrap()["revenue"], json!(12.5));
    }

    #[test]
    fn test_empty_store() {
        let stats = DashboardStats::compute(&Store::default());
        assert_eq!(stats.active_members, 0);
        assert_eq!(stats.revenue, 0.0);
    }
}
