pub mod queries;

use std::collections::{HashMap, HashSet};

use serde::Deserialize;

// MODELS

/// One requested count: a caller-facing label plus the entity tag to count.
/// Order within a spec defines the response order.
#[derive(Debug, Clone, Deserialize)]
pub struct CountEntry {
    pub label: String,
    pub entity: String,
}

/// A resolved label→count pair, in response order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTotal {
    pub label: String,
    pub total: i64,
}

/// Maps stable entity tags to the tables backing them. Populated once at
/// startup; registration order doubles as the default reporting order. A tag
/// is either registered or unknown, nothing is inferred at runtime.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    entries: Vec<EntityDef>,
}

#[derive(Debug, Clone)]
struct EntityDef {
    tag: String,
    table: String,
    label: String,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn register(&mut self, tag: &str, table: &str, label: &str) {
        self.entries.push(EntityDef {
            tag: tag.to_string(),
            table: table.to_string(),
            label: label.to_string(),
        });
    }

    /// Backing table for a tag, if registered.
    pub fn resolve(&self, tag: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.tag == tag)
            .map(|e| e.table.as_str())
    }

    /// The default spec: every registered entity under its default label, in
    /// registration order.
    pub fn default_entries(&self) -> Vec<CountEntry> {
        self.entries
            .iter()
            .map(|e| CountEntry {
                label: e.label.clone(),
                entity: e.tag.clone(),
            })
            .collect()
    }
}

// HELPER FUNCTIONS

/// Reject specs no query should be built for. Labels are the join key
/// between raw results and the response, so they must be unique.
pub fn validate_entries(entries: &[CountEntry]) -> Result<(), String> {
    let mut seen = HashSet::new();

    for entry in entries {
        if entry.label.trim().is_empty() {
            return Err("Labels cannot be empty".to_string());
        }
        if !seen.insert(entry.label.as_str()) {
            return Err(format!("Duplicate label '{}' in aggregation spec", entry.label));
        }
    }

    Ok(())
}

/// Resolve every entry against the registry, preserving order. An unknown
/// tag is a caller error reported before any SQL exists.
pub fn resolve_entries(
    registry: &EntityRegistry,
    entries: &[CountEntry],
) -> Result<Vec<(String, String)>, String> {
    entries
        .iter()
        .map(|entry| match registry.resolve(&entry.entity) {
            Some(table) => Ok((entry.label.clone(), table.to_string())),
            None => Err(format!("Unknown entity '{}'", entry.entity)),
        })
        .collect()
}

/// Quote an identifier for Postgres: double quotes, embedded quotes doubled.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a string literal for Postgres: single quotes, embedded quotes doubled.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Build the single batched counting statement: one COUNT(*) sub-select per
/// (label, table) pair, combined with UNION ALL so the whole spec executes
/// in one round trip. Callers validate labels first; identifiers and labels
/// are still quoted here, never interpolated raw.
pub fn build_count_query(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(label, table)| {
            format!(
                "SELECT {} AS label, COUNT(*) AS total FROM {}",
                quote_literal(label),
                quote_ident(table)
            )
        })
        .collect::<Vec<_>>()
        .join(" UNION ALL ")
}

/// Re-project the raw query output onto the requested labels, in request
/// order. A label the store returned no row for counts as zero.
pub fn totals_in_order(entries: &[CountEntry], raw: &HashMap<String, i64>) -> Vec<LabelTotal> {
    entries
        .iter()
        .map(|entry| LabelTotal {
            label: entry.label.clone(),
            total: raw.get(&entry.label).copied().unwrap_or(0),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(label: &str, entity: &str) -> CountEntry {
        CountEntry {
            label: label.to_string(),
            entity: entity.to_string(),
        }
    }

    fn registry() -> EntityRegistry {
        let mut registry = EntityRegistry::new();
        registry.register("booking", "bookings", "Bookings");
        registry.register("coupon", "coupons", "Coupons");
        registry
    }

    #[test]
    fn test_registry_resolves_registered_tags() {
        let registry = registry();
        assert_eq!(registry.resolve("booking"), Some("bookings"));
        assert_eq!(registry.resolve("coupon"), Some("coupons"));
        assert_eq!(registry.resolve("invoice"), None);
    }

    #[test]
    fn test_default_entries_preserve_registration_order() {
        let entries = registry().default_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].label, "Bookings");
        assert_eq!(entries[0].entity, "booking");
        assert_eq!(entries[1].label, "Coupons");
    }

    #[test]
    fn test_validate_rejects_duplicate_labels() {
        let entries = vec![
            entry("Bookings", "booking"),
            entry("Coupons", "coupon"),
            entry("Bookings", "coupon"),
        ];
        let err = validate_entries(&entries).unwrap_err();
        assert!(err.contains("Duplicate label 'Bookings'"));
    }

    #[test]
    fn test_validate_rejects_empty_labels() {
        let entries = vec![entry("  ", "booking")];
        assert!(validate_entries(&entries).is_err());
    }

    #[test]
    fn test_validate_accepts_unique_labels() {
        let entries = vec![entry("Bookings", "booking"), entry("Coupons", "coupon")];
        assert!(validate_entries(&entries).is_ok());
    }

    #[test]
    fn test_resolve_preserves_order_and_flags_unknown() {
        let registry = registry();

        let pairs = resolve_entries(
            &registry,
            &[entry("Coupons", "coupon"), entry("Bookings", "booking")],
        )
        .unwrap();
        assert_eq!(pairs[0], ("Coupons".to_string(), "coupons".to_string()));
        assert_eq!(pairs[1], ("Bookings".to_string(), "bookings".to_string()));

        let err = resolve_entries(&registry, &[entry("Invoices", "invoice")]).unwrap_err();
        assert!(err.contains("Unknown entity 'invoice'"));
    }

    #[test]
    fn test_quote_ident_escapes_embedded_quotes() {
        assert_eq!(quote_ident("bookings"), "\"bookings\"");
        assert_eq!(quote_ident("odd\"name"), "\"odd\"\"name\"");
    }

    #[test]
    fn test_quote_literal_escapes_embedded_quotes() {
        assert_eq!(quote_literal("Bookings"), "'Bookings'");
        assert_eq!(quote_literal("O'Brien's"), "'O''Brien''s'");
    }

    #[test]
    fn test_build_count_query_unions_in_order() {
        let pairs = vec![
            ("Bookings".to_string(), "bookings".to_string()),
            ("Coupons".to_string(), "coupons".to_string()),
        ];

        let sql = build_count_query(&pairs);
        assert_eq!(
            sql,
            "SELECT 'Bookings' AS label, COUNT(*) AS total FROM \"bookings\" \
             UNION ALL \
             SELECT 'Coupons' AS label, COUNT(*) AS total FROM \"coupons\""
        );
    }

    #[test]
    fn test_totals_zero_fill_missing_labels() {
        let entries = vec![
            entry("A", "booking"),
            entry("B", "coupon"),
            entry("C", "booking"),
        ];
        let mut raw = HashMap::new();
        raw.insert("A".to_string(), 2);
        raw.insert("C".to_string(), 5);

        let totals = totals_in_order(&entries, &raw);
        assert_eq!(
            totals,
            vec![
                LabelTotal { label: "A".to_string(), total: 2 },
                LabelTotal { label: "B".to_string(), total: 0 },
                LabelTotal { label: "C".to_string(), total: 5 },
            ]
        );
    }

    #[test]
    fn test_totals_for_empty_spec_are_empty() {
        let totals = totals_in_order(&[], &HashMap::new());
        assert!(totals.is_empty());
    }
}
