//! Filter engine: a pure conjunction of search term, category, price range
//! and tag predicates. Order-stable and idempotent — same input, same
//! output, no hidden state.

use shipyard_types::models::{Listing, ShipCategory};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceRange {
    pub min: u64,
    /// `None` means unbounded above (a `"+"` upper end).
    pub max: Option<u64>,
}

impl PriceRange {
    /// Parse `"min-max"`, where `max` may be `"+"` for no upper bound.
    /// Anything malformed (or empty) is no range at all.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        let (min, max) = s.split_once('-')?;
        let min = min.trim().parse().ok()?;
        let max = match max.trim() {
            "+" => None,
            raw => Some(raw.parse().ok()?),
        };
        Some(Self { min, max })
    }

    pub fn contains(&self, price: u64) -> bool {
        price >= self.min && self.max.is_none_or(|max| price <= max)
    }
}

#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    /// Case-insensitive substring over name and description. Empty passes.
    pub search_term: String,
    pub category: Option<ShipCategory>,
    pub price_range: Option<PriceRange>,
    /// OR across the selected tags, AND against the other criteria.
    pub active_tags: Vec<String>,
}

impl FilterCriteria {
    pub fn matches(&self, listing: &Listing) -> bool {
        if !self.search_term.is_empty() {
            let term = self.search_term.to_lowercase();
            if !listing.name.to_lowercase().contains(&term)
                && !listing.description.to_lowercase().contains(&term)
            {
                return false;
            }
        }

        if let Some(category) = self.category {
            if listing.category != category {
                return false;
            }
        }

        if let Some(range) = self.price_range {
            if !range.contains(listing.price) {
                return false;
            }
        }

        if !self.active_tags.is_empty()
            && !self.active_tags.iter().any(|tag| listing.tags.contains(tag))
        {
            return false;
        }

        true
    }
}

/// Apply the criteria, preserving the input order.
pub fn filter_listings<'a>(
    listings: &'a [Listing],
    criteria: &FilterCriteria,
) -> Vec<&'a Listing> {
    listings.iter().filter(|l| criteria.matches(l)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shipyard_types::models::PaymentMethod;
    use uuid::Uuid;

    fn listing(name: &str, description: &str, price: u64, category: ShipCategory, tags: &[&str]) -> Listing {
        Listing {
            id: Uuid::new_v4(),
            name: name.into(),
            price,
            description: description.into(),
            category,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            image: String::new(),
            seller_id: Uuid::new_v4(),
            seller_name: "Ada".into(),
            seller_handle: "Ada#0001".into(),
            created_at: Utc::now(),
            blueprint_file: None,
            blueprint_image: None,
            payment_method: PaymentMethod::InPerson,
        }
    }

    fn fleet() -> Vec<Listing> {
        vec![
            listing("Raven", "fast interceptor", 2500, ShipCategory::Combat, &["@pvp", "@fast"]),
            listing("Magpie", "roomy hauler", 4500, ShipCategory::Cargo, &["@cargo"]),
            listing("Osprey", "deep-core rig", 8500, ShipCategory::Mining, &["@mining"]),
            listing("Albatross", "long-range scout", 12000, ShipCategory::Exploration, &["@fast"]),
        ]
    }

    #[test]
    fn empty_criteria_pass_everything_in_order() {
        let fleet = fleet();
        let result = filter_listings(&fleet, &FilterCriteria::default());
        let names: Vec<&str> = result.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Raven", "Magpie", "Osprey", "Albatross"]);
    }

    #[test]
    fn search_term_is_case_insensitive_over_name_and_description() {
        let fleet = fleet();
        let criteria = FilterCriteria { search_term: "RAVEN".into(), ..Default::default() };
        assert_eq!(filter_listings(&fleet, &criteria).len(), 1);

        let criteria = FilterCriteria { search_term: "hauler".into(), ..Default::default() };
        assert_eq!(filter_listings(&fleet, &criteria)[0].name, "Magpie");
    }

    #[test]
    fn price_range_brackets() {
        let fleet = fleet();
        let criteria = FilterCriteria {
            price_range: PriceRange::parse("5000-10000"),
            ..Default::default()
        };
        let result = filter_listings(&fleet, &criteria);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].price, 8500);
    }

    #[test]
    fn unbounded_upper_end() {
        let fleet = fleet();
        let criteria = FilterCriteria {
            price_range: PriceRange::parse("5000-+"),
            ..Default::default()
        };
        let prices: Vec<u64> = filter_listings(&fleet, &criteria).iter().map(|l| l.price).collect();
        assert_eq!(prices, vec![8500, 12000]);
    }

    #[test]
    fn malformed_ranges_parse_to_none() {
        assert_eq!(PriceRange::parse(""), None);
        assert_eq!(PriceRange::parse("cheap"), None);
        assert_eq!(PriceRange::parse("100"), None);
        assert_eq!(PriceRange::parse("a-b"), None);
        assert_eq!(PriceRange::parse("0-5000"), Some(PriceRange { min: 0, max: Some(5000) }));
    }

    #[test]
    fn tags_or_within_and_against_the_rest() {
        let fleet = fleet();
        let criteria = FilterCriteria {
            active_tags: vec!["@fast".into(), "@cargo".into()],
            ..Default::default()
        };
        let names: Vec<&str> = filter_listings(&fleet, &criteria).iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Raven", "Magpie", "Albatross"]);

        // AND with category narrows the tag matches
        let criteria = FilterCriteria {
            active_tags: vec!["@fast".into()],
            category: Some(ShipCategory::Combat),
            ..Default::default()
        };
        let names: Vec<&str> = filter_listings(&fleet, &criteria).iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Raven"]);
    }

    #[test]
    fn filtering_is_idempotent() {
        let fleet = fleet();
        let criteria = FilterCriteria {
            search_term: "a".into(),
            price_range: PriceRange::parse("0-10000"),
            ..Default::default()
        };
        let once: Vec<Uuid> = filter_listings(&fleet, &criteria).iter().map(|l| l.id).collect();
        let cloned: Vec<Listing> = filter_listings(&fleet, &criteria).into_iter().cloned().collect();
        let twice: Vec<Uuid> = filter_listings(&cloned, &criteria).iter().map(|l| l.id).collect();
        assert_eq!(once, twice);
    }
}
