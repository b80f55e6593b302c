//! # sonar-classify
//!
//! Deterministic intent classification and entity extraction for a single
//! user message. A cascade of regex/keyword rules tests categories in
//! priority order (first match wins); in parallel the message is scanned for
//! known commodities, suppliers, managed categories, regions, timeframes,
//! risk levels, and action verbs. Running the classifier twice on the same
//! message returns an equal intent.

mod entities;
mod price_patterns;
mod rules;

pub use entities::extract_entities;
pub use price_patterns::is_price_data_query;

use sonar_catalog::Catalog;
use sonar_core::models::intent::Intent;
use tracing::debug;

/// The classifier. Holds only a catalog reference for the supplier and
/// category dictionaries.
pub struct Classifier<'a> {
    catalog: &'a Catalog,
}

impl<'a> Classifier<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Classify one message: category cascade plus entity scan.
    pub fn classify(&self, message: &str) -> Intent {
        let entities = extract_entities(self.catalog, message);
        let intent = rules::categorize(message, entities);
        debug!(
            category = ?intent.category,
            confidence = intent.confidence,
            "classified intent"
        );
        intent
    }

    /// Entity extraction only, used when a deterministic route already
    /// fixed the category.
    pub fn extract(&self, message: &str) -> sonar_core::models::intent::ExtractedEntities {
        extract_entities(self.catalog, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn classification_is_deterministic(message in "[a-zA-Z0-9 ,?.']{0,80}") {
            let catalog = Catalog::builtin();
            let classifier = Classifier::new(&catalog);
            prop_assert_eq!(classifier.classify(&message), classifier.classify(&message));
        }
    }
}
