//! Tag index - smart tag backfill / 智能标签索引
//!
//! Manifests normally ship `smart_tags` already computed. When a location or flavor
//! arrives without them, they are derived once here while the catalog is still
//! owned by the loader. Query evaluation only ever reads them.

use crate::catalog::{Catalog, Flavor, Location};

use super::tokenizer::{push_unique, tokenize};

/// Lowercase tokens for a flavor: name + display name
pub fn flavor_tags(flavor: &Flavor) -> Vec<String> {
    let mut tags = Vec::new();
    push_unique(&mut tags, tokenize(&flavor.name));
    push_unique(&mut tags, tokenize(&flavor.display_name));
    tags
}

/// Lowercase tokens for a location: title, folder name, then every flavor's tags
pub fn location_tags(location: &Location) -> Vec<String> {
    let mut tags = Vec::new();
    push_unique(&mut tags, tokenize(&location.title));
    push_unique(&mut tags, tokenize(&location.folder_name));
    for flavor in &location.flavors {
        if flavor.smart_tags.is_empty() {
            push_unique(&mut tags, flavor_tags(flavor));
        } else {
            push_unique(&mut tags, flavor.smart_tags.iter().cloned());
        }
    }
    tags
}

/// Fill in missing tag sets; manifest-provided tags are lowercased but kept in order.
/// Returns how many tag sets were derived.
pub fn backfill(catalog: &mut Catalog) -> usize {
    let mut derived = 0;

    for location in &mut catalog.locations {
        for flavor in &mut location.flavors {
            if flavor.smart_tags.is_empty() {
                flavor.smart_tags = flavor_tags(flavor);
                derived += 1;
            } else {
                lowercase_in_place(&mut flavor.smart_tags);
            }
        }

        if location.smart_tags.is_empty() {
            location.smart_tags = location_tags(location);
            derived += 1;
        } else {
            lowercase_in_place(&mut location.smart_tags);
        }

        if let Some(text) = location.searchable_text.as_mut() {
            *text = text.to_lowercase();
        }
    }

    derived
}

fn lowercase_in_place(tags: &mut Vec<String>) {
    let lowered: Vec<String> = tags.drain(..).map(|t| t.to_lowercase()).collect();
    push_unique(tags, lowered);
}
