//! Custom taxonomy helpers.
//!
//! Everything a taxonomy needs before it is handed to the host: its instance
//! options, its admin labels, its registration arguments, and the permalink
//! rewrite that swaps the `%taxonomy%` placeholder for term slugs.

use serde::{Deserialize, Serialize};
use wpdtrt_options::OptionStore;

use crate::ctx::PluginContext;

/// Post type the host registers out of the box.
const BUILTIN_POST_TYPE: &str = "post";

/// Author-supplied naming for a taxonomy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyNames {
    pub singular: String,
    pub plural: String,
    /// Rewrite slug.
    pub slug: String,
    pub description: String,
    /// Post type the taxonomy attaches to.
    pub posttype: String,
}

/// Admin UI labels derived from the singular and plural names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyLabels {
    pub name: String,
    pub singular_name: String,
    pub menu_name: String,
    pub all_items: String,
    pub add_new_item: String,
    pub edit_item: String,
    pub view_item: String,
    pub update_item: String,
    pub new_item_name: String,
    /// Only shown for hierarchical taxonomies.
    pub parent_item: String,
    pub parent_item_colon: String,
    pub search_items: String,
    /// Only shown for flat taxonomies.
    pub popular_items: String,
    pub separate_items_with_commas: String,
    pub add_or_remove_items: String,
    pub choose_from_most_used: String,
    pub not_found: String,
}

impl TaxonomyLabels {
    /// Derive the full label set.
    pub fn derive(singular: &str, plural: &str) -> Self {
        Self {
            name: plural.to_string(),
            singular_name: singular.to_string(),
            menu_name: plural.to_string(),
            all_items: format!("All {plural}"),
            add_new_item: format!("Add New {singular}"),
            edit_item: format!("Edit {singular}"),
            view_item: format!("View {singular}"),
            update_item: format!("Update {singular}"),
            new_item_name: format!("New {singular} Name"),
            parent_item: format!("Parent {singular}"),
            parent_item_colon: format!("Parent {singular}:"),
            search_items: format!("Search {plural}"),
            popular_items: format!("Popular {plural}"),
            separate_items_with_commas: format!("Separate {plural} with commas"),
            add_or_remove_items: format!("Add or remove {plural}"),
            choose_from_most_used: format!("Choose from the most used {plural}"),
            not_found: format!("No {plural} found"),
        }
    }
}

/// Rewrite rules for taxonomy archive URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyRewrite {
    pub slug: String,
    pub with_front: bool,
    pub hierarchical: bool,
}

/// Arguments the host's taxonomy registration takes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyArgs {
    pub labels: TaxonomyLabels,
    pub description: String,
    pub hierarchical: bool,
    pub rewrite: TaxonomyRewrite,
}

/// A term attached to a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub slug: String,
    /// Parent term id, `0` for top-level terms.
    pub parent: u64,
}

/// A custom taxonomy and the instance options it exposes.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    name: String,
    names: TaxonomyNames,
    instance_options: OptionStore,
}

impl Taxonomy {
    /// Creates a taxonomy using the named subset of the plugin's instance
    /// options.
    pub fn new(ctx: &PluginContext, name: &str, selected: &[&str], names: TaxonomyNames) -> Self {
        Self {
            name: name.to_string(),
            names,
            instance_options: ctx.instance_options_for(selected),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn names(&self) -> &TaxonomyNames {
        &self.names
    }

    pub fn instance_options(&self) -> &OptionStore {
        &self.instance_options
    }

    /// Registration arguments: hierarchical, rewritten under the taxonomy
    /// slug without the front base.
    pub fn args(&self) -> TaxonomyArgs {
        TaxonomyArgs {
            labels: TaxonomyLabels::derive(&self.names.singular, &self.names.plural),
            description: self.names.description.clone(),
            hierarchical: true,
            rewrite: TaxonomyRewrite {
                slug: self.names.slug.clone(),
                with_front: false,
                hierarchical: true,
            },
        }
    }

    /// Whether the taxonomy must also be bound to a custom post type.
    pub fn needs_object_type_binding(&self) -> bool {
        self.names.posttype != BUILTIN_POST_TYPE
    }

    /// Permalink filter for this taxonomy, see [`replace_taxonomy_placeholder`].
    pub fn filter_permalink(&self, permalink: &str, terms: &[Term]) -> String {
        replace_taxonomy_placeholder(permalink, &self.name, terms)
    }
}

/// Replace `%<taxonomy>%` in a permalink with the post's term slugs.
///
/// Terms are ordered by parent id, so parents come before their children,
/// and joined with `/`. A permalink without the placeholder, or a post
/// without terms, is returned unchanged.
pub fn replace_taxonomy_placeholder(permalink: &str, taxonomy: &str, terms: &[Term]) -> String {
    let placeholder = format!("%{taxonomy}%");
    if !permalink.contains(&placeholder) {
        return permalink.to_string();
    }

    let mut ordered: Vec<&Term> = terms.iter().filter(|t| !t.slug.is_empty()).collect();
    if ordered.is_empty() {
        // an empty segment would leave `//` in the URL
        return permalink.to_string();
    }
    ordered.sort_by_key(|t| t.parent);
    let path = ordered
        .iter()
        .map(|t| t.slug.as_str())
        .collect::<Vec<_>>()
        .join("/");

    permalink.replace(&placeholder, &path)
}
