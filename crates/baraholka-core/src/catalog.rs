//! # Category Registry
//!
//! Mapping of category name to an insertion-ordered subcategory list.
//!
//! ## Invariants
//! - Category names are unique (case-sensitive, after trimming)
//! - Subcategory names are unique within their category
//! - The registry grows monotonically: no deletion, no reordering
//!
//! The registry itself is pure data; the persistence layer loads it, applies
//! a mutation through these guarded methods inside a transaction, and writes
//! the change back. That keeps duplicate checks in exactly one place.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};

/// One category with its insertion-ordered subcategories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub subcategories: Vec<String>,
}

/// The full category registry, in insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryRegistry {
    categories: Vec<Category>,
}

impl CategoryRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        CategoryRegistry::default()
    }

    /// Builds a registry from already-validated categories (storage load).
    pub fn from_categories(categories: Vec<Category>) -> Self {
        CategoryRegistry { categories }
    }

    /// All categories in insertion order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Looks up a category by exact name.
    pub fn get(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Whether the registry holds no categories.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Adds a new category with an optional initial subcategory list.
    ///
    /// ## Errors
    /// - `Validation(Required)` when the trimmed name is empty
    /// - `DuplicateCategory` when the trimmed name already exists
    pub fn add_category(&mut self, name: &str, subcategories: Vec<String>) -> CoreResult<&Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::Required {
                field: "category name".to_string(),
            }
            .into());
        }
        if self.get(name).is_some() {
            return Err(CoreError::DuplicateCategory {
                name: name.to_string(),
            });
        }

        let subcategories = dedup_trimmed(subcategories);
        self.categories.push(Category {
            name: name.to_string(),
            subcategories,
        });
        // Just pushed, so last() is the new entry
        Ok(self.categories.last().expect("registry is non-empty"))
    }

    /// Appends a subcategory to an existing category.
    ///
    /// ## Errors
    /// - `Validation(Required)` when the trimmed name is empty
    /// - `CategoryNotFound` when the category is absent
    /// - `DuplicateSubcategory` when the name is already in the list
    pub fn add_subcategory(&mut self, category: &str, name: &str) -> CoreResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::Required {
                field: "subcategory name".to_string(),
            }
            .into());
        }

        let entry = self
            .categories
            .iter_mut()
            .find(|c| c.name == category)
            .ok_or_else(|| CoreError::CategoryNotFound(category.to_string()))?;

        if entry.subcategories.iter().any(|s| s == name) {
            return Err(CoreError::DuplicateSubcategory {
                category: category.to_string(),
                name: name.to_string(),
            });
        }

        entry.subcategories.push(name.to_string());
        Ok(())
    }

    /// Validates an item's subcategory against this registry.
    ///
    /// Empty/absent subcategories are always valid; a set subcategory must
    /// belong to the chosen category's list.
    pub fn validate_subcategory(
        &self,
        category: &str,
        subcategory: Option<&str>,
    ) -> Result<(), ValidationError> {
        let Some(sub) = subcategory.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(());
        };

        let belongs = self
            .get(category)
            .is_some_and(|c| c.subcategories.iter().any(|s| s == sub));

        if belongs {
            Ok(())
        } else {
            Err(ValidationError::UnknownSubcategory {
                category: category.to_string(),
                subcategory: sub.to_string(),
            })
        }
    }
}

/// Trims entries and drops empties and duplicates, keeping first occurrence.
fn dedup_trimmed(raw: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for entry in raw {
        let entry = entry.trim();
        if !entry.is_empty() && !out.iter().any(|s| s == entry) {
            out.push(entry.to_string());
        }
    }
    out
}

/// The default category set a fresh installation is seeded with.
pub fn default_categories() -> Vec<Category> {
    let defaults: [(&str, &[&str]); 9] = [
        ("Учебники", &["Математика", "Физика", "Химия", "Литература"]),
        ("Одежда", &["Детская", "Взрослая", "Спортивная"]),
        ("Мебель", &["Кровати", "Стулья", "Столы"]),
        ("Коляски", &["Детские", "Велосипеды"]),
        ("Техника", &["Телефоны", "Компьютеры", "Бытовая"]),
        ("Игрушки", &["Плюшевые", "Развивающие"]),
        ("Еда", &["Консервы", "Снэки", "Молоко"]),
        ("Лекарства", &["От простуды", "Детские", "Витамины"]),
        ("Билеты", &["Концерты", "Театр", "Кино"]),
    ];

    defaults
        .into_iter()
        .map(|(name, subs)| Category {
            name: name.to_string(),
            subcategories: subs.iter().map(|s| (*s).to_string()).collect(),
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_category_twice_conflicts() {
        let mut reg = CategoryRegistry::new();
        reg.add_category("Книги", vec![]).unwrap();

        let err = reg.add_category("Книги", vec![]).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateCategory { name } if name == "Книги"));
    }

    #[test]
    fn test_add_category_trims_and_rejects_empty() {
        let mut reg = CategoryRegistry::new();
        reg.add_category("  Книги  ", vec![]).unwrap();
        assert!(reg.get("Книги").is_some());

        let err = reg.add_category("   ", vec![]).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_duplicate_subcategory_conflicts() {
        let mut reg = CategoryRegistry::new();
        reg.add_category("Книги", vec![]).unwrap();

        reg.add_subcategory("Книги", "Фантастика").unwrap();
        let err = reg.add_subcategory("Книги", "Фантастика").unwrap_err();
        assert!(matches!(err, CoreError::DuplicateSubcategory { .. }));
    }

    #[test]
    fn test_subcategory_on_missing_category_is_not_found() {
        let mut reg = CategoryRegistry::new();
        let err = reg.add_subcategory("Книги", "Фантастика").unwrap_err();
        assert!(matches!(err, CoreError::CategoryNotFound(name) if name == "Книги"));
    }

    #[test]
    fn test_subcategories_preserve_insertion_order() {
        let mut reg = CategoryRegistry::new();
        reg.add_category("Книги", vec![]).unwrap();
        reg.add_subcategory("Книги", "Фантастика").unwrap();
        reg.add_subcategory("Книги", "Детективы").unwrap();
        reg.add_subcategory("Книги", "Классика").unwrap();

        let subs = &reg.get("Книги").unwrap().subcategories;
        assert_eq!(subs, &["Фантастика", "Детективы", "Классика"]);
    }

    #[test]
    fn test_initial_subcategories_are_deduped() {
        let mut reg = CategoryRegistry::new();
        let cat = reg
            .add_category(
                "Книги",
                vec![
                    "Фантастика".to_string(),
                    " Фантастика ".to_string(),
                    "".to_string(),
                    "Классика".to_string(),
                ],
            )
            .unwrap();
        assert_eq!(cat.subcategories, vec!["Фантастика", "Классика"]);
    }

    #[test]
    fn test_validate_subcategory() {
        let mut reg = CategoryRegistry::new();
        reg.add_category("Книги", vec!["Фантастика".to_string()])
            .unwrap();

        assert!(reg.validate_subcategory("Книги", None).is_ok());
        assert!(reg.validate_subcategory("Книги", Some("")).is_ok());
        assert!(reg.validate_subcategory("Книги", Some("Фантастика")).is_ok());
        assert!(reg
            .validate_subcategory("Книги", Some("Детективы"))
            .is_err());
        // Unknown category with a set subcategory is also invalid
        assert!(reg
            .validate_subcategory("Мебель", Some("Столы"))
            .is_err());
    }

    #[test]
    fn test_default_categories_are_valid() {
        let mut reg = CategoryRegistry::new();
        for cat in default_categories() {
            reg.add_category(&cat.name, cat.subcategories).unwrap();
        }
        assert_eq!(reg.len(), 9);
        assert_eq!(reg.categories()[0].name, "Учебники");
    }
}
