//! Catalog MCP Tools
//!
//! Browse the sweets catalog and preview portion nutrition.

use serde::Serialize;
use tracing::debug;

use crate::db::Database;
use crate::models::{Category, FoodItem, Nutrition, Settings};
use crate::nutrition::{default_portion, parse_portion, predefined_portions, Portion};

/// Catalog item for listing
#[derive(Debug, Serialize)]
pub struct CatalogItem {
    pub id: i64,
    pub name: &'static str,
    pub category: Category,
    pub calories_per_100g: f64,
    pub sugar_per_100g: f64,
}

/// Response for list_catalog
#[derive(Debug, Serialize)]
pub struct ListCatalogResponse {
    pub items: Vec<CatalogItem>,
    pub total: usize,
}

/// Response for get_food
#[derive(Debug, Serialize)]
pub struct FoodDetail {
    pub id: i64,
    pub name: &'static str,
    pub category: Category,
    pub per_100g: Nutrition,
    /// Portion presets in the user's unit system
    pub portions: Vec<&'static str>,
    pub default_portion: &'static str,
    /// Portion the preview was computed for
    pub portion: Portion,
    /// Nutrition for `portion`
    pub nutrition: Nutrition,
}

/// Parse an optional category filter
pub fn parse_category(category: Option<&str>) -> Result<Option<Category>, String> {
    category
        .filter(|c| !c.trim().is_empty())
        .map(|c| {
            Category::from_str(c).ok_or_else(|| {
                format!(
                    "Invalid category '{}'. Must be one of: icecream, chocolate, candies, cake",
                    c
                )
            })
        })
        .transpose()
}

/// List catalog items, optionally by category and name substring
pub fn list_catalog(
    category: Option<&str>,
    query: Option<&str>,
) -> Result<ListCatalogResponse, String> {
    let category = parse_category(category)?;
    let items: Vec<CatalogItem> = FoodItem::search(category, query.unwrap_or(""))
        .into_iter()
        .map(|f| CatalogItem {
            id: f.id,
            name: f.name,
            category: f.category,
            calories_per_100g: f.per_100g.calories,
            sugar_per_100g: f.per_100g.sugar,
        })
        .collect();

    debug!("Catalog listing returned {} items", items.len());
    Ok(ListCatalogResponse {
        total: items.len(),
        items,
    })
}

/// Get a catalog item with portion presets and a nutrition preview
pub fn get_food(db: &Database, id: i64, portion: Option<&str>) -> Result<FoodDetail, String> {
    let food = FoodItem::get_by_id(id).ok_or_else(|| format!("Food {} not found", id))?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let settings = Settings::get(&conn).map_err(|e| format!("Failed to get settings: {}", e))?;

    let default = default_portion(settings.unit_system);
    let portion = parse_portion(portion.unwrap_or(default)).map_err(|e| e.to_string())?;

    Ok(FoodDetail {
        id: food.id,
        name: food.name,
        category: food.category,
        per_100g: food.per_100g,
        portions: predefined_portions(settings.unit_system).to_vec(),
        default_portion: default,
        nutrition: food.nutrition_for(portion.grams),
        portion,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::SettingsUpdate;
    use crate::nutrition::UnitSystem;

    fn setup() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| run_migrations(conn)).unwrap();
        db
    }

    #[test]
    fn test_list_by_category_and_query() {
        let all = list_catalog(None, None).unwrap();
        assert_eq!(all.total, 40);

        let cakes = list_catalog(Some("cake"), None).unwrap();
        assert_eq!(cakes.total, 10);
        assert!(cakes.items.iter().all(|i| i.category == Category::Cake));

        let found = list_catalog(Some("chocolate"), Some("MILK")).unwrap();
        assert_eq!(found.total, 1);
        assert_eq!(found.items[0].name, "Milk chocolate");
    }

    #[test]
    fn test_invalid_category() {
        assert!(list_catalog(Some("pie"), None).is_err());
        assert_eq!(parse_category(Some(" ")).unwrap(), None);
    }

    #[test]
    fn test_get_food_defaults_to_preset_portion() {
        let db = setup();
        let food = get_food(&db, 31, None).unwrap();
        assert_eq!(food.name, "Chocolate cake");
        assert_eq!(food.default_portion, "100g");
        assert_eq!(food.portions.len(), 5);
        assert_eq!(food.nutrition.calories, 400.0);
    }

    #[test]
    fn test_get_food_in_american_units() {
        let db = setup();
        db.with_conn(|conn| {
            Settings::update(
                conn,
                &SettingsUpdate {
                    unit_system: Some(UnitSystem::American),
                    ..Default::default()
                },
            )
        })
        .unwrap();

        let food = get_food(&db, 31, None).unwrap();
        assert_eq!(food.default_portion, "3.5oz");
        // 3.5oz -> 99g
        assert_eq!(food.portion.grams, 99.0);
        assert_eq!(food.nutrition.calories, 396.0);

        let custom = get_food(&db, 31, Some("250g")).unwrap();
        assert_eq!(custom.nutrition.calories, 1000.0);
    }

    #[test]
    fn test_get_food_errors() {
        let db = setup();
        assert!(get_food(&db, 99, None).is_err());
        assert!(get_food(&db, 1, Some("lots")).is_err());
    }
}
