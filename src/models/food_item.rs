//! Food catalog
//!
//! The fixed set of sweets users can log. Values are per 100 g and never
//! change at runtime; entries keep their own snapshot of them.

use serde::{Deserialize, Serialize};

use super::Nutrition;

/// Sweets category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Icecream,
    Chocolate,
    Candies,
    Cake,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Icecream,
        Category::Chocolate,
        Category::Candies,
        Category::Cake,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Icecream => "icecream",
            Category::Chocolate => "chocolate",
            Category::Candies => "candies",
            Category::Cake => "cake",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "icecream" | "ice cream" => Some(Category::Icecream),
            "chocolate" => Some(Category::Chocolate),
            "candies" | "candy" => Some(Category::Candies),
            "cake" | "cakes" => Some(Category::Cake),
            _ => None,
        }
    }
}

/// A catalog food with per-100g nutrition
#[derive(Debug, Clone, Serialize)]
pub struct FoodItem {
    pub id: i64,
    pub name: &'static str,
    pub category: Category,
    pub per_100g: Nutrition,
}

impl FoodItem {
    /// Breakdown for a portion of the given weight
    pub fn nutrition_for(&self, grams: f64) -> Nutrition {
        Nutrition::for_portion(&self.per_100g, grams)
    }

    /// Get a catalog item by ID
    pub fn get_by_id(id: i64) -> Option<&'static FoodItem> {
        CATALOG.iter().find(|f| f.id == id)
    }

    /// Get a catalog item by exact name
    pub fn get_by_name(name: &str) -> Option<&'static FoodItem> {
        CATALOG.iter().find(|f| f.name == name)
    }

    /// List items, optionally restricted to a category
    pub fn list(category: Option<Category>) -> Vec<&'static FoodItem> {
        CATALOG
            .iter()
            .filter(|f| category.map_or(true, |c| f.category == c))
            .collect()
    }

    /// Case-insensitive name search; a blank query matches everything
    pub fn search(category: Option<Category>, query: &str) -> Vec<&'static FoodItem> {
        let needle = query.trim().to_lowercase();
        Self::list(category)
            .into_iter()
            .filter(|f| needle.is_empty() || f.name.to_lowercase().contains(&needle))
            .collect()
    }
}

// [calories, sugar, protein, carbohydrates, fats, sodium, cholesterol, potassium]
const fn food(id: i64, name: &'static str, category: Category, v: [f64; 8]) -> FoodItem {
    FoodItem {
        id,
        name,
        category,
        per_100g: Nutrition {
            calories: v[0],
            sugar: v[1],
            protein: v[2],
            carbohydrates: v[3],
            fats: v[4],
            sodium: v[5],
            cholesterol: v[6],
            potassium: v[7],
        },
    }
}

/// All catalog foods, in display order
pub static CATALOG: [FoodItem; 40] = [
    food(1, "Chocolate ice cream", Category::Icecream, [300.0, 20.0, 5.0, 35.0, 15.0, 80.0, 30.0, 150.0]),
    food(2, "Vanilla ice cream", Category::Icecream, [300.0, 18.0, 4.0, 32.0, 16.0, 75.0, 35.0, 140.0]),
    food(3, "Ice cream with nuts", Category::Icecream, [300.0, 15.0, 7.0, 28.0, 20.0, 70.0, 25.0, 180.0]),
    food(4, "Yogurt ice cream", Category::Icecream, [300.0, 22.0, 6.0, 30.0, 12.0, 65.0, 20.0, 200.0]),
    food(5, "Fruit ice", Category::Icecream, [300.0, 25.0, 2.0, 40.0, 8.0, 40.0, 10.0, 220.0]),
    food(6, "Strawberry ice cream", Category::Icecream, [280.0, 19.0, 4.0, 33.0, 14.0, 70.0, 30.0, 160.0]),
    food(7, "Cookies ice cream", Category::Icecream, [320.0, 22.0, 5.0, 38.0, 18.0, 120.0, 35.0, 140.0]),
    food(8, "Caramel ice cream", Category::Icecream, [310.0, 28.0, 4.0, 35.0, 16.0, 85.0, 32.0, 130.0]),
    food(9, "Mint ice cream", Category::Icecream, [290.0, 17.0, 4.0, 30.0, 15.0, 75.0, 28.0, 145.0]),
    food(10, "Coffee ice cream", Category::Icecream, [305.0, 20.0, 5.0, 32.0, 16.0, 80.0, 30.0, 150.0]),
    food(11, "Dark chocolate", Category::Chocolate, [250.0, 12.0, 8.0, 20.0, 18.0, 20.0, 5.0, 300.0]),
    food(12, "Milk chocolate", Category::Chocolate, [280.0, 25.0, 6.0, 30.0, 16.0, 40.0, 15.0, 200.0]),
    food(13, "White chocolate", Category::Chocolate, [290.0, 28.0, 5.0, 32.0, 17.0, 50.0, 20.0, 150.0]),
    food(14, "Chocolate with nuts", Category::Chocolate, [320.0, 18.0, 10.0, 25.0, 22.0, 30.0, 8.0, 350.0]),
    food(15, "Chocolate with raisins", Category::Chocolate, [310.0, 30.0, 7.0, 35.0, 15.0, 25.0, 10.0, 280.0]),
    food(16, "Bitter chocolate", Category::Chocolate, [240.0, 8.0, 9.0, 18.0, 16.0, 15.0, 3.0, 320.0]),
    food(17, "Chocolate truffles", Category::Chocolate, [350.0, 22.0, 6.0, 28.0, 25.0, 35.0, 25.0, 180.0]),
    food(18, "Chocolate bar", Category::Chocolate, [270.0, 20.0, 6.0, 26.0, 15.0, 30.0, 12.0, 200.0]),
    food(19, "Hot chocolate", Category::Chocolate, [200.0, 18.0, 8.0, 22.0, 8.0, 100.0, 20.0, 250.0]),
    food(20, "Chocolate cookies", Category::Chocolate, [180.0, 15.0, 4.0, 25.0, 8.0, 120.0, 15.0, 80.0]),
    food(21, "Gummy bears", Category::Candies, [150.0, 35.0, 2.0, 38.0, 0.0, 15.0, 0.0, 5.0]),
    food(22, "Hard candy", Category::Candies, [120.0, 30.0, 0.0, 30.0, 0.0, 5.0, 0.0, 2.0]),
    food(23, "Lollipop", Category::Candies, [100.0, 25.0, 0.0, 25.0, 0.0, 8.0, 0.0, 1.0]),
    food(24, "Jelly beans", Category::Candies, [140.0, 32.0, 1.0, 35.0, 0.0, 12.0, 0.0, 3.0]),
    food(25, "Caramel candy", Category::Candies, [160.0, 28.0, 2.0, 32.0, 4.0, 40.0, 5.0, 15.0]),
    food(26, "Mint candy", Category::Candies, [110.0, 26.0, 0.0, 27.0, 1.0, 10.0, 0.0, 5.0]),
    food(27, "Fruit gummies", Category::Candies, [130.0, 30.0, 2.0, 33.0, 0.0, 20.0, 0.0, 8.0]),
    food(28, "Sour candy", Category::Candies, [125.0, 28.0, 0.0, 31.0, 0.0, 25.0, 0.0, 3.0]),
    food(29, "Cotton candy", Category::Candies, [170.0, 42.0, 0.0, 43.0, 0.0, 5.0, 0.0, 2.0]),
    food(30, "Candy cane", Category::Candies, [90.0, 22.0, 0.0, 23.0, 0.0, 3.0, 0.0, 1.0]),
    food(31, "Chocolate cake", Category::Cake, [400.0, 35.0, 8.0, 55.0, 18.0, 250.0, 80.0, 180.0]),
    food(32, "Vanilla cake", Category::Cake, [380.0, 32.0, 6.0, 52.0, 16.0, 220.0, 75.0, 150.0]),
    food(33, "Cheesecake", Category::Cake, [450.0, 28.0, 12.0, 40.0, 28.0, 300.0, 120.0, 200.0]),
    food(34, "Red velvet cake", Category::Cake, [420.0, 38.0, 7.0, 58.0, 20.0, 280.0, 85.0, 160.0]),
    food(35, "Carrot cake", Category::Cake, [390.0, 30.0, 8.0, 50.0, 18.0, 240.0, 70.0, 220.0]),
    food(36, "Lemon cake", Category::Cake, [360.0, 35.0, 6.0, 48.0, 15.0, 200.0, 65.0, 140.0]),
    food(37, "Strawberry cake", Category::Cake, [370.0, 33.0, 7.0, 50.0, 16.0, 210.0, 70.0, 180.0]),
    food(38, "Tiramisu", Category::Cake, [480.0, 25.0, 10.0, 45.0, 30.0, 180.0, 150.0, 250.0]),
    food(39, "Black forest cake", Category::Cake, [460.0, 40.0, 8.0, 60.0, 22.0, 220.0, 90.0, 200.0]),
    food(40, "Banana cake", Category::Cake, [350.0, 28.0, 6.0, 48.0, 14.0, 190.0, 60.0, 300.0]),
];
