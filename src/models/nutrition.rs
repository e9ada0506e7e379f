//! Shared nutrition data structure
//!
//! Used for catalog reference values, entry breakdowns and day totals.

use serde::{Deserialize, Serialize};

/// Nutritional values
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    pub calories: f64,
    pub sugar: f64,         // grams
    pub protein: f64,       // grams
    pub carbohydrates: f64, // grams
    pub fats: f64,          // grams
    pub sodium: f64,        // milligrams
    pub cholesterol: f64,   // milligrams
    pub potassium: f64,     // milligrams
}

impl Nutrition {
    /// Create a new Nutrition with all zeros
    pub fn zero() -> Self {
        Self::default()
    }

    /// Scale nutrition values by a multiplier
    pub fn scale(&self, multiplier: f64) -> Self {
        Self {
            calories: self.calories * multiplier,
            sugar: self.sugar * multiplier,
            protein: self.protein * multiplier,
            carbohydrates: self.carbohydrates * multiplier,
            fats: self.fats * multiplier,
            sodium: self.sodium * multiplier,
            cholesterol: self.cholesterol * multiplier,
            potassium: self.potassium * multiplier,
        }
    }

    /// Round every value to the nearest integer
    pub fn rounded(&self) -> Self {
        Self {
            calories: self.calories.round(),
            sugar: self.sugar.round(),
            protein: self.protein.round(),
            carbohydrates: self.carbohydrates.round(),
            fats: self.fats.round(),
            sodium: self.sodium.round(),
            cholesterol: self.cholesterol.round(),
            potassium: self.potassium.round(),
        }
    }

    /// Breakdown of a portion from per-100g reference values
    pub fn for_portion(per_100g: &Nutrition, grams: f64) -> Self {
        per_100g.scale(grams / 100.0).rounded()
    }

    /// Add another nutrition to this one
    pub fn add(&self, other: &Nutrition) -> Self {
        Self {
            calories: self.calories + other.calories,
            sugar: self.sugar + other.sugar,
            protein: self.protein + other.protein,
            carbohydrates: self.carbohydrates + other.carbohydrates,
            fats: self.fats + other.fats,
            sodium: self.sodium + other.sodium,
            cholesterol: self.cholesterol + other.cholesterol,
            potassium: self.potassium + other.potassium,
        }
    }
}

impl std::ops::Add for Nutrition {
    type Output = Nutrition;

    fn add(self, other: Nutrition) -> Nutrition {
        Nutrition::add(&self, &other)
    }
}

impl std::ops::Mul<f64> for Nutrition {
    type Output = Nutrition;

    fn mul(self, multiplier: f64) -> Nutrition {
        self.scale(multiplier)
    }
}

impl std::iter::Sum for Nutrition {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Nutrition::zero(), |acc, n| acc + n)
    }
}

impl<'a> std::iter::Sum<&'a Nutrition> for Nutrition {
    fn sum<I: Iterator<Item = &'a Nutrition>>(iter: I) -> Self {
        iter.fold(Nutrition::zero(), |acc, n| acc + *n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chocolate_cake() -> Nutrition {
        Nutrition {
            calories: 400.0,
            sugar: 35.0,
            protein: 8.0,
            carbohydrates: 55.0,
            fats: 18.0,
            sodium: 250.0,
            cholesterol: 80.0,
            potassium: 180.0,
        }
    }

    #[test]
    fn test_for_portion_rounds_each_value() {
        // 99g of cake: every value times 0.99, rounded
        let n = Nutrition::for_portion(&chocolate_cake(), 99.0);
        assert_eq!(n.calories, 396.0);
        assert_eq!(n.sugar, 35.0);
        assert_eq!(n.carbohydrates, 54.0);
        assert_eq!(n.fats, 18.0);
        assert_eq!(n.potassium, 178.0);
    }

    #[test]
    fn test_sum() {
        let total: Nutrition = vec![chocolate_cake(), chocolate_cake()].into_iter().sum();
        assert_eq!(total.calories, 800.0);
        assert_eq!(total.sodium, 500.0);

        let empty: Nutrition = Vec::<Nutrition>::new().iter().sum();
        assert_eq!(empty, Nutrition::zero());
    }
}
