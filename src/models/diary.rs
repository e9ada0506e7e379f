//! In-memory diary
//!
//! Insertion-ordered list of entries that every summary is computed from.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::nutrition::Portion;
use super::{FoodItem, Nutrition, NutritionEntry, NutritionEntryCreate};

/// Ordered collection of logged entries
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diary {
    entries: Vec<NutritionEntry>,
    #[serde(skip)]
    next_id: i64,
}

impl Diary {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }

    /// Wrap entries already in insertion order (e.g. loaded from the database)
    pub fn from_entries(entries: Vec<NutritionEntry>) -> Self {
        let next_id = entries.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        Self { entries, next_id }
    }

    /// Append a new entry and return it
    pub fn add(&mut self, data: NutritionEntryCreate) -> &NutritionEntry {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        self.entries.push(NutritionEntry::from_create(id, data));
        &self.entries[self.entries.len() - 1]
    }

    /// Replace an entry's portion and breakdown in place
    pub fn replace(
        &mut self,
        id: i64,
        food: &FoodItem,
        portion: Portion,
        saved_at: DateTime<Utc>,
    ) -> Option<&NutritionEntry> {
        let slot = self.entries.iter_mut().find(|e| e.id == id)?;
        *slot = slot.with_portion(food, portion, saved_at);
        Some(&*slot)
    }

    /// Remove an entry, keeping the order of the rest
    pub fn remove(&mut self, id: i64) -> Option<NutritionEntry> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(index))
    }

    pub fn get(&self, id: i64) -> Option<&NutritionEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn entries(&self) -> &[NutritionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries logged for a date
    pub fn for_date(&self, date: NaiveDate) -> Vec<&NutritionEntry> {
        self.entries.iter().filter(|e| e.date == date).collect()
    }

    /// Summed breakdown for a date
    pub fn totals_for(&self, date: NaiveDate) -> Nutrition {
        self.for_date(date).into_iter().map(|e| &e.nutrition).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::parse_portion;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn log(diary: &mut Diary, food_id: i64, amount: &str, day: &str) -> i64 {
        let food = FoodItem::get_by_id(food_id).unwrap();
        let data = NutritionEntryCreate::new(
            food,
            parse_portion(amount).unwrap(),
            date(day),
            food.category,
            Utc::now(),
        );
        diary.add(data).id
    }

    #[test]
    fn test_add_assigns_increasing_ids() {
        let mut diary = Diary::new();
        let a = log(&mut diary, 1, "100g", "2024-01-01");
        let b = log(&mut diary, 2, "100g", "2024-01-01");
        assert!(b > a);
        assert_eq!(diary.len(), 2);
    }

    #[test]
    fn test_default_diary_ids_start_at_one() {
        let mut diary = Diary::default();
        assert_eq!(log(&mut diary, 1, "100g", "2024-01-01"), 1);
    }

    #[test]
    fn test_from_entries_continues_ids() {
        let mut source = Diary::new();
        log(&mut source, 1, "100g", "2024-01-01");
        log(&mut source, 2, "100g", "2024-01-01");

        let mut diary = Diary::from_entries(source.entries().to_vec());
        assert_eq!(log(&mut diary, 3, "100g", "2024-01-01"), 3);
    }

    #[test]
    fn test_totals_match_entry_sum() {
        let mut diary = Diary::new();
        log(&mut diary, 31, "100g", "2024-01-01"); // 400 kcal
        log(&mut diary, 23, "100g", "2024-01-01"); // 100 kcal
        log(&mut diary, 22, "100g", "2024-01-02");

        let totals = diary.totals_for(date("2024-01-01"));
        assert_eq!(totals.calories, 500.0);
        assert_eq!(totals.sugar, 60.0);
        assert_eq!(diary.for_date(date("2024-01-02")).len(), 1);
        assert_eq!(diary.totals_for(date("2023-12-31")), Nutrition::zero());
    }

    #[test]
    fn test_replace_preserves_category_and_date() {
        let mut diary = Diary::new();
        let id = log(&mut diary, 11, "100g", "2024-01-05");
        let food = FoodItem::get_by_id(11).unwrap();

        let replaced = diary
            .replace(id, food, parse_portion("200g").unwrap(), Utc::now())
            .unwrap()
            .clone();
        assert_eq!(replaced.date, date("2024-01-05"));
        assert_eq!(replaced.nutrition.calories, 500.0);
        assert_eq!(diary.len(), 1);

        assert!(diary.replace(99, food, parse_portion("1g").unwrap(), Utc::now()).is_none());
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut diary = Diary::new();
        let a = log(&mut diary, 1, "100g", "2024-01-01");
        let b = log(&mut diary, 2, "100g", "2024-01-01");
        let c = log(&mut diary, 3, "100g", "2024-01-01");

        assert_eq!(diary.remove(b).map(|e| e.id), Some(b));
        let ids: Vec<i64> = diary.entries().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![a, c]);
        assert!(diary.remove(b).is_none());
    }
}
