//! Screen navigation
//!
//! Exactly one screen is current at a time. `Screen::next` is the only way
//! to move between screens; events that make no sense on the current screen
//! are rejected.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Category;

#[derive(Debug, Error, PartialEq)]
pub enum NavError {
    #[error("Event '{event}' is not valid on the {screen} screen")]
    InvalidTransition {
        screen: &'static str,
        event: &'static str,
    },

    #[error("Unknown navigation event: {0}")]
    UnknownEvent(String),

    #[error("Event '{event}' requires '{field}'")]
    MissingField {
        event: &'static str,
        field: &'static str,
    },

    #[error("Unknown category: {0}")]
    UnknownCategory(String),
}

/// The current screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum Screen {
    #[default]
    Onboarding,
    Diary,
    /// Catalog browser for one category
    AddSweets { category: Category },
    /// Portion picker; `editing` is set when replacing an existing entry
    ProductDetail {
        food_id: i64,
        category: Category,
        editing: Option<i64>,
    },
    Profile,
    PersonalData,
    Settings,
    SugarLimit,
    Statistics,
    /// Paywall
    Pro,
    PremiumWelcome,
}

/// User actions that move between screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum NavEvent {
    Start,
    Back,
    // bottom navigation
    OpenDiary,
    OpenProfile,
    OpenStatistics,
    OpenPro { is_premium: bool },
    // diary
    AddSweets { category: Category },
    EditEntry { entry_id: i64, food_id: i64, category: Category },
    // add sweets
    SelectCategory { category: Category },
    SelectFood { food_id: i64 },
    // product detail
    SaveEntry,
    // profile and settings
    OpenPersonalData,
    OpenSettings,
    OpenSugarLimit,
    DeleteAccount,
    // purchase flow
    PurchaseCompleted,
    CloseWelcome,
    GoToCharts,
}

impl Screen {
    pub fn name(&self) -> &'static str {
        match self {
            Screen::Onboarding => "onboarding",
            Screen::Diary => "diary",
            Screen::AddSweets { .. } => "add_sweets",
            Screen::ProductDetail { .. } => "product_detail",
            Screen::Profile => "profile",
            Screen::PersonalData => "personal_data",
            Screen::Settings => "settings",
            Screen::SugarLimit => "sugar_limit",
            Screen::Statistics => "statistics",
            Screen::Pro => "pro",
            Screen::PremiumWelcome => "premium_welcome",
        }
    }

    /// Screens that show the bottom navigation bar
    fn has_tab_bar(&self) -> bool {
        matches!(
            self,
            Screen::Diary
                | Screen::Profile
                | Screen::PersonalData
                | Screen::Settings
                | Screen::SugarLimit
                | Screen::Statistics
                | Screen::Pro
        )
    }

    /// Apply an event to the current screen
    pub fn next(self, event: NavEvent) -> Result<Screen, NavError> {
        use NavEvent as E;

        let next = match (self, event) {
            (Screen::Onboarding, E::Start) => Screen::Diary,

            (s, E::OpenDiary) if s.has_tab_bar() => Screen::Diary,
            (s, E::OpenProfile) if s.has_tab_bar() => Screen::Profile,
            (s, E::OpenStatistics) if s.has_tab_bar() => Screen::Statistics,
            // premium users skip the paywall
            (s, E::OpenPro { is_premium }) if s.has_tab_bar() => {
                if is_premium {
                    Screen::Statistics
                } else {
                    Screen::Pro
                }
            }

            (Screen::Diary, E::AddSweets { category }) => Screen::AddSweets { category },
            (Screen::Diary, E::EditEntry { entry_id, food_id, category }) => {
                Screen::ProductDetail {
                    food_id,
                    category,
                    editing: Some(entry_id),
                }
            }

            (Screen::AddSweets { .. }, E::SelectCategory { category }) => {
                Screen::AddSweets { category }
            }
            (Screen::AddSweets { category }, E::SelectFood { food_id }) => Screen::ProductDetail {
                food_id,
                category,
                editing: None,
            },
            (Screen::AddSweets { .. }, E::Back) => Screen::Diary,

            (Screen::ProductDetail { .. }, E::SaveEntry) => Screen::Diary,
            (Screen::ProductDetail { editing: Some(_), .. }, E::Back) => Screen::Diary,
            (Screen::ProductDetail { category, editing: None, .. }, E::Back) => {
                Screen::AddSweets { category }
            }

            (Screen::Profile, E::OpenPersonalData) => Screen::PersonalData,
            (Screen::Profile, E::OpenSettings) => Screen::Settings,
            (Screen::Profile, E::Back) => Screen::Diary,
            (Screen::PersonalData, E::Back) => Screen::Profile,

            (Screen::Settings, E::OpenSugarLimit) => Screen::SugarLimit,
            (Screen::Settings, E::DeleteAccount) => Screen::Onboarding,
            (Screen::Settings, E::Back) => Screen::Profile,
            (Screen::SugarLimit, E::Back) => Screen::Settings,

            (Screen::Statistics, E::Back) => Screen::Diary,

            (Screen::Pro, E::PurchaseCompleted) => Screen::PremiumWelcome,
            (Screen::Pro, E::Back) => Screen::Diary,
            (Screen::PremiumWelcome, E::CloseWelcome) => Screen::Diary,
            (Screen::PremiumWelcome, E::GoToCharts) => Screen::Statistics,

            (screen, event) => {
                return Err(NavError::InvalidTransition {
                    screen: screen.name(),
                    event: event.name(),
                })
            }
        };

        Ok(next)
    }
}

impl NavEvent {
    pub fn name(&self) -> &'static str {
        match self {
            NavEvent::Start => "start",
            NavEvent::Back => "back",
            NavEvent::OpenDiary => "open_diary",
            NavEvent::OpenProfile => "open_profile",
            NavEvent::OpenStatistics => "open_statistics",
            NavEvent::OpenPro { .. } => "open_pro",
            NavEvent::AddSweets { .. } => "add_sweets",
            NavEvent::EditEntry { .. } => "edit_entry",
            NavEvent::SelectCategory { .. } => "select_category",
            NavEvent::SelectFood { .. } => "select_food",
            NavEvent::SaveEntry => "save_entry",
            NavEvent::OpenPersonalData => "open_personal_data",
            NavEvent::OpenSettings => "open_settings",
            NavEvent::OpenSugarLimit => "open_sugar_limit",
            NavEvent::DeleteAccount => "delete_account",
            NavEvent::PurchaseCompleted => "purchase_completed",
            NavEvent::CloseWelcome => "close_welcome",
            NavEvent::GoToCharts => "go_to_charts",
        }
    }

    /// Build an event from its name and loose arguments
    pub fn parse(
        name: &str,
        category: Option<&str>,
        food_id: Option<i64>,
        entry_id: Option<i64>,
        is_premium: bool,
    ) -> Result<Self, NavError> {
        let category = |event: &'static str| -> Result<Category, NavError> {
            let raw = category.ok_or(NavError::MissingField {
                event,
                field: "category",
            })?;
            Category::from_str(raw).ok_or_else(|| NavError::UnknownCategory(raw.to_string()))
        };
        let food_id = |event: &'static str| food_id.ok_or(NavError::MissingField { event, field: "food_id" });

        let event = match name.trim() {
            "start" => NavEvent::Start,
            "back" => NavEvent::Back,
            "open_diary" => NavEvent::OpenDiary,
            "open_profile" => NavEvent::OpenProfile,
            "open_statistics" => NavEvent::OpenStatistics,
            "open_pro" => NavEvent::OpenPro { is_premium },
            "add_sweets" => NavEvent::AddSweets {
                category: category("add_sweets")?,
            },
            "edit_entry" => NavEvent::EditEntry {
                entry_id: entry_id.ok_or(NavError::MissingField {
                    event: "edit_entry",
                    field: "entry_id",
                })?,
                food_id: food_id("edit_entry")?,
                category: category("edit_entry")?,
            },
            "select_category" => NavEvent::SelectCategory {
                category: category("select_category")?,
            },
            "select_food" => NavEvent::SelectFood {
                food_id: food_id("select_food")?,
            },
            "save_entry" => NavEvent::SaveEntry,
            "open_personal_data" => NavEvent::OpenPersonalData,
            "open_settings" => NavEvent::OpenSettings,
            "open_sugar_limit" => NavEvent::OpenSugarLimit,
            "delete_account" => NavEvent::DeleteAccount,
            "purchase_completed" => NavEvent::PurchaseCompleted,
            "close_welcome" => NavEvent::CloseWelcome,
            "go_to_charts" => NavEvent::GoToCharts,
            other => return Err(NavError::UnknownEvent(other.to_string())),
        };
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk(start: Screen, events: &[NavEvent]) -> Result<Screen, NavError> {
        events.iter().try_fold(start, |screen, event| screen.next(*event))
    }

    #[test]
    fn test_onboarding_to_diary() {
        assert_eq!(Screen::default(), Screen::Onboarding);
        assert_eq!(Screen::Onboarding.next(NavEvent::Start), Ok(Screen::Diary));
        assert!(Screen::Onboarding.next(NavEvent::OpenProfile).is_err());
    }

    #[test]
    fn test_add_flow() {
        let screen = walk(
            Screen::Diary,
            &[
                NavEvent::AddSweets {
                    category: Category::Icecream,
                },
                NavEvent::SelectCategory {
                    category: Category::Cake,
                },
                NavEvent::SelectFood { food_id: 31 },
            ],
        )
        .unwrap();
        assert_eq!(
            screen,
            Screen::ProductDetail {
                food_id: 31,
                category: Category::Cake,
                editing: None
            }
        );

        assert_eq!(
            screen.next(NavEvent::Back),
            Ok(Screen::AddSweets {
                category: Category::Cake
            })
        );
        assert_eq!(screen.next(NavEvent::SaveEntry), Ok(Screen::Diary));
    }

    #[test]
    fn test_edit_back_returns_to_diary() {
        let screen = Screen::Diary
            .next(NavEvent::EditEntry {
                entry_id: 4,
                food_id: 12,
                category: Category::Chocolate,
            })
            .unwrap();
        assert_eq!(screen.next(NavEvent::Back), Ok(Screen::Diary));
    }

    #[test]
    fn test_pro_for_premium_goes_to_statistics() {
        assert_eq!(
            Screen::Profile.next(NavEvent::OpenPro { is_premium: true }),
            Ok(Screen::Statistics)
        );
        assert_eq!(
            Screen::Profile.next(NavEvent::OpenPro { is_premium: false }),
            Ok(Screen::Pro)
        );
    }

    #[test]
    fn test_purchase_flow() {
        let screen = walk(
            Screen::Diary,
            &[
                NavEvent::OpenPro { is_premium: false },
                NavEvent::PurchaseCompleted,
                NavEvent::GoToCharts,
            ],
        );
        assert_eq!(screen, Ok(Screen::Statistics));
    }

    #[test]
    fn test_settings_flow_and_account_deletion() {
        let screen = walk(
            Screen::Diary,
            &[
                NavEvent::OpenProfile,
                NavEvent::OpenSettings,
                NavEvent::OpenSugarLimit,
                NavEvent::Back,
            ],
        )
        .unwrap();
        assert_eq!(screen, Screen::Settings);
        assert_eq!(screen.next(NavEvent::Back), Ok(Screen::Profile));
        assert_eq!(screen.next(NavEvent::DeleteAccount), Ok(Screen::Onboarding));
    }

    #[test]
    fn test_invalid_transition() {
        let err = Screen::Statistics.next(NavEvent::SaveEntry).unwrap_err();
        assert_eq!(
            err,
            NavError::InvalidTransition {
                screen: "statistics",
                event: "save_entry"
            }
        );
        // no tab bar on the welcome screen
        assert!(Screen::PremiumWelcome.next(NavEvent::OpenDiary).is_err());
    }

    #[test]
    fn test_parse_event() {
        assert_eq!(
            NavEvent::parse("add_sweets", Some("candies"), None, None, false),
            Ok(NavEvent::AddSweets {
                category: Category::Candies
            })
        );
        assert_eq!(
            NavEvent::parse("open_pro", None, None, None, true),
            Ok(NavEvent::OpenPro { is_premium: true })
        );
        assert!(matches!(
            NavEvent::parse("select_food", None, None, None, false),
            Err(NavError::MissingField { .. })
        ));
        assert!(matches!(
            NavEvent::parse("add_sweets", Some("pie"), None, None, false),
            Err(NavError::UnknownCategory(_))
        ));
        assert!(matches!(
            NavEvent::parse("fly", None, None, None, false),
            Err(NavError::UnknownEvent(_))
        ));
    }
}
