//! Sugar Insider MCP Server Implementation
//!
//! Implements the MCP server with all Sugar Insider tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::info;

use crate::app::{NavEvent, Screen};
use crate::db::Database;
use crate::models::Settings;
use crate::notifications::NotificationService;
use crate::tools::settings::SettingsChanges;
use crate::tools::status::StatusTracker;
use crate::tools::{catalog, diary, reports, settings, statistics};

/// Sugar Insider MCP Service
#[derive(Clone)]
pub struct SugarInsiderService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    notifier: Arc<Mutex<NotificationService>>,
    screen: Arc<Mutex<Screen>>,
    reports_dir: PathBuf,
    tool_router: ToolRouter<SugarInsiderService>,
}

impl SugarInsiderService {
    pub fn new(
        database_path: PathBuf,
        database: Database,
        notifier: NotificationService,
        reports_dir: PathBuf,
    ) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path))),
            database,
            notifier: Arc::new(Mutex::new(notifier)),
            screen: Arc::new(Mutex::new(Screen::default())),
            reports_dir,
            tool_router: Self::tool_router(),
        }
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn today() -> String {
    chrono::Local::now().date_naive().to_string()
}

// ============================================================================
// Response Structs
// ============================================================================

#[derive(Debug, Serialize)]
struct NavigateResponse {
    from: Screen,
    to: Screen,
}

// ============================================================================
// Catalog Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListCatalogParams {
    /// Category filter: icecream, chocolate, candies or cake (optional)
    pub category: Option<String>,
    /// Case-insensitive name search (optional)
    pub query: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetFoodParams {
    /// Catalog food ID (1-40)
    pub id: i64,
    /// Portion to preview, e.g. "200g" or "7oz" (defaults to the first preset)
    pub portion: Option<String>,
}

// ============================================================================
// Diary Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogEntryParams {
    /// Catalog food ID
    pub food_id: i64,
    /// Portion, e.g. "100g", "250g", "3.5oz"
    pub portion: String,
    /// Date in ISO format: YYYY-MM-DD (defaults to today)
    pub date: Option<String>,
    /// Category the entry is filed under (defaults to the food's category)
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct EditEntryParams {
    /// Entry ID
    pub id: i64,
    /// New portion, e.g. "300g"
    pub portion: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteEntryParams {
    /// Entry ID
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetDayParams {
    /// Date in ISO format: YYYY-MM-DD (defaults to today)
    pub date: Option<String>,
}

// ============================================================================
// Statistics Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetStatisticsParams {
    /// Period: day (last 7 days), week (last 4 weeks) or month (last 31 days)
    pub period: String,
    /// Last day of the period in ISO format (defaults to today)
    pub reference_date: Option<String>,
    /// Whether empty buckets count towards the average: include or exclude.
    /// Defaults to include for day/week and exclude for month.
    pub zero_buckets: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GenerateStatisticsReportParams {
    /// Period: day, week or month
    pub period: String,
    /// Last day of the period in ISO format (defaults to today)
    pub reference_date: Option<String>,
    /// Output directory (defaults to the reports directory next to the database)
    pub output_dir: Option<String>,
}

// ============================================================================
// Settings Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ConvertUnitsParams {
    /// Quantity: weight, height or sugar
    pub quantity: String,
    /// Value in the source unit system (kg/cm/g or lbs/in/oz)
    pub value: f64,
    /// Source unit system: european or american
    pub from: String,
    /// Target unit system: european or american
    pub to: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateSettingsParams {
    /// Unit system: european or american
    pub unit_system: Option<String>,
    /// Language: English, French or Russian
    pub language: Option<String>,
    /// Enable the daily reminder
    pub reminder_enabled: Option<bool>,
    /// Reminder time, 24h HH:MM
    pub reminder_time: Option<String>,
    /// Enable the daily sugar limit
    pub sugar_limit_enabled: Option<bool>,
    /// Daily sugar limit in grams
    pub daily_sugar_limit: Option<f64>,
    /// Daily sugar limit in the user's unit system (grams or ounces)
    pub sugar_limit_display: Option<f64>,
    /// Premium status
    pub is_premium: Option<bool>,
    /// Daily carbohydrate target in grams
    pub carbohydrates_target: Option<f64>,
    /// Daily protein target in grams
    pub protein_target: Option<f64>,
    /// Daily fat target in grams
    pub fats_target: Option<f64>,
}

impl From<UpdateSettingsParams> for SettingsChanges {
    fn from(p: UpdateSettingsParams) -> Self {
        SettingsChanges {
            unit_system: p.unit_system,
            language: p.language,
            reminder_enabled: p.reminder_enabled,
            reminder_time: p.reminder_time,
            sugar_limit_enabled: p.sugar_limit_enabled,
            daily_sugar_limit: p.daily_sugar_limit,
            sugar_limit_display: p.sugar_limit_display,
            is_premium: p.is_premium,
            carbohydrates_target: p.carbohydrates_target,
            protein_target: p.protein_target,
            fats_target: p.fats_target,
        }
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateProfileParams {
    /// Display name
    pub name: Option<String>,
    /// Weight in the user's unit system, e.g. "60kg" or "132lbs"
    pub weight: Option<String>,
    /// Height in the user's unit system, e.g. "170cm" or 5'7"
    pub height: Option<String>,
    /// Birth date in ISO format: YYYY-MM-DD
    pub birth_date: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteAccountParams {
    /// REQUIRED: Must be true to confirm deletion
    #[serde(default)]
    pub force: bool,
}

// ============================================================================
// Navigation Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct NavigateParams {
    /// Event: start, back, open_diary, open_profile, open_statistics, open_pro,
    /// add_sweets, edit_entry, select_category, select_food, save_entry,
    /// open_personal_data, open_settings, open_sugar_limit, delete_account,
    /// purchase_completed, close_welcome, go_to_charts
    pub event: String,
    /// Category for add_sweets, select_category and edit_entry
    pub category: Option<String>,
    /// Food ID for select_food and edit_entry
    pub food_id: Option<i64>,
    /// Entry ID for edit_entry
    pub entry_id: Option<i64>,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl SugarInsiderService {
    // --- Status ---

    #[tool(description = "Get the current status of the Sugar Insider service including build info, database status, and process information")]
    async fn sugar_insider_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        json_result(&tracker.get_status())
    }

    #[tool(description = "Get step-by-step instructions for logging sweets and reading statistics. Call this when starting a new session or when unsure how to use the diary tools.")]
    fn diary_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::DIARY_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(DIARY_INSTRUCTIONS)]))
    }

    // --- Catalog ---

    #[tool(description = "List catalog sweets, optionally filtered by category and name")]
    fn list_catalog(&self, Parameters(p): Parameters<ListCatalogParams>) -> Result<CallToolResult, McpError> {
        let result = catalog::list_catalog(p.category.as_deref(), p.query.as_deref())
            .map_err(|e| McpError::invalid_params(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get a catalog food with per-100g values, portion presets and a nutrition preview for a portion")]
    fn get_food(&self, Parameters(p): Parameters<GetFoodParams>) -> Result<CallToolResult, McpError> {
        let result = catalog::get_food(&self.database, p.id, p.portion.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Diary ---

    #[tool(description = "Log a portion of a catalog food to the diary. Returns the entry, the day's totals and a sugar alert when the daily limit is exceeded.")]
    async fn log_entry(&self, Parameters(p): Parameters<LogEntryParams>) -> Result<CallToolResult, McpError> {
        let notifier = self.notifier.lock().await;
        let date = p.date.unwrap_or_else(today);
        let result = diary::log_entry(&self.database, &notifier, p.food_id, &p.portion, &date, p.category.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Change the portion of a diary entry. Nutrition is recomputed; date and category are kept.")]
    async fn edit_entry(&self, Parameters(p): Parameters<EditEntryParams>) -> Result<CallToolResult, McpError> {
        let notifier = self.notifier.lock().await;
        let result = diary::edit_entry(&self.database, &notifier, p.id, &p.portion)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Delete a diary entry")]
    fn delete_entry(&self, Parameters(p): Parameters<DeleteEntryParams>) -> Result<CallToolResult, McpError> {
        let result = diary::delete_entry(&self.database, p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get a day's entries, nutrition totals, macro progress against targets and macro split")]
    fn get_day(&self, Parameters(p): Parameters<GetDayParams>) -> Result<CallToolResult, McpError> {
        let date = p.date.unwrap_or_else(today);
        let result = diary::get_day(&self.database, &date)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Statistics ---

    #[tool(description = "Get calorie and sugar charts for a period ending at a reference date: 7 days, 4 weeks or 31 days, with the average calories")]
    fn get_statistics(&self, Parameters(p): Parameters<GetStatisticsParams>) -> Result<CallToolResult, McpError> {
        let reference = p.reference_date.unwrap_or_else(today);
        let result = statistics::get_statistics(&self.database, &p.period, &reference, p.zero_buckets.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Generate a PDF statistics report (summary, per-bucket table, nutrition totals and sugar chart) for a period")]
    fn generate_statistics_report(&self, Parameters(p): Parameters<GenerateStatisticsReportParams>) -> Result<CallToolResult, McpError> {
        let reference = p.reference_date.unwrap_or_else(today);
        let output_dir = p
            .output_dir
            .unwrap_or_else(|| self.reports_dir.display().to_string());
        let result = reports::generate_statistics_report(&self.database, &p.period, &reference, &output_dir)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Units ---

    #[tool(description = "Convert a weight (kg/lbs), height (cm/in) or sugar (g/oz) value between european and american units")]
    fn convert_units(&self, Parameters(p): Parameters<ConvertUnitsParams>) -> Result<CallToolResult, McpError> {
        let result = settings::convert_units(&p.quantity, p.value, &p.from, &p.to)
            .map_err(|e| McpError::invalid_params(e, None))?;
        json_result(&result)
    }

    // --- Settings ---

    #[tool(description = "Get the app settings: unit system, language, reminder, sugar limit, premium status and macro targets")]
    fn get_settings(&self) -> Result<CallToolResult, McpError> {
        let result = settings::get_settings(&self.database)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Update app settings. Only provided fields change. The sugar limit can be given in grams or in the user's display unit.")]
    async fn update_settings(&self, Parameters(p): Parameters<UpdateSettingsParams>) -> Result<CallToolResult, McpError> {
        let mut notifier = self.notifier.lock().await;
        let result = settings::update_settings(&self.database, &mut notifier, p.into())
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get the next scheduled daily reminder, if reminders are enabled")]
    async fn next_reminder(&self) -> Result<CallToolResult, McpError> {
        let notifier = self.notifier.lock().await;
        let now = chrono::Local::now().naive_local();
        json_result(&settings::next_reminder(&notifier, now))
    }

    #[tool(description = "Get the user profile with age and weight/height in the user's unit system")]
    fn get_profile(&self) -> Result<CallToolResult, McpError> {
        let result = settings::get_profile(&self.database)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Update the user profile. Weight and height are read in the user's unit system.")]
    fn update_profile(&self, Parameters(p): Parameters<UpdateProfileParams>) -> Result<CallToolResult, McpError> {
        let result = settings::update_profile(
            &self.database,
            p.name,
            p.weight.as_deref(),
            p.height.as_deref(),
            p.birth_date.as_deref(),
        )
        .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Delete the account: removes all diary entries and resets settings and profile. Requires force=true.")]
    async fn delete_account(&self, Parameters(p): Parameters<DeleteAccountParams>) -> Result<CallToolResult, McpError> {
        if !p.force {
            return Err(McpError::invalid_params(
                "Deleting the account removes all data permanently. Set force=true to confirm.",
                None,
            ));
        }

        let mut notifier = self.notifier.lock().await;
        let result = settings::delete_account(&self.database, &mut notifier)
            .map_err(|e| McpError::internal_error(e, None))?;

        *self.screen.lock().await = Screen::default();
        json_result(&result)
    }

    // --- Navigation ---

    #[tool(description = "Apply a navigation event to the current screen and return the new screen. Invalid events leave the screen unchanged.")]
    async fn navigate(&self, Parameters(p): Parameters<NavigateParams>) -> Result<CallToolResult, McpError> {
        let is_premium = self
            .database
            .with_conn(|conn| Settings::get(conn))
            .map(|s| s.is_premium)
            .map_err(|e| McpError::internal_error(format!("Failed to get settings: {}", e), None))?;

        let event = NavEvent::parse(&p.event, p.category.as_deref(), p.food_id, p.entry_id, is_premium)
            .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

        let mut screen = self.screen.lock().await;
        let from = *screen;
        let to = from
            .next(event)
            .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
        *screen = to;

        info!("Navigated {} -> {}", from.name(), to.name());
        json_result(&NavigateResponse { from, to })
    }

    #[tool(description = "Get the current screen")]
    async fn current_screen(&self) -> Result<CallToolResult, McpError> {
        let screen = self.screen.lock().await;
        json_result(&*screen)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for SugarInsiderService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "sugar-insider".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Sugar Insider".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Sugar Insider - Sweets diary with calorie and sugar tracking. \
                 IMPORTANT: Call diary_instructions before logging. \
                 Catalog: list_catalog, get_food. \
                 Diary: log_entry/edit_entry/delete_entry, get_day. \
                 Statistics: get_statistics (day/week/month), generate_statistics_report (PDF). \
                 Settings: get_settings/update_settings, next_reminder, convert_units. \
                 Profile: get_profile/update_profile. delete_account requires force=true. \
                 Navigation: navigate, current_screen."
                    .into(),
            ),
        }
    }
}
