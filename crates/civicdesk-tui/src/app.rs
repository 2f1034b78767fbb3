//! Application state management for civicdesk.
//!
//! `App` owns the UI state, the current location and the data behind each
//! page. Network calls run as spawned tasks and report back through an mpsc
//! channel; who is logged in is observed through the session store's watch
//! channel and re-checked against the route guard on every tick.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use civicdesk_core::api::{ApiClient, ApiError};
use civicdesk_core::config::Config;
use civicdesk_core::fetch::Loadable;
use civicdesk_core::models::{
    filter_tasks, DashboardOverview, LoginResponse, OptimizationReport, PredictionReport, Role,
    StatusMessage, Task, TaskComment, TaskFilter, TaskStatus, User, DEFAULT_MODEL_TYPE,
    DEFAULT_PREDICTION_PERIODS, DEPARTMENTS,
};
use civicdesk_core::routes::{resolve, Navigation, Route};
use civicdesk_core::session::{Phase, Session, SessionError, SessionStore};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for username input.
const MAX_USERNAME_LENGTH: usize = 50;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Number of items to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

/// How long a notification stays in the status bar
const NOTIFICATION_TTL: Duration = Duration::from_secs(5);

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Searching,
    ShowingHelp,
    ShowingComments,
    ConfirmingDelete,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoginFocus {
    Username,
    Password,
    Button,
}

/// What the main area currently shows for the location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Loading,
    Login,
    Page(Route),
    NotFound,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent back from spawned network tasks.
enum BackgroundResult {
    /// Persisted credential resolved at startup
    Initialized(Phase),
    Login(Result<LoginResponse, SessionError>),
    Dashboard(Result<DashboardOverview, ApiError>),
    Tasks(Result<Vec<Task>, ApiError>),
    /// Comments for a task (task id, comments)
    Comments(String, Result<Vec<TaskComment>, ApiError>),
    /// Status change for a task (task id, new status, server reply)
    StatusChanged(String, TaskStatus, Result<StatusMessage, ApiError>),
    TaskDeleted(String, Result<serde_json::Value, ApiError>),
    Predictions(Result<PredictionReport, ApiError>),
    Optimization(Result<OptimizationReport, ApiError>),
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub config: Config,
    pub api: ApiClient,
    store: Arc<SessionStore<ApiClient>>,
    session_rx: watch::Receiver<Session>,
    /// Latest session snapshot
    pub session: Session,

    // Navigation
    pub state: AppState,
    /// Requested path, as typed on the command line or picked in the menu
    pub location: String,
    pub screen: Screen,
    mounted: Option<Route>,

    // Login form state
    pub login_username: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,
    pub login_pending: bool,

    // Page data
    pub dashboard: Loadable<DashboardOverview>,
    pub tasks: Loadable<Vec<Task>>,
    pub task_status_filter: Option<TaskStatus>,
    pub search_query: String,
    pub task_selection: usize,
    pub comments: Loadable<Vec<TaskComment>>,
    /// Task whose comments are open (id, display name)
    pub comments_task: Option<(String, String)>,
    pub analytics_department: String,
    pub predictions: Loadable<PredictionReport>,
    pub optimization: Loadable<OptimizationReport>,

    // Background task channel
    results_rx: mpsc::Receiver<BackgroundResult>,
    results_tx: mpsc::Sender<BackgroundResult>,

    // Transient notification
    pub status_message: Option<String>,
    status_set_at: Option<Instant>,
}

impl App {
    /// Create the app at `start_path`, or the root path when none is given.
    pub fn new(config: Config, store: Arc<SessionStore<ApiClient>>, start_path: Option<&str>) -> Self {
        let api = store.identity().clone();
        let session_rx = store.subscribe();
        let session = session_rx.borrow().clone();

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let login_username = config.initial_username().unwrap_or_default();
        let location = start_path.unwrap_or("/").to_string();
        debug!(%location, "App created");

        Self {
            config,
            api,
            store,
            session_rx,
            session,

            state: AppState::Normal,
            location,
            screen: Screen::Loading,
            mounted: None,

            login_focus: if login_username.is_empty() {
                LoginFocus::Username
            } else {
                LoginFocus::Password
            },
            login_username,
            login_password: String::new(),
            login_error: None,
            login_pending: false,

            dashboard: Loadable::Idle,
            tasks: Loadable::Idle,
            task_status_filter: None,
            search_query: String::new(),
            task_selection: 0,
            comments: Loadable::Idle,
            comments_task: None,
            analytics_department: DEPARTMENTS[0].to_string(),
            predictions: Loadable::Idle,
            optimization: Loadable::Idle,

            results_rx: rx,
            results_tx: tx,

            status_message: None,
            status_set_at: None,
        }
    }

    /// Resolve the persisted credential in the background
    pub fn start_session(&self) {
        let store = Arc::clone(&self.store);
        self.spawn(async move { BackgroundResult::Initialized(store.initialize().await) });
    }

    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = BackgroundResult> + Send + 'static,
    {
        let tx = self.results_tx.clone();
        tokio::spawn(async move {
            if tx.send(task.await).await.is_err() {
                debug!("Result channel closed, dropping background result");
            }
        });
    }

    pub fn user(&self) -> Option<&User> {
        self.session.user.as_ref()
    }

    pub fn current_route(&self) -> Option<Route> {
        match self.screen {
            Screen::Page(route) => Some(route),
            _ => None,
        }
    }

    // =========================================================================
    // Main loop hooks
    // =========================================================================

    /// Drain finished background work, then re-run the guard for the
    /// current location.
    pub fn tick(&mut self) {
        let mut results = Vec::new();
        while let Ok(result) = self.results_rx.try_recv() {
            results.push(result);
        }
        for result in results {
            self.process_result(result);
        }

        self.sync_view();

        if self
            .status_set_at
            .is_some_and(|at| at.elapsed() >= NOTIFICATION_TTL)
        {
            self.status_message = None;
            self.status_set_at = None;
        }
    }

    /// Pick up session changes and resolve the location into a screen,
    /// following redirects.
    pub fn sync_view(&mut self) {
        if self.session_rx.has_changed().unwrap_or(false) {
            self.session = self.session_rx.borrow_and_update().clone();
        }

        let screen = loop {
            match resolve(&self.location, &self.session) {
                Navigation::Redirect(route) => self.redirect(route),
                Navigation::Show(Route::Login) => break Screen::Login,
                Navigation::Show(route) => break Screen::Page(route),
                Navigation::Loading => break Screen::Loading,
                Navigation::NotFound => break Screen::NotFound,
            }
        };

        match screen {
            Screen::Page(route) if self.mounted != Some(route) => self.mount(route),
            Screen::Page(_) => {}
            _ => self.mounted = None,
        }
        self.screen = screen;
    }

    fn redirect(&mut self, route: Route) {
        debug!(from = %self.location, to = %route, "Redirecting");
        if route == Route::Login {
            self.clear_pages();
            self.login_focus = if self.login_username.is_empty() {
                LoginFocus::Username
            } else {
                LoginFocus::Password
            };
        }
        self.location = route.path().to_string();
    }

    /// Drop everything fetched for the previous user
    fn clear_pages(&mut self) {
        self.mounted = None;
        self.dashboard = Loadable::Idle;
        self.tasks = Loadable::Idle;
        self.comments = Loadable::Idle;
        self.comments_task = None;
        self.predictions = Loadable::Idle;
        self.optimization = Loadable::Idle;
        self.task_selection = 0;
        self.search_query.clear();
        if !matches!(self.state, AppState::ConfirmingQuit | AppState::Quitting) {
            self.state = AppState::Normal;
        }
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Submit the login form
    pub fn submit_login(&mut self) {
        if self.login_pending {
            return;
        }
        if self.login_username.trim().is_empty() || self.login_password.is_empty() {
            self.login_error = Some(SessionError::MissingCredentials.user_message());
            return;
        }

        self.login_error = None;
        self.login_pending = true;

        let store = Arc::clone(&self.store);
        let username = self.login_username.trim().to_string();
        let password = self.login_password.clone();
        self.spawn(async move { BackgroundResult::Login(store.login(&username, &password).await) });
    }

    pub fn logout(&mut self) {
        self.store.logout();
        self.notify("Logged out");
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn navigate(&mut self, route: Route) {
        if self.location != route.path() {
            self.location = route.path().to_string();
            self.state = AppState::Normal;
        }
    }

    pub fn next_page(&mut self) {
        let next = self.current_route().map_or(Route::DEFAULT, |r| r.next());
        self.navigate(next);
    }

    pub fn prev_page(&mut self) {
        let prev = self.current_route().map_or(Route::DEFAULT, |r| r.prev());
        self.navigate(prev);
    }

    fn mount(&mut self, route: Route) {
        debug!(%route, "Mounting page");
        self.mounted = Some(route);
        self.load_page(route);
    }

    /// Refetch the data behind the current page
    pub fn refresh(&mut self) {
        let Some(route) = self.current_route() else {
            return;
        };
        match route {
            Route::Dashboard => self.dashboard = Loadable::Idle,
            Route::Tasks => self.tasks = Loadable::Idle,
            Route::Analytics => {
                self.predictions = Loadable::Idle;
                self.optimization = Loadable::Idle;
            }
            _ => return,
        }
        self.notify(format!("Refreshing {}...", route.title()));
        self.load_page(route);
    }

    fn load_page(&mut self, route: Route) {
        let Some(user) = self.session.user.clone() else {
            return;
        };
        let api = self.api.clone();

        match route {
            Route::Dashboard => {
                if self.dashboard.start() {
                    let department = match user.role {
                        Role::DepartmentHead => user.department.clone(),
                        _ => None,
                    };
                    self.spawn(async move {
                        BackgroundResult::Dashboard(api.dashboard_overview(department.as_deref()).await)
                    });
                }
            }
            Route::Tasks => {
                if self.tasks.start() {
                    let filter = TaskFilter::for_user(&user);
                    self.spawn(async move { BackgroundResult::Tasks(api.list_tasks(&filter).await) });
                }
            }
            Route::Analytics => {
                self.analytics_department = analytics_department(&user);
                if self.predictions.start() {
                    let api = api.clone();
                    let department = self.analytics_department.clone();
                    self.spawn(async move {
                        BackgroundResult::Predictions(
                            api.predictions(&department, DEFAULT_PREDICTION_PERIODS, DEFAULT_MODEL_TYPE)
                                .await,
                        )
                    });
                }
                if self.optimization.start() {
                    let department = self.analytics_department.clone();
                    self.spawn(async move {
                        BackgroundResult::Optimization(api.optimal_allocation(&department).await)
                    });
                }
            }
            _ => {}
        }
    }

    // =========================================================================
    // Background Results
    // =========================================================================

    fn process_result(&mut self, result: BackgroundResult) {
        match result {
            BackgroundResult::Initialized(phase) => {
                info!(?phase, "Session initialized");
            }
            BackgroundResult::Login(result) => {
                self.login_pending = false;
                match result {
                    Ok(response) => self.on_login(response),
                    Err(e) => {
                        warn!(error = %e, "Login failed");
                        self.login_error = Some(e.user_message());
                    }
                }
            }
            // Page results that land after a logout belong to nobody
            _ if !self.store.session().is_authenticated() => {
                debug!("Dropping page result for a closed session");
            }
            BackgroundResult::Dashboard(result) => self.dashboard = self.loaded(result),
            BackgroundResult::Tasks(result) => {
                self.tasks = self.loaded(result);
                self.clamp_task_selection();
            }
            BackgroundResult::Comments(task_id, result) => {
                if self.comments_task.as_ref().is_some_and(|(id, _)| *id == task_id) {
                    self.comments = self.loaded(result);
                }
            }
            BackgroundResult::StatusChanged(task_id, status, result) => match result {
                Ok(reply) => {
                    if let Some(task) = self
                        .tasks
                        .data_mut()
                        .and_then(|tasks| tasks.iter_mut().find(|t| t.id == task_id))
                    {
                        task.status = status;
                    }
                    self.notify(reply.message);
                }
                Err(e) => self.report(&e),
            },
            BackgroundResult::TaskDeleted(task_id, result) => match result {
                Ok(_) => {
                    if let Some(tasks) = self.tasks.data_mut() {
                        tasks.retain(|t| t.id != task_id);
                    }
                    self.clamp_task_selection();
                    self.notify("Task deleted");
                }
                Err(e) => self.report(&e),
            },
            BackgroundResult::Predictions(result) => self.predictions = self.loaded(result),
            BackgroundResult::Optimization(result) => self.optimization = self.loaded(result),
        }
    }

    fn on_login(&mut self, response: LoginResponse) {
        self.config.last_username = Some(response.user.username.clone());
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }
        self.login_password.clear();
        self.login_error = None;
        self.notify("Login successful");
        self.location = Route::DEFAULT.path().to_string();
    }

    fn loaded<T>(&mut self, result: Result<T, ApiError>) -> Loadable<T> {
        match result {
            Ok(data) => Loadable::Ready(data),
            Err(e) => {
                self.report(&e);
                Loadable::Failed(e.user_message())
            }
        }
    }

    /// Surface a failed call as a notification. A rejected session has
    /// already been cleared by the response policy.
    fn report(&mut self, error: &ApiError) {
        warn!(error = %error, "Request failed");
        self.notify(error.user_message());
    }

    pub fn notify(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_set_at = Some(Instant::now());
    }

    // =========================================================================
    // Tasks page
    // =========================================================================

    /// Tasks after the status filter and search query are applied
    pub fn visible_tasks(&self) -> Vec<&Task> {
        match self.tasks.data() {
            Some(tasks) => filter_tasks(tasks, self.task_status_filter, &self.search_query),
            None => Vec::new(),
        }
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.visible_tasks().get(self.task_selection).copied()
    }

    pub fn move_task_selection(&mut self, delta: isize) {
        let len = self.visible_tasks().len();
        if len == 0 {
            self.task_selection = 0;
            return;
        }
        let next = self.task_selection as isize + delta;
        self.task_selection = next.clamp(0, len as isize - 1) as usize;
    }

    fn clamp_task_selection(&mut self) {
        let len = self.visible_tasks().len();
        self.task_selection = self.task_selection.min(len.saturating_sub(1));
    }

    /// All, then each status in workflow order
    pub fn cycle_status_filter(&mut self) {
        self.task_status_filter = match self.task_status_filter {
            None => Some(TaskStatus::Pending),
            Some(TaskStatus::Pending) => Some(TaskStatus::InProgress),
            Some(TaskStatus::InProgress) => Some(TaskStatus::Completed),
            Some(TaskStatus::Completed) => Some(TaskStatus::Canceled),
            Some(TaskStatus::Canceled) => None,
        };
        self.task_selection = 0;
    }

    pub fn set_search_query(&mut self, query: String) {
        self.search_query = query;
        self.task_selection = 0;
    }

    pub fn can_delete_tasks(&self) -> bool {
        self.user().is_some_and(|u| u.role.is_manager())
    }

    pub fn advance_selected_task(&mut self) {
        let Some(task) = self.selected_task() else {
            return;
        };
        if task.status.is_terminal() {
            let message = format!("{} is already {}", task.task_id, task.status);
            self.notify(message);
            return;
        }

        let id = task.id.clone();
        let status = task.status.advance();
        let api = self.api.clone();
        self.spawn(async move {
            let result = api.update_task_status(&id, status).await;
            BackgroundResult::StatusChanged(id, status, result)
        });
    }

    pub fn request_delete(&mut self) {
        if self.selected_task().is_none() {
            return;
        }
        if !self.can_delete_tasks() {
            self.notify("Staff members cannot delete tasks");
            return;
        }
        self.state = AppState::ConfirmingDelete;
    }

    pub fn confirm_delete(&mut self) {
        self.state = AppState::Normal;
        let Some(task) = self.selected_task() else {
            return;
        };
        let id = task.id.clone();
        let api = self.api.clone();
        self.spawn(async move {
            let result = api.delete_task(&id).await;
            BackgroundResult::TaskDeleted(id, result)
        });
    }

    pub fn open_comments(&mut self) {
        let Some(task) = self.selected_task() else {
            return;
        };
        let id = task.id.clone();
        let name = task.task_name.clone();
        self.comments_task = Some((id.clone(), name));
        self.comments = Loadable::Loading;
        self.state = AppState::ShowingComments;

        let api = self.api.clone();
        self.spawn(async move {
            let result = api.task_comments(&id).await;
            BackgroundResult::Comments(id, result)
        });
    }

    pub fn close_comments(&mut self) {
        self.state = AppState::Normal;
        self.comments_task = None;
        self.comments = Loadable::Idle;
    }
}

/// Department shown on the analytics page: the user's own when the
/// backend knows it, otherwise the first one.
fn analytics_department(user: &User) -> String {
    user.department
        .as_deref()
        .filter(|d| DEPARTMENTS.contains(d))
        .unwrap_or(DEPARTMENTS[0])
        .to_string()
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if a username character should be accepted
pub fn can_add_username_char(current_len: usize, c: char) -> bool {
    current_len < MAX_USERNAME_LENGTH && is_valid_input_char(c)
}

/// Check if a password character should be accepted
pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================
