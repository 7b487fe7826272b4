// app.rs
//
// Per-screen controllers. Each one owns the entity sequence for its scope,
// an edit session, and the input buffers the TUI types into. Every mutation
// runs ownership check, then gateway write, then in-place store update, so a
// failed write leaves the store exactly as it was.

use chrono::{Duration, Local, NaiveDate};

use crate::config::{self, GatewayConfig};
use crate::edit::EditSession;
use crate::entities::{
    DEFAULT_PLANNER_EMOJI, Entity, ITEM_EMOJIS, PROJECT_EMOJIS, PlannerEntry, Project, TodoItem,
    User,
};
use crate::error::{AppError, GatewayError};
use crate::filter::{DateRange, OwnerFilter, text_matches};
use crate::gateway::{
    Gateway, HttpGateway, NewPlannerEntry, NewProject, NewTodoItem, PlannerEntryPatch,
    ProjectPatch, TodoItemPatch,
};
use crate::notify::Notices;
use crate::session::Session;
use crate::store::EntityStore;

fn cycle_emoji(slot: &mut Option<usize>, len: usize, forward: bool) {
    *slot = match (*slot, forward) {
        (None, true) => Some(0),
        (None, false) => Some(len - 1),
        (Some(i), true) if i + 1 < len => Some(i + 1),
        (Some(_), true) => None,
        (Some(0), false) => None,
        (Some(i), false) => Some(i - 1),
    };
}

fn parse_deadline(input: &str, today: NaiveDate) -> Result<Option<NaiveDate>, AppError> {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return Ok(None);
    }
    match input.as_str() {
        "today" => Ok(Some(today)),
        "tomorrow" | "tmr" => Ok(Some(today + Duration::days(1))),
        other => NaiveDate::parse_from_str(other, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                AppError::validation("unrecognized deadline - use YYYY-MM-DD, 'today' or 'tomorrow'")
            }),
    }
}

pub struct ProjectsPage {
    pub store: EntityStore<Project>,
    pub users: Vec<User>,
    pub owner_filter: OwnerFilter,
    pub edit: EditSession<Project>,
    pub input_name: String,
    pub new_emoji: Option<usize>,
    pub selected: usize,
    pub loaded: bool,
}

impl ProjectsPage {
    pub fn new() -> Self {
        Self {
            store: EntityStore::new(),
            users: Vec::new(),
            owner_filter: OwnerFilter::All,
            edit: EditSession::new(),
            input_name: String::new(),
            new_emoji: None,
            selected: 0,
            loaded: false,
        }
    }

    pub fn load(&mut self, gw: &dyn Gateway) -> Result<(), AppError> {
        self.users = gw.list_users()?;
        self.store.load(gw.list_projects()?);
        self.loaded = true;
        self.clamp_selection();
        Ok(())
    }

    pub fn visible(&self) -> Vec<&Project> {
        self.store
            .iter()
            .filter(|p| self.owner_filter.matches(*p))
            .collect()
    }

    pub fn selected_project(&self) -> Option<&Project> {
        self.visible().get(self.selected).copied()
    }

    fn clamp_selection(&mut self) {
        let len = self.visible().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    pub fn cycle_new_emoji(&mut self, forward: bool) {
        cycle_emoji(&mut self.new_emoji, PROJECT_EMOJIS.len(), forward);
    }

    /// All users, then each known user in turn, then back to all.
    pub fn cycle_owner_filter(&mut self) {
        self.owner_filter = next_owner_filter(&self.owner_filter, &self.users);
        self.clamp_selection();
    }

    pub fn add(&mut self, gw: &dyn Gateway, session: &Session) -> Result<(), AppError> {
        let name = self.input_name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::validation("project name cannot be empty"));
        }
        let emoji = self.new_emoji.map(|i| PROJECT_EMOJIS[i]).unwrap_or("");
        let mut project = gw.insert_project(NewProject {
            name: &name,
            user_id: session.user_id(),
            emoji,
        })?;
        // The table insert does not go through the user-joined view.
        project.user_email = session.email().to_string();
        self.store.append(project);
        self.input_name.clear();
        self.new_emoji = None;
        Ok(())
    }

    pub fn begin_edit(&mut self, session: &Session) -> Result<(), AppError> {
        let target = self
            .selected_project()
            .cloned()
            .ok_or_else(|| AppError::validation("no project selected"))?;
        session.ensure_owner(&target, "edit", "projects")?;
        self.edit.begin(&target);
        Ok(())
    }

    pub fn save_edit(&mut self, gw: &dyn Gateway, session: &Session) -> Result<(), AppError> {
        let draft = self
            .edit
            .draft()
            .cloned()
            .ok_or_else(|| AppError::validation("no edit in progress"))?;
        let name = draft.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::validation("project name cannot be empty"));
        }
        session.ensure_owner(&draft, "edit", "projects")?;
        gw.update_project(
            &draft.id,
            ProjectPatch {
                name: Some(name.clone()),
                emoji: Some(draft.emoji.clone()),
            },
        )?;
        self.store.replace(&draft.id, |p| {
            p.name = name;
            p.emoji = draft.emoji.clone();
        });
        self.edit.cancel();
        Ok(())
    }

    pub fn delete_selected(&mut self, gw: &dyn Gateway, session: &Session) -> Result<(), AppError> {
        let target = self
            .selected_project()
            .cloned()
            .ok_or_else(|| AppError::validation("no project selected"))?;
        session.ensure_owner(&target, "delete", "projects")?;
        gw.delete_project(&target.id)?;
        self.store.remove(&target.id);
        self.clamp_selection();
        Ok(())
    }
}

fn next_owner_filter(current: &OwnerFilter, users: &[User]) -> OwnerFilter {
    let next = match current {
        OwnerFilter::All => users.first().map(|u| u.id.clone()),
        OwnerFilter::User(id) => match users.iter().position(|u| &u.id == id) {
            Some(pos) => users.get(pos + 1).map(|u| u.id.clone()),
            None => None,
        },
    };
    match next {
        Some(id) => OwnerFilter::User(id),
        None => OwnerFilter::All,
    }
}

pub struct TasksPage {
    pub project_id: String,
    pub project_name: String,
    pub store: EntityStore<TodoItem>,
    pub edit: EditSession<TodoItem>,
    pub input_title: String,
    pub input_deadline: String,
    pub new_emoji: Option<usize>,
    pub search_query: String,
    pub selected: usize,
}

impl TasksPage {
    pub fn open(project: &Project) -> Self {
        Self {
            project_id: project.id.clone(),
            project_name: project.name.clone(),
            store: EntityStore::new(),
            edit: EditSession::new(),
            input_title: String::new(),
            input_deadline: String::new(),
            new_emoji: None,
            search_query: String::new(),
            selected: 0,
        }
    }

    pub fn load(&mut self, gw: &dyn Gateway) -> Result<(), AppError> {
        let items = gw.list_todo_items(&self.project_id)?;
        if self.project_name.is_empty() {
            if let Some(first) = items.first() {
                self.project_name = first.project_name.clone();
            }
        }
        self.store.load(items);
        self.clamp_selection();
        Ok(())
    }

    pub fn visible(&self) -> Vec<&TodoItem> {
        self.store
            .iter()
            .filter(|t| text_matches(&t.title, &self.search_query))
            .collect()
    }

    pub fn selected_item(&self) -> Option<&TodoItem> {
        self.visible().get(self.selected).copied()
    }

    fn clamp_selection(&mut self) {
        let len = self.visible().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    pub fn cycle_new_emoji(&mut self, forward: bool) {
        cycle_emoji(&mut self.new_emoji, ITEM_EMOJIS.len(), forward);
    }

    pub fn add(
        &mut self,
        gw: &dyn Gateway,
        session: &Session,
        today: NaiveDate,
    ) -> Result<(), AppError> {
        let title = self.input_title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::validation("task title cannot be empty"));
        }
        let deadline = parse_deadline(&self.input_deadline, today)?;
        let emoji = self.new_emoji.map(|i| ITEM_EMOJIS[i]).unwrap_or("");
        let mut item = gw.insert_todo_item(NewTodoItem {
            title: &title,
            project_id: &self.project_id,
            deadline,
            emoji,
            user_id: session.user_id(),
        })?;
        item.user_email = session.email().to_string();
        item.project_name = self.project_name.clone();
        self.store.append(item);
        self.input_title.clear();
        self.input_deadline.clear();
        self.new_emoji = None;
        Ok(())
    }

    pub fn toggle_selected(&mut self, gw: &dyn Gateway, session: &Session) -> Result<(), AppError> {
        let target = self
            .selected_item()
            .cloned()
            .ok_or_else(|| AppError::validation("no task selected"))?;
        session.ensure_owner(&target, "update", "todo items")?;
        let completed = !target.completed;
        gw.update_todo_item(
            &target.id,
            TodoItemPatch {
                completed: Some(completed),
                ..Default::default()
            },
        )?;
        self.store.replace(&target.id, |t| t.completed = completed);
        Ok(())
    }

    pub fn begin_edit(&mut self, session: &Session) -> Result<(), AppError> {
        let target = self
            .selected_item()
            .cloned()
            .ok_or_else(|| AppError::validation("no task selected"))?;
        session.ensure_owner(&target, "edit", "todo items")?;
        if target.completed {
            return Err(AppError::validation("completed tasks cannot be edited"));
        }
        self.input_deadline = target
            .deadline
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        self.edit.begin(&target);
        Ok(())
    }

    pub fn save_edit(
        &mut self,
        gw: &dyn Gateway,
        session: &Session,
        today: NaiveDate,
    ) -> Result<(), AppError> {
        let draft = self
            .edit
            .draft()
            .cloned()
            .ok_or_else(|| AppError::validation("no edit in progress"))?;
        let title = draft.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::validation("task title cannot be empty"));
        }
        session.ensure_owner(&draft, "edit", "todo items")?;
        let deadline = parse_deadline(&self.input_deadline, today)?;
        gw.update_todo_item(
            &draft.id,
            TodoItemPatch {
                title: Some(title.clone()),
                emoji: Some(draft.emoji.clone()),
                deadline: Some(deadline),
                ..Default::default()
            },
        )?;
        self.store.replace(&draft.id, |t| {
            t.title = title;
            t.emoji = draft.emoji.clone();
            t.deadline = deadline;
        });
        self.edit.cancel();
        self.input_deadline.clear();
        Ok(())
    }

    pub fn delete_selected(&mut self, gw: &dyn Gateway, session: &Session) -> Result<(), AppError> {
        let target = self
            .selected_item()
            .cloned()
            .ok_or_else(|| AppError::validation("no task selected"))?;
        session.ensure_owner(&target, "delete", "todo items")?;
        gw.delete_todo_item(&target.id)?;
        self.store.remove(&target.id);
        self.clamp_selection();
        Ok(())
    }
}

#[derive(Default)]
pub struct PlannerFilters {
    pub owner: OwnerFilter,
    pub search: String,
    pub range: DateRange,
}

pub struct PlannerPage {
    pub store: EntityStore<PlannerEntry>,
    pub users: Vec<User>,
    pub filters: PlannerFilters,
    pub edit: EditSession<PlannerEntry>,
    pub input_content: String,
    pub new_emoji: Option<usize>,
    pub selected: usize,
    pub loaded: bool,
}

impl PlannerPage {
    pub fn new() -> Self {
        Self {
            store: EntityStore::new(),
            users: Vec::new(),
            filters: PlannerFilters::default(),
            edit: EditSession::new(),
            input_content: String::new(),
            new_emoji: None,
            selected: 0,
            loaded: false,
        }
    }

    pub fn load(&mut self, gw: &dyn Gateway) -> Result<(), AppError> {
        self.users = gw.list_users()?;
        // The gateway hands entries back date-descending already.
        self.store.load(gw.list_planner_entries()?);
        self.loaded = true;
        self.clamp_selection();
        Ok(())
    }

    pub fn visible(&self) -> Vec<&PlannerEntry> {
        self.store
            .iter()
            .filter(|e| {
                self.filters.owner.matches(*e)
                    && text_matches(&e.content, &self.filters.search)
                    && self.filters.range.contains(e.date)
            })
            .collect()
    }

    pub fn selected_entry(&self) -> Option<&PlannerEntry> {
        self.visible().get(self.selected).copied()
    }

    fn clamp_selection(&mut self) {
        let len = self.visible().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    pub fn cycle_new_emoji(&mut self, forward: bool) {
        cycle_emoji(&mut self.new_emoji, ITEM_EMOJIS.len(), forward);
    }

    pub fn cycle_owner_filter(&mut self) {
        self.filters.owner = next_owner_filter(&self.filters.owner, &self.users);
        self.clamp_selection();
    }

    pub fn reset_filters(&mut self) {
        self.filters = PlannerFilters::default();
        self.clamp_selection();
    }

    pub fn has_entry_for(&self, user_id: &str, date: NaiveDate) -> bool {
        self.store
            .iter()
            .any(|e| e.date == date && e.user_id == user_id)
    }

    /// One plan per user per day. Creation always targets today, and a second
    /// attempt is rejected before any remote call. Only the loaded sequence
    /// is consulted, so a concurrent session can still slip past this.
    pub fn add(
        &mut self,
        gw: &dyn Gateway,
        session: &Session,
        today: NaiveDate,
    ) -> Result<(), AppError> {
        if self.has_entry_for(session.user_id(), today) {
            return Err(AppError::validation(
                "you already have an entry for today - edit the existing entry instead",
            ));
        }
        let content = self.input_content.trim().to_string();
        if content.is_empty() {
            return Err(AppError::validation(
                "please enter some content for your plan",
            ));
        }
        let emoji = self
            .new_emoji
            .map(|i| ITEM_EMOJIS[i])
            .unwrap_or(DEFAULT_PLANNER_EMOJI);
        let mut entry = gw.insert_planner_entry(NewPlannerEntry {
            date: today,
            content: &content,
            user_id: session.user_id(),
            emoji,
        })?;
        entry.user_email = session.email().to_string();
        self.store.prepend(entry);
        self.input_content.clear();
        self.new_emoji = None;
        Ok(())
    }

    pub fn begin_edit(&mut self, session: &Session) -> Result<(), AppError> {
        let target = self
            .selected_entry()
            .cloned()
            .ok_or_else(|| AppError::validation("no entry selected"))?;
        session.ensure_owner(&target, "edit", "entries")?;
        self.edit.begin(&target);
        Ok(())
    }

    pub fn save_edit(&mut self, gw: &dyn Gateway, session: &Session) -> Result<(), AppError> {
        let draft = self
            .edit
            .draft()
            .cloned()
            .ok_or_else(|| AppError::validation("no edit in progress"))?;
        let content = draft.content.trim().to_string();
        if content.is_empty() {
            return Err(AppError::validation("entry content cannot be empty"));
        }
        session.ensure_owner(&draft, "edit", "entries")?;
        let emoji = if draft.emoji.is_empty() {
            DEFAULT_PLANNER_EMOJI.to_string()
        } else {
            draft.emoji.clone()
        };
        gw.update_planner_entry(
            &draft.id,
            PlannerEntryPatch {
                content: Some(content.clone()),
                emoji: Some(emoji.clone()),
            },
        )?;
        self.store.replace(&draft.id, |e| {
            e.content = content;
            e.emoji = emoji.clone();
        });
        self.edit.cancel();
        Ok(())
    }

    pub fn delete_selected(&mut self, gw: &dyn Gateway, session: &Session) -> Result<(), AppError> {
        let target = self
            .selected_entry()
            .cloned()
            .ok_or_else(|| AppError::validation("no entry selected"))?;
        session.ensure_owner(&target, "delete", "entries")?;
        gw.delete_planner_entry(&target.id)?;
        self.store.remove(&target.id);
        self.clamp_selection();
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Screen {
    Setup,
    SignIn,
    Projects,
    Tasks,
    Planner,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SetupStep {
    Url,
    AnonKey,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AuthField {
    Email,
    Password,
}

pub struct App {
    pub config: GatewayConfig,
    pub gateway: HttpGateway,
    pub session: Option<Session>,
    pub notices: Notices,
    pub screen: Screen,
    pub setup_step: SetupStep,
    pub input_setup: String,
    pub auth_field: AuthField,
    pub input_email: String,
    pub input_password: String,
    pub projects: ProjectsPage,
    pub tasks: Option<TasksPage>,
    pub planner: PlannerPage,
}

impl App {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let gateway = HttpGateway::new(&config)?;
        let screen = if config.is_complete() {
            Screen::SignIn
        } else {
            Screen::Setup
        };
        Ok(Self {
            input_email: config.email.clone(),
            config,
            gateway,
            session: None,
            notices: Notices::new(),
            screen,
            setup_step: SetupStep::Url,
            input_setup: String::new(),
            auth_field: AuthField::Email,
            input_password: String::new(),
            projects: ProjectsPage::new(),
            tasks: None,
            planner: PlannerPage::new(),
        })
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    fn report(&mut self, err: AppError) {
        self.notices.error(err.to_string());
    }

    /// Two-step first-run setup, URL then anon key, shown in the TUI as a
    /// single input line.
    pub fn submit_setup(&mut self) {
        match self.setup_step {
            SetupStep::Url => {
                self.config.base_url = self.input_setup.trim().to_string();
                self.input_setup = self.config.anon_key.clone();
                self.setup_step = SetupStep::AnonKey;
            }
            SetupStep::AnonKey => {
                self.config.anon_key = self.input_setup.trim().to_string();
                self.input_setup.clear();
                self.setup_step = SetupStep::Url;
                if !self.config.is_complete() {
                    self.notices
                        .error("both the URL and the anon key are required");
                    return;
                }
                match HttpGateway::new(&self.config) {
                    Ok(gateway) => {
                        self.gateway = gateway;
                        if let Err(e) = config::save(&self.config) {
                            self.notices.error(format!("could not save config: {e}"));
                        }
                        self.screen = Screen::SignIn;
                    }
                    Err(e) => self.notices.error(e.to_string()),
                }
            }
        }
    }

    /// Picks up a persisted session from the previous run, if the backend
    /// still accepts the stored token.
    pub fn restore_session(&mut self) {
        if !self.config.is_complete() {
            return;
        }
        match self.gateway.current_user() {
            Ok(Some(user)) => {
                if let Some(token) = self.gateway.access_token() {
                    self.session = Some(Session::new(user, token.to_string()));
                    self.enter_projects();
                }
            }
            Ok(None) => {
                // Stored token expired or was revoked.
                self.config.access_token = None;
                self.gateway.set_token(None);
            }
            Err(e) => self.notices.error(e.to_string()),
        }
    }

    pub fn sign_in(&mut self) {
        let email = self.input_email.trim().to_string();
        let password = self.input_password.clone();
        if email.is_empty() || password.is_empty() {
            self.notices.error("email and password are required");
            return;
        }
        match self.gateway.sign_in(&email, &password) {
            Ok(session) => {
                self.config.email = email;
                self.config.access_token = Some(session.access_token().to_string());
                if let Err(e) = config::save(&self.config) {
                    self.notices.error(format!("could not save config: {e}"));
                }
                self.session = Some(session);
                self.input_password.clear();
                self.enter_projects();
            }
            Err(e) => self.notices.error(e.to_string()),
        }
    }

    /// Signing up does not sign the user in; the backend wants the email
    /// confirmed first.
    pub fn sign_up(&mut self) {
        let email = self.input_email.trim().to_string();
        let password = self.input_password.clone();
        if email.is_empty() || password.is_empty() {
            self.notices.error("email and password are required");
            return;
        }
        match self.gateway.sign_up(&email, &password) {
            Ok(()) => self
                .notices
                .success("Check your email for the confirmation link!"),
            Err(e) => self.notices.error(e.to_string()),
        }
    }

    pub fn enter_projects(&mut self) {
        self.screen = Screen::Projects;
        if !self.projects.loaded {
            self.refresh_projects();
        }
    }

    pub fn refresh_projects(&mut self) {
        if let Err(e) = self.projects.load(&self.gateway) {
            self.report(e);
        }
    }

    pub fn enter_planner(&mut self) {
        self.screen = Screen::Planner;
        if !self.planner.loaded {
            self.refresh_planner();
        }
    }

    pub fn refresh_planner(&mut self) {
        if let Err(e) = self.planner.load(&self.gateway) {
            self.report(e);
        }
    }

    pub fn open_selected_project(&mut self) {
        let Some(project) = self.projects.selected_project().cloned() else {
            return;
        };
        let mut page = TasksPage::open(&project);
        match page.load(&self.gateway) {
            Ok(()) => {
                self.tasks = Some(page);
                self.screen = Screen::Tasks;
            }
            Err(e) => self.report(e),
        }
    }

    pub fn refresh_tasks(&mut self) {
        if let Some(page) = self.tasks.as_mut() {
            if let Err(e) = page.load(&self.gateway) {
                self.report(e);
            }
        }
    }

    // Wrappers the TUI key handlers call: run the controller action, then
    // turn the outcome into a footer notice.

    pub fn add_project(&mut self) {
        let Some(session) = self.session.clone() else {
            return;
        };
        match self.projects.add(&self.gateway, &session) {
            Ok(()) => self.notices.success("Project added successfully"),
            Err(e) => self.report(e),
        }
    }

    pub fn begin_project_edit(&mut self) {
        let Some(session) = self.session.clone() else {
            return;
        };
        if let Err(e) = self.projects.begin_edit(&session) {
            self.report(e);
        }
    }

    pub fn save_project_edit(&mut self) {
        let Some(session) = self.session.clone() else {
            return;
        };
        match self.projects.save_edit(&self.gateway, &session) {
            Ok(()) => self.notices.success("Project updated successfully"),
            Err(e) => self.report(e),
        }
    }

    pub fn delete_project(&mut self) {
        let Some(session) = self.session.clone() else {
            return;
        };
        match self.projects.delete_selected(&self.gateway, &session) {
            Ok(()) => self.notices.success("Project deleted successfully"),
            Err(e) => self.report(e),
        }
    }

    pub fn add_task(&mut self) {
        let Some(session) = self.session.clone() else {
            return;
        };
        let today = Self::today();
        let Some(page) = self.tasks.as_mut() else {
            return;
        };
        match page.add(&self.gateway, &session, today) {
            Ok(()) => self.notices.success("Todo item added successfully"),
            Err(e) => self.report(e),
        }
    }

    pub fn toggle_task(&mut self) {
        let Some(session) = self.session.clone() else {
            return;
        };
        let Some(page) = self.tasks.as_mut() else {
            return;
        };
        match page.toggle_selected(&self.gateway, &session) {
            Ok(()) => self.notices.success("Todo item updated successfully"),
            Err(e) => self.report(e),
        }
    }

    pub fn begin_task_edit(&mut self) {
        let Some(session) = self.session.clone() else {
            return;
        };
        let Some(page) = self.tasks.as_mut() else {
            return;
        };
        if let Err(e) = page.begin_edit(&session) {
            self.report(e);
        }
    }

    pub fn save_task_edit(&mut self) {
        let Some(session) = self.session.clone() else {
            return;
        };
        let today = Self::today();
        let Some(page) = self.tasks.as_mut() else {
            return;
        };
        match page.save_edit(&self.gateway, &session, today) {
            Ok(()) => self.notices.success("Todo item updated successfully"),
            Err(e) => self.report(e),
        }
    }

    pub fn delete_task(&mut self) {
        let Some(session) = self.session.clone() else {
            return;
        };
        let Some(page) = self.tasks.as_mut() else {
            return;
        };
        match page.delete_selected(&self.gateway, &session) {
            Ok(()) => self.notices.success("Todo item deleted successfully"),
            Err(e) => self.report(e),
        }
    }

    pub fn add_planner_entry(&mut self) {
        let Some(session) = self.session.clone() else {
            return;
        };
        let today = Self::today();
        match self.planner.add(&self.gateway, &session, today) {
            Ok(()) => self.notices.success("Planner entry added successfully"),
            Err(e) => self.report(e),
        }
    }

    pub fn begin_planner_edit(&mut self) {
        let Some(session) = self.session.clone() else {
            return;
        };
        if let Err(e) = self.planner.begin_edit(&session) {
            self.report(e);
        }
    }

    pub fn save_planner_edit(&mut self) {
        let Some(session) = self.session.clone() else {
            return;
        };
        match self.planner.save_edit(&self.gateway, &session) {
            Ok(()) => self.notices.success("Planner entry updated successfully"),
            Err(e) => self.report(e),
        }
    }

    pub fn delete_planner_entry(&mut self) {
        let Some(session) = self.session.clone() else {
            return;
        };
        match self.planner.delete_selected(&self.gateway, &session) {
            Ok(()) => self.notices.success("Planner entry deleted successfully"),
            Err(e) => self.report(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    /// In-memory stand-in for the hosted backend. Counts writes so tests can
    /// assert that guarded actions never reach the gateway.
    #[derive(Default)]
    struct MemoryGateway {
        users: Vec<User>,
        projects: RefCell<Vec<Project>>,
        items: RefCell<Vec<TodoItem>>,
        entries: RefCell<Vec<PlannerEntry>>,
        writes: Cell<usize>,
        fail_writes: Cell<bool>,
        next_id: Cell<u32>,
    }

    impl MemoryGateway {
        fn new() -> Self {
            Self {
                users: vec![
                    User {
                        id: "alice".to_string(),
                        email: Some("alice@example.com".to_string()),
                    },
                    User {
                        id: "bob".to_string(),
                        email: Some("bob@example.com".to_string()),
                    },
                ],
                ..Default::default()
            }
        }

        fn write(&self) -> Result<(), GatewayError> {
            if self.fail_writes.get() {
                return Err(GatewayError::Status {
                    op: "write",
                    status: 500,
                    body: "backend unavailable".to_string(),
                });
            }
            self.writes.set(self.writes.get() + 1);
            Ok(())
        }

        fn fresh_id(&self) -> String {
            let n = self.next_id.get() + 1;
            self.next_id.set(n);
            format!("gen-{n}")
        }
    }

    impl Gateway for MemoryGateway {
        fn list_users(&self) -> Result<Vec<User>, GatewayError> {
            Ok(self.users.clone())
        }

        fn list_projects(&self) -> Result<Vec<Project>, GatewayError> {
            Ok(self.projects.borrow().clone())
        }

        fn insert_project(&self, new: NewProject<'_>) -> Result<Project, GatewayError> {
            self.write()?;
            let project = Project {
                id: self.fresh_id(),
                name: new.name.to_string(),
                emoji: new.emoji.to_string(),
                user_id: new.user_id.to_string(),
                user_email: String::new(),
                tasks: Vec::new(),
            };
            self.projects.borrow_mut().push(project.clone());
            Ok(project)
        }

        fn update_project(&self, id: &str, patch: ProjectPatch) -> Result<(), GatewayError> {
            self.write()?;
            let mut projects = self.projects.borrow_mut();
            if let Some(p) = projects.iter_mut().find(|p| p.id == id) {
                if let Some(name) = patch.name {
                    p.name = name;
                }
                if let Some(emoji) = patch.emoji {
                    p.emoji = emoji;
                }
            }
            Ok(())
        }

        fn delete_project(&self, id: &str) -> Result<(), GatewayError> {
            self.write()?;
            self.projects.borrow_mut().retain(|p| p.id != id);
            Ok(())
        }

        fn list_todo_items(&self, project_id: &str) -> Result<Vec<TodoItem>, GatewayError> {
            Ok(self
                .items
                .borrow()
                .iter()
                .filter(|t| t.project_id == project_id)
                .cloned()
                .collect())
        }

        fn insert_todo_item(&self, new: NewTodoItem<'_>) -> Result<TodoItem, GatewayError> {
            self.write()?;
            let item = TodoItem {
                id: self.fresh_id(),
                title: new.title.to_string(),
                completed: false,
                deadline: new.deadline,
                project_id: new.project_id.to_string(),
                project_name: String::new(),
                emoji: new.emoji.to_string(),
                user_id: new.user_id.to_string(),
                user_email: String::new(),
            };
            self.items.borrow_mut().push(item.clone());
            Ok(item)
        }

        fn update_todo_item(&self, id: &str, patch: TodoItemPatch) -> Result<(), GatewayError> {
            self.write()?;
            let mut items = self.items.borrow_mut();
            if let Some(t) = items.iter_mut().find(|t| t.id == id) {
                if let Some(title) = patch.title {
                    t.title = title;
                }
                if let Some(emoji) = patch.emoji {
                    t.emoji = emoji;
                }
                if let Some(completed) = patch.completed {
                    t.completed = completed;
                }
                if let Some(deadline) = patch.deadline {
                    t.deadline = deadline;
                }
            }
            Ok(())
        }

        fn delete_todo_item(&self, id: &str) -> Result<(), GatewayError> {
            self.write()?;
            self.items.borrow_mut().retain(|t| t.id != id);
            Ok(())
        }

        fn list_planner_entries(&self) -> Result<Vec<PlannerEntry>, GatewayError> {
            let mut entries = self.entries.borrow().clone();
            entries.sort_by(|a, b| b.date.cmp(&a.date));
            Ok(entries)
        }

        fn insert_planner_entry(
            &self,
            new: NewPlannerEntry<'_>,
        ) -> Result<PlannerEntry, GatewayError> {
            self.write()?;
            let entry = PlannerEntry {
                id: self.fresh_id(),
                date: new.date,
                content: new.content.to_string(),
                emoji: new.emoji.to_string(),
                user_id: new.user_id.to_string(),
                user_email: String::new(),
            };
            self.entries.borrow_mut().push(entry.clone());
            Ok(entry)
        }

        fn update_planner_entry(
            &self,
            id: &str,
            patch: PlannerEntryPatch,
        ) -> Result<(), GatewayError> {
            self.write()?;
            let mut entries = self.entries.borrow_mut();
            if let Some(e) = entries.iter_mut().find(|e| e.id == id) {
                if let Some(content) = patch.content {
                    e.content = content;
                }
                if let Some(emoji) = patch.emoji {
                    e.emoji = emoji;
                }
            }
            Ok(())
        }

        fn delete_planner_entry(&self, id: &str) -> Result<(), GatewayError> {
            self.write()?;
            self.entries.borrow_mut().retain(|e| e.id != id);
            Ok(())
        }
    }

    fn session(user_id: &str) -> Session {
        Session::new(
            User {
                id: user_id.to_string(),
                email: Some(format!("{user_id}@example.com")),
            },
            "token".to_string(),
        )
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 24).unwrap()
    }

    fn project_owned_by(id: &str, user_id: &str, name: &str) -> Project {
        Project {
            id: id.to_string(),
            name: name.to_string(),
            emoji: "💻".to_string(),
            user_id: user_id.to_string(),
            user_email: format!("{user_id}@example.com"),
            tasks: Vec::new(),
        }
    }

    #[test]
    fn add_project_appends_and_enriches_email() {
        let gw = MemoryGateway::new();
        let alice = session("alice");
        let mut page = ProjectsPage::new();
        page.load(&gw).unwrap();

        page.input_name = "  Backend  ".to_string();
        page.new_emoji = Some(0);
        page.add(&gw, &alice).unwrap();

        assert_eq!(page.store.len(), 1);
        let project = page.store.iter().next().unwrap();
        assert_eq!(project.name, "Backend");
        assert_eq!(project.emoji, "💻");
        assert_eq!(project.user_email, "alice@example.com");
        assert!(page.input_name.is_empty());
        assert!(page.new_emoji.is_none());
    }

    #[test]
    fn blank_project_name_never_reaches_the_gateway() {
        let gw = MemoryGateway::new();
        let alice = session("alice");
        let mut page = ProjectsPage::new();

        page.input_name = "   ".to_string();
        assert!(matches!(page.add(&gw, &alice), Err(AppError::Validation(_))));
        assert_eq!(gw.writes.get(), 0);
    }

    #[test]
    fn edit_and_save_updates_both_sides() {
        let gw = MemoryGateway::new();
        let alice = session("alice");
        gw.projects
            .borrow_mut()
            .push(project_owned_by("p1", "alice", "Old name"));

        let mut page = ProjectsPage::new();
        page.load(&gw).unwrap();
        page.begin_edit(&alice).unwrap();
        page.edit.draft_mut().unwrap().name = "New name".to_string();
        page.save_edit(&gw, &alice).unwrap();

        assert!(page.edit.is_idle());
        assert_eq!(page.store.find("p1").unwrap().name, "New name");
        assert_eq!(gw.projects.borrow()[0].name, "New name");
    }

    #[test]
    fn ownership_guard_blocks_foreign_mutations_without_a_remote_call() {
        let gw = MemoryGateway::new();
        let bob = session("bob");
        gw.projects
            .borrow_mut()
            .push(project_owned_by("p1", "alice", "Alice's project"));

        let mut page = ProjectsPage::new();
        page.load(&gw).unwrap();

        assert!(matches!(
            page.begin_edit(&bob),
            Err(AppError::Ownership { .. })
        ));
        assert!(matches!(
            page.delete_selected(&gw, &bob),
            Err(AppError::Ownership { .. })
        ));
        assert_eq!(gw.writes.get(), 0);
        assert_eq!(page.store.len(), 1);
    }

    #[test]
    fn failed_delete_leaves_the_visible_list_unchanged() {
        let gw = MemoryGateway::new();
        let alice = session("alice");
        gw.projects
            .borrow_mut()
            .push(project_owned_by("p1", "alice", "Keep me"));

        let mut page = ProjectsPage::new();
        page.load(&gw).unwrap();
        gw.fail_writes.set(true);

        assert!(matches!(
            page.delete_selected(&gw, &alice),
            Err(AppError::Gateway(_))
        ));
        assert_eq!(page.store.len(), 1);
        assert_eq!(page.visible().len(), 1);
    }

    #[test]
    fn owner_filter_narrows_the_visible_projects() {
        let gw = MemoryGateway::new();
        gw.projects
            .borrow_mut()
            .push(project_owned_by("p1", "alice", "A"));
        gw.projects
            .borrow_mut()
            .push(project_owned_by("p2", "bob", "B"));

        let mut page = ProjectsPage::new();
        page.load(&gw).unwrap();
        assert_eq!(page.visible().len(), 2);

        page.owner_filter = OwnerFilter::User("bob".to_string());
        let visible = page.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, "p2");
    }

    #[test]
    fn owner_filter_cycles_through_users_and_back_to_all() {
        let gw = MemoryGateway::new();
        let mut page = ProjectsPage::new();
        page.load(&gw).unwrap();

        page.cycle_owner_filter();
        assert_eq!(page.owner_filter, OwnerFilter::User("alice".to_string()));
        page.cycle_owner_filter();
        assert_eq!(page.owner_filter, OwnerFilter::User("bob".to_string()));
        page.cycle_owner_filter();
        assert_eq!(page.owner_filter, OwnerFilter::All);
    }

    #[test]
    fn toggling_a_task_patches_completed_only() {
        let gw = MemoryGateway::new();
        let alice = session("alice");
        let project = project_owned_by("p1", "alice", "Backend");
        gw.projects.borrow_mut().push(project.clone());

        let mut page = TasksPage::open(&project);
        page.input_title = "Ship it".to_string();
        page.input_deadline = "2026-08-30".to_string();
        page.add(&gw, &alice, today()).unwrap();

        page.toggle_selected(&gw, &alice).unwrap();
        let item = page.store.iter().next().unwrap();
        assert!(item.completed);
        assert_eq!(item.title, "Ship it");
        assert_eq!(
            item.deadline,
            Some(NaiveDate::from_ymd_opt(2026, 8, 30).unwrap())
        );
        assert!(gw.items.borrow()[0].completed);
    }

    #[test]
    fn completed_tasks_cannot_enter_an_edit_session() {
        let gw = MemoryGateway::new();
        let alice = session("alice");
        let project = project_owned_by("p1", "alice", "Backend");

        let mut page = TasksPage::open(&project);
        page.input_title = "Done already".to_string();
        page.add(&gw, &alice, today()).unwrap();
        page.toggle_selected(&gw, &alice).unwrap();

        assert!(matches!(
            page.begin_edit(&alice),
            Err(AppError::Validation(_))
        ));
        assert!(page.edit.is_idle());
    }

    #[test]
    fn task_search_filters_by_title() {
        let gw = MemoryGateway::new();
        let alice = session("alice");
        let project = project_owned_by("p1", "alice", "Backend");

        let mut page = TasksPage::open(&project);
        page.input_title = "Write docs".to_string();
        page.add(&gw, &alice, today()).unwrap();
        page.input_title = "Fix login".to_string();
        page.add(&gw, &alice, today()).unwrap();

        page.search_query = "DOCS".to_string();
        let visible = page.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].title, "Write docs");
    }

    #[test]
    fn duplicate_daily_plan_is_rejected_without_a_remote_call() {
        let gw = MemoryGateway::new();
        let alice = session("alice");
        let mut page = PlannerPage::new();

        page.input_content = "Morning: review PRs".to_string();
        page.add(&gw, &alice, today()).unwrap();
        let writes_after_first = gw.writes.get();

        page.input_content = "Second attempt".to_string();
        assert!(matches!(
            page.add(&gw, &alice, today()),
            Err(AppError::Validation(_))
        ));
        assert_eq!(gw.writes.get(), writes_after_first);
        assert_eq!(page.store.len(), 1);
    }

    #[test]
    fn another_user_may_still_plan_the_same_day() {
        let gw = MemoryGateway::new();
        let alice = session("alice");
        let bob = session("bob");
        let mut page = PlannerPage::new();

        page.input_content = "Alice's plan".to_string();
        page.add(&gw, &alice, today()).unwrap();
        page.input_content = "Bob's plan".to_string();
        page.add(&gw, &bob, today()).unwrap();

        assert_eq!(page.store.len(), 2);
    }

    #[test]
    fn new_planner_entries_are_prepended_with_the_default_emoji() {
        let gw = MemoryGateway::new();
        let alice = session("alice");
        let mut page = PlannerPage::new();
        gw.entries.borrow_mut().push(PlannerEntry {
            id: "old".to_string(),
            date: today() - Duration::days(1),
            content: "yesterday".to_string(),
            emoji: "📚".to_string(),
            user_id: "alice".to_string(),
            user_email: String::new(),
        });
        page.load(&gw).unwrap();

        page.input_content = "today's plan".to_string();
        page.add(&gw, &alice, today()).unwrap();

        let ids: Vec<&str> = page.store.iter().map(|e| e.id()).collect();
        assert_eq!(ids, vec!["gen-1", "old"]);
        let newest = page.store.iter().next().unwrap();
        assert_eq!(newest.emoji, DEFAULT_PLANNER_EMOJI);
        assert_eq!(newest.date, today());
    }

    #[test]
    fn planner_filters_compose_and_reset() {
        let gw = MemoryGateway::new();
        let alice = session("alice");
        let bob = session("bob");
        let mut page = PlannerPage::new();

        page.input_content = "Ship the release".to_string();
        page.add(&gw, &alice, today()).unwrap();
        page.input_content = "Plan the retro".to_string();
        page.add(&gw, &bob, today()).unwrap();

        page.filters.owner = OwnerFilter::User("alice".to_string());
        page.filters.search = "release".to_string();
        assert_eq!(page.visible().len(), 1);

        page.filters.search = "retro".to_string();
        assert!(page.visible().is_empty());

        page.reset_filters();
        assert_eq!(page.visible().len(), 2);
    }

    #[test]
    fn deadline_shorthand_parses_relative_to_today() {
        let t = today();
        assert_eq!(parse_deadline("", t).unwrap(), None);
        assert_eq!(parse_deadline("today", t).unwrap(), Some(t));
        assert_eq!(
            parse_deadline("tomorrow", t).unwrap(),
            Some(t + Duration::days(1))
        );
        assert_eq!(
            parse_deadline("2026-09-01", t).unwrap(),
            Some(NaiveDate::from_ymd_opt(2026, 9, 1).unwrap())
        );
        assert!(parse_deadline("next tuesday-ish", t).is_err());
    }
}
