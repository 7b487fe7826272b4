// gateway.rs
//
// Remote data gateway for the hosted backend: GoTrue-style auth endpoints
// plus PostgREST-style table and view endpoints. Rows arrive with every
// column nullable; they are converted into the typed entities here, at the
// edge, before anything reaches application state.

use chrono::NaiveDate;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::GatewayConfig;
use crate::entities::{PlannerEntry, Project, TaskDigest, TodoItem, User};
use crate::error::GatewayError;
use crate::session::Session;

/// The data operations page controllers are allowed to perform. Kept as a
/// trait so controllers can be driven by an in-memory double in tests.
pub trait Gateway {
    fn list_users(&self) -> Result<Vec<User>, GatewayError>;

    fn list_projects(&self) -> Result<Vec<Project>, GatewayError>;
    fn insert_project(&self, new: NewProject<'_>) -> Result<Project, GatewayError>;
    fn update_project(&self, id: &str, patch: ProjectPatch) -> Result<(), GatewayError>;
    fn delete_project(&self, id: &str) -> Result<(), GatewayError>;

    fn list_todo_items(&self, project_id: &str) -> Result<Vec<TodoItem>, GatewayError>;
    fn insert_todo_item(&self, new: NewTodoItem<'_>) -> Result<TodoItem, GatewayError>;
    fn update_todo_item(&self, id: &str, patch: TodoItemPatch) -> Result<(), GatewayError>;
    fn delete_todo_item(&self, id: &str) -> Result<(), GatewayError>;

    fn list_planner_entries(&self) -> Result<Vec<PlannerEntry>, GatewayError>;
    fn insert_planner_entry(&self, new: NewPlannerEntry<'_>) -> Result<PlannerEntry, GatewayError>;
    fn update_planner_entry(&self, id: &str, patch: PlannerEntryPatch)
    -> Result<(), GatewayError>;
    fn delete_planner_entry(&self, id: &str) -> Result<(), GatewayError>;
}

#[derive(Debug, Serialize)]
pub struct NewProject<'a> {
    pub name: &'a str,
    pub user_id: &'a str,
    pub emoji: &'a str,
}

#[derive(Debug, Default, Serialize)]
pub struct ProjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NewTodoItem<'a> {
    pub title: &'a str,
    pub project_id: &'a str,
    pub deadline: Option<NaiveDate>,
    pub emoji: &'a str,
    pub user_id: &'a str,
}

#[derive(Debug, Default, Serialize)]
pub struct TodoItemPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    /// Outer None leaves the deadline alone; Some(None) clears it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<Option<NaiveDate>>,
}

#[derive(Debug, Serialize)]
pub struct NewPlannerEntry<'a> {
    pub date: NaiveDate,
    pub content: &'a str,
    pub user_id: &'a str,
    pub emoji: &'a str,
}

#[derive(Debug, Default, Serialize)]
pub struct PlannerEntryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
}

// Wire rows. Every column is nullable on the backend, so everything is an
// Option here and required fields are checked during conversion.

#[derive(Deserialize)]
struct UserRow {
    id: Option<String>,
    email: Option<String>,
}

#[derive(Deserialize)]
struct TaskDigestRow {
    deadline: Option<NaiveDate>,
    completed: Option<bool>,
}

#[derive(Deserialize)]
struct ProjectRow {
    id: Option<String>,
    name: Option<String>,
    emoji: Option<String>,
    user_id: Option<String>,
    user_email: Option<String>,
    #[serde(default)]
    todo_items: Vec<TaskDigestRow>,
}

#[derive(Deserialize)]
struct TodoItemRow {
    id: Option<String>,
    title: Option<String>,
    completed: Option<bool>,
    deadline: Option<NaiveDate>,
    project_id: Option<String>,
    project_name: Option<String>,
    emoji: Option<String>,
    user_id: Option<String>,
    user_email: Option<String>,
}

#[derive(Deserialize)]
struct PlannerEntryRow {
    id: Option<String>,
    date: Option<NaiveDate>,
    content: Option<String>,
    emoji: Option<String>,
    user_id: Option<String>,
    user_email: Option<String>,
}

fn required<T>(
    value: Option<T>,
    op: &'static str,
    field: &'static str,
) -> Result<T, GatewayError> {
    value.ok_or(GatewayError::MissingField { op, field })
}

impl UserRow {
    fn into_user(self, op: &'static str) -> Result<User, GatewayError> {
        Ok(User {
            id: required(self.id, op, "id")?,
            email: self.email,
        })
    }
}

impl ProjectRow {
    fn into_project(self, op: &'static str) -> Result<Project, GatewayError> {
        Ok(Project {
            id: required(self.id, op, "id")?,
            user_id: required(self.user_id, op, "user_id")?,
            name: self.name.unwrap_or_default(),
            emoji: self.emoji.unwrap_or_default(),
            user_email: self.user_email.unwrap_or_default(),
            tasks: self
                .todo_items
                .into_iter()
                .map(|t| TaskDigest {
                    deadline: t.deadline,
                    completed: t.completed.unwrap_or(false),
                })
                .collect(),
        })
    }
}

impl TodoItemRow {
    fn into_todo_item(self, op: &'static str) -> Result<TodoItem, GatewayError> {
        Ok(TodoItem {
            id: required(self.id, op, "id")?,
            user_id: required(self.user_id, op, "user_id")?,
            project_id: required(self.project_id, op, "project_id")?,
            title: self.title.unwrap_or_default(),
            completed: self.completed.unwrap_or(false),
            deadline: self.deadline,
            project_name: self.project_name.unwrap_or_default(),
            emoji: self.emoji.unwrap_or_default(),
            user_email: self.user_email.unwrap_or_default(),
        })
    }
}

impl PlannerEntryRow {
    fn into_planner_entry(self, op: &'static str) -> Result<PlannerEntry, GatewayError> {
        Ok(PlannerEntry {
            id: required(self.id, op, "id")?,
            user_id: required(self.user_id, op, "user_id")?,
            date: required(self.date, op, "date")?,
            content: self.content.unwrap_or_default(),
            emoji: self.emoji.unwrap_or_default(),
            user_email: self.user_email.unwrap_or_default(),
        })
    }
}

#[derive(Deserialize)]
struct TokenRes {
    access_token: Option<String>,
    user: Option<UserRow>,
}

/// Pulls a human-readable message out of an auth endpoint error body.
fn auth_message(body: &str) -> String {
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error_description", "msg", "message", "error"] {
            if let Some(s) = v.get(key).and_then(|x| x.as_str()) {
                return s.to_string();
            }
        }
    }
    body.to_string()
}

pub struct HttpGateway {
    base_url: String,
    anon_key: String,
    token: Option<String>,
    client: Client,
}

impl HttpGateway {
    pub fn new(cfg: &GatewayConfig) -> Result<Self, GatewayError> {
        let client = Client::builder().build().map_err(|e| GatewayError::Http {
            url: cfg.base_url.clone(),
            source: e,
        })?;
        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            anon_key: cfg.anon_key.clone(),
            token: cfg.access_token.clone(),
            client,
        })
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn access_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Requests ride on the user's token once signed in, on the anon key
    /// before that.
    fn bearer(&self) -> String {
        format!("Bearer {}", self.token.as_deref().unwrap_or(&self.anon_key))
    }

    fn rest_url(&self, path_and_query: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, path_and_query)
    }

    fn auth_url(&self, path_and_query: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path_and_query)
    }

    fn get(&self, op: &'static str, url: String) -> Result<String, GatewayError> {
        debug!(%url, "GET");
        let resp = self
            .client
            .get(&url)
            .header("apikey", &self.anon_key)
            .header("Authorization", self.bearer())
            .header("Accept", "application/json")
            .send()
            .map_err(|e| GatewayError::Http {
                url: url.clone(),
                source: e,
            })?;
        let status = resp.status();
        let body = resp.text().map_err(|e| GatewayError::Http {
            url: url.clone(),
            source: e,
        })?;
        debug!(status = status.as_u16(), "response");
        if !status.is_success() {
            return Err(GatewayError::Status {
                op,
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    fn write(
        &self,
        op: &'static str,
        method: reqwest::Method,
        url: String,
        body: &impl Serialize,
        want_representation: bool,
    ) -> Result<String, GatewayError> {
        debug!(%url, method = %method, "write");
        let mut req = self
            .client
            .request(method, &url)
            .header("apikey", &self.anon_key)
            .header("Authorization", self.bearer())
            .header("Accept", "application/json")
            .header(CONTENT_TYPE, "application/json")
            .json(body);
        if want_representation {
            req = req.header("Prefer", "return=representation");
        }
        let resp = req.send().map_err(|e| GatewayError::Http {
            url: url.clone(),
            source: e,
        })?;
        let status = resp.status();
        let text = resp.text().unwrap_or_default();
        debug!(status = status.as_u16(), "response");
        if !status.is_success() {
            return Err(GatewayError::Status {
                op,
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(text)
    }

    fn delete(&self, op: &'static str, url: String) -> Result<(), GatewayError> {
        debug!(%url, "DELETE");
        let resp = self
            .client
            .delete(&url)
            .header("apikey", &self.anon_key)
            .header("Authorization", self.bearer())
            .header("Accept", "application/json")
            .send()
            .map_err(|e| GatewayError::Http {
                url: url.clone(),
                source: e,
            })?;
        let status = resp.status();
        let body = resp.text().unwrap_or_default();
        debug!(status = status.as_u16(), "response");
        if !status.is_success() {
            return Err(GatewayError::Status {
                op,
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    fn decode<T: for<'de> Deserialize<'de>>(
        op: &'static str,
        body: &str,
    ) -> Result<T, GatewayError> {
        serde_json::from_str(body).map_err(|e| GatewayError::Decode { op, source: e })
    }

    /// Inserts always ask for the representation back; PostgREST answers
    /// with an array holding the created row.
    fn insert_one<Row: for<'de> Deserialize<'de>>(
        &self,
        op: &'static str,
        table: &str,
        new: &impl Serialize,
    ) -> Result<Row, GatewayError> {
        let url = self.rest_url(table);
        let body = self.write(op, reqwest::Method::POST, url, new, true)?;
        let mut rows: Vec<Row> = Self::decode(op, &body)?;
        match rows.pop() {
            Some(row) => Ok(row),
            None => Err(GatewayError::NoRows { op }),
        }
    }

    fn patch_by_id(
        &self,
        op: &'static str,
        table: &str,
        id: &str,
        patch: &impl Serialize,
    ) -> Result<(), GatewayError> {
        let url = self.rest_url(&format!("{table}?id=eq.{id}"));
        self.write(op, reqwest::Method::PATCH, url, patch, false)?;
        Ok(())
    }

    // Auth operations live on the concrete client: they establish the
    // session the trait operations then ride on.

    pub fn sign_in(&mut self, email: &str, password: &str) -> Result<Session, GatewayError> {
        let url = self.auth_url("token?grant_type=password");
        debug!(%url, "sign in");
        let resp = self
            .client
            .post(&url)
            .header("apikey", &self.anon_key)
            .header(CONTENT_TYPE, "application/json")
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .map_err(|e| GatewayError::Http {
                url: url.clone(),
                source: e,
            })?;
        let status = resp.status();
        let body = resp.text().unwrap_or_default();
        debug!(status = status.as_u16(), "response");
        if !status.is_success() {
            return Err(GatewayError::Auth {
                message: auth_message(&body),
            });
        }
        let token: TokenRes = Self::decode("sign in", &body)?;
        let access_token = required(token.access_token, "sign in", "access_token")?;
        let user = required(token.user, "sign in", "user")?.into_user("sign in")?;
        self.token = Some(access_token.clone());
        Ok(Session::new(user, access_token))
    }

    /// Registers a new account. Success does not sign the user in - the
    /// backend sends a confirmation mail first.
    pub fn sign_up(&self, email: &str, password: &str) -> Result<(), GatewayError> {
        let url = self.auth_url("signup");
        debug!(%url, "sign up");
        let resp = self
            .client
            .post(&url)
            .header("apikey", &self.anon_key)
            .header(CONTENT_TYPE, "application/json")
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .map_err(|e| GatewayError::Http {
                url: url.clone(),
                source: e,
            })?;
        let status = resp.status();
        let body = resp.text().unwrap_or_default();
        debug!(status = status.as_u16(), "response");
        if !status.is_success() {
            return Err(GatewayError::Auth {
                message: auth_message(&body),
            });
        }
        Ok(())
    }

    /// Resolves the user behind the stored token, None when there is no
    /// token or the backend no longer accepts it.
    pub fn current_user(&self) -> Result<Option<User>, GatewayError> {
        if self.token.is_none() {
            return Ok(None);
        }
        let url = self.auth_url("user");
        debug!(%url, "current user");
        let resp = self
            .client
            .get(&url)
            .header("apikey", &self.anon_key)
            .header("Authorization", self.bearer())
            .send()
            .map_err(|e| GatewayError::Http {
                url: url.clone(),
                source: e,
            })?;
        let status = resp.status();
        let body = resp.text().unwrap_or_default();
        debug!(status = status.as_u16(), "response");
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(GatewayError::Status {
                op: "current user",
                status: status.as_u16(),
                body,
            });
        }
        let row: UserRow = Self::decode("current user", &body)?;
        Ok(Some(row.into_user("current user")?))
    }

    /// The reminder daemon's query: the user's own incomplete tasks due on
    /// the given day.
    pub fn list_tasks_due(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<TodoItem>, GatewayError> {
        let op = "list due tasks";
        let url = self.rest_url(&format!(
            "todo_items_with_users?select=*&user_id=eq.{user_id}&deadline=eq.{date}&completed=eq.false"
        ));
        let body = self.get(op, url)?;
        let rows: Vec<TodoItemRow> = Self::decode(op, &body)?;
        rows.into_iter().map(|r| r.into_todo_item(op)).collect()
    }
}

impl Gateway for HttpGateway {
    fn list_users(&self) -> Result<Vec<User>, GatewayError> {
        let op = "list users";
        let body = self.get(op, self.rest_url("users?select=id,email"))?;
        let rows: Vec<UserRow> = Self::decode(op, &body)?;
        rows.into_iter().map(|r| r.into_user(op)).collect()
    }

    fn list_projects(&self) -> Result<Vec<Project>, GatewayError> {
        let op = "list projects";
        let url = self.rest_url(
            "projects_with_users?select=*,todo_items(deadline,completed)&todo_items.order=deadline.asc",
        );
        let body = self.get(op, url)?;
        let rows: Vec<ProjectRow> = Self::decode(op, &body)?;
        rows.into_iter().map(|r| r.into_project(op)).collect()
    }

    fn insert_project(&self, new: NewProject<'_>) -> Result<Project, GatewayError> {
        let op = "add project";
        let row: ProjectRow = self.insert_one(op, "projects", &new)?;
        row.into_project(op)
    }

    fn update_project(&self, id: &str, patch: ProjectPatch) -> Result<(), GatewayError> {
        self.patch_by_id("update project", "projects", id, &patch)
    }

    fn delete_project(&self, id: &str) -> Result<(), GatewayError> {
        self.delete(
            "delete project",
            self.rest_url(&format!("projects?id=eq.{id}")),
        )
    }

    fn list_todo_items(&self, project_id: &str) -> Result<Vec<TodoItem>, GatewayError> {
        let op = "list tasks";
        let url = self.rest_url(&format!(
            "todo_items_with_users?select=*&project_id=eq.{project_id}"
        ));
        let body = self.get(op, url)?;
        let rows: Vec<TodoItemRow> = Self::decode(op, &body)?;
        rows.into_iter().map(|r| r.into_todo_item(op)).collect()
    }

    fn insert_todo_item(&self, new: NewTodoItem<'_>) -> Result<TodoItem, GatewayError> {
        let op = "add task";
        let row: TodoItemRow = self.insert_one(op, "todo_items", &new)?;
        row.into_todo_item(op)
    }

    fn update_todo_item(&self, id: &str, patch: TodoItemPatch) -> Result<(), GatewayError> {
        self.patch_by_id("update task", "todo_items", id, &patch)
    }

    fn delete_todo_item(&self, id: &str) -> Result<(), GatewayError> {
        self.delete(
            "delete task",
            self.rest_url(&format!("todo_items?id=eq.{id}")),
        )
    }

    fn list_planner_entries(&self) -> Result<Vec<PlannerEntry>, GatewayError> {
        let op = "list planner entries";
        let url = self.rest_url("planner_entries_with_users?select=*&order=date.desc");
        let body = self.get(op, url)?;
        let rows: Vec<PlannerEntryRow> = Self::decode(op, &body)?;
        rows.into_iter().map(|r| r.into_planner_entry(op)).collect()
    }

    fn insert_planner_entry(&self, new: NewPlannerEntry<'_>) -> Result<PlannerEntry, GatewayError> {
        let op = "add planner entry";
        let row: PlannerEntryRow = self.insert_one(op, "planner_entries", &new)?;
        row.into_planner_entry(op)
    }

    fn update_planner_entry(
        &self,
        id: &str,
        patch: PlannerEntryPatch,
    ) -> Result<(), GatewayError> {
        self.patch_by_id("update planner entry", "planner_entries", id, &patch)
    }

    fn delete_planner_entry(&self, id: &str) -> Result<(), GatewayError> {
        self.delete(
            "delete planner entry",
            self.rest_url(&format!("planner_entries?id=eq.{id}")),
        )
    }
}
