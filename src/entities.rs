// entities.rs

use chrono::NaiveDate;

/// One addressable record with an owning user.
pub trait Entity {
    fn id(&self) -> &str;
    fn owner_id(&self) -> &str;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
}

impl User {
    pub fn email_or_unknown(&self) -> &str {
        self.email.as_deref().unwrap_or("Unknown User")
    }
}

/// The slice of a task the projects screen needs to color a project card.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TaskDigest {
    pub deadline: Option<NaiveDate>,
    pub completed: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub emoji: String,
    pub user_id: String,
    pub user_email: String,
    /// Digests of this project's tasks, fetched alongside the project row.
    /// Never written back; input to the urgency derivation only.
    pub tasks: Vec<TaskDigest>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TodoItem {
    pub id: String,
    pub title: String,
    pub completed: bool,
    pub deadline: Option<NaiveDate>,
    pub project_id: String,
    pub project_name: String,
    pub emoji: String,
    pub user_id: String,
    pub user_email: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlannerEntry {
    pub id: String,
    pub date: NaiveDate,
    pub content: String,
    pub emoji: String,
    pub user_id: String,
    pub user_email: String,
}

impl Entity for Project {
    fn id(&self) -> &str {
        &self.id
    }
    fn owner_id(&self) -> &str {
        &self.user_id
    }
}

impl Entity for TodoItem {
    fn id(&self) -> &str {
        &self.id
    }
    fn owner_id(&self) -> &str {
        &self.user_id
    }
}

impl Entity for PlannerEntry {
    fn id(&self) -> &str {
        &self.id
    }
    fn owner_id(&self) -> &str {
        &self.user_id
    }
}

pub const PROJECT_EMOJIS: [&str; 10] = ["💻", "📊", "🚀", "🔧", "📱", "🌐", "🔍", "🛠️", "📈", "🤖"];
pub const ITEM_EMOJIS: [&str; 10] = ["📝", "🔨", "📅", "🎯", "📚", "💡", "🔬", "🖥️", "📊", "🚀"];

/// A planner entry saved without picking an emoji falls back to this one.
pub const DEFAULT_PLANNER_EMOJI: &str = "📝";
