use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Input structure for creating a todo.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TodoInput {
    /// The todo text. Surrounding whitespace is trimmed before validation,
    /// so a blank string is rejected.
    #[validate(length(min = 1))]
    pub text: String,
}

/// Partial update for a todo. Absent fields are left unchanged.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct TodoPatch {
    #[validate(length(min = 1))]
    pub text: Option<String>,
    pub completed: Option<bool>,
}

/// A todo document as stored and returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Todo {
    /// Unique identifier (UUID v4).
    pub id: Uuid,
    pub text: String,
    pub completed: bool,
    /// Milliseconds since the Unix epoch at which the todo was completed.
    #[serde(rename = "completedAt")]
    pub completed_at: Option<i64>,
    /// Id of the user who owns the todo.
    pub creator: Uuid,
}

/// Response envelope for a single todo.
#[derive(Debug, Serialize, Deserialize)]
pub struct TodoEnvelope {
    pub todo: Todo,
}

/// Response envelope for a list of todos.
#[derive(Debug, Serialize, Deserialize)]
pub struct TodoList {
    pub todos: Vec<Todo>,
}

impl TodoInput {
    pub fn normalized(self) -> Self {
        Self {
            text: self.text.trim().to_string(),
        }
    }
}

impl TodoPatch {
    pub fn normalized(self) -> Self {
        Self {
            text: self.text.map(|t| t.trim().to_string()),
            completed: self.completed,
        }
    }
}

impl Todo {
    /// Creates an incomplete todo owned by `creator`.
    pub fn new(input: TodoInput, creator: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: input.text,
            completed: false,
            completed_at: None,
            creator,
        }
    }

    /// Applies a patch. `completed_at` is stamped only on the false-to-true transition
    /// and cleared whenever `completed` is set to false.
    pub fn apply(&mut self, patch: TodoPatch) {
        if let Some(text) = patch.text {
            self.text = text;
        }
        match patch.completed {
            Some(true) if !self.completed => {
                self.completed = true;
                self.completed_at = Some(Utc::now().timestamp_millis());
            }
            Some(false) => {
                self.completed = false;
                self.completed_at = None;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_todo() -> Todo {
        Todo::new(
            TodoInput {
                text: "Walk the dog".to_string(),
            },
            Uuid::new_v4(),
        )
    }

    #[test]
    fn test_todo_json_field_names() {
        let mut todo = sample_todo();
        todo.completed_at = Some(123);
        let json = serde_json::to_value(&todo).unwrap();
        assert_eq!(json["completedAt"], 123);
        assert!(json.get("completed_at").is_none());
        assert_eq!(json["id"], todo.id.to_string());
    }

    #[test]
    fn test_todo_creation() {
        let creator = Uuid::new_v4();
        let todo = Todo::new(
            TodoInput {
                text: "Test todo".to_string(),
            },
            creator,
        );
        assert_eq!(todo.text, "Test todo");
        assert_eq!(todo.creator, creator);
        assert!(!todo.completed);
        assert!(todo.completed_at.is_none());
    }

    #[test]
    fn test_todo_input_validation() {
        let blank = TodoInput {
            text: "   ".to_string(),
        }
        .normalized();
        assert!(blank.validate().is_err(), "Blank text should be rejected.");

        let valid = TodoInput {
            text: "  Buy milk ".to_string(),
        }
        .normalized();
        assert!(valid.validate().is_ok());
        assert_eq!(valid.text, "Buy milk");
    }

    #[test]
    fn test_completing_sets_timestamp() {
        let mut todo = sample_todo();
        todo.apply(TodoPatch {
            text: Some("Walk the cat".to_string()),
            completed: Some(true),
        });
        assert!(todo.completed);
        assert!(todo.completed_at.is_some());
        assert_eq!(todo.text, "Walk the cat");
    }

    #[test]
    fn test_recompleting_keeps_timestamp() {
        let mut todo = sample_todo();
        todo.completed = true;
        todo.completed_at = Some(123);
        todo.apply(TodoPatch {
            text: None,
            completed: Some(true),
        });
        assert_eq!(todo.completed_at, Some(123));
    }

    #[test]
    fn test_uncompleting_clears_timestamp() {
        let mut todo = sample_todo();
        todo.completed = true;
        todo.completed_at = Some(123);
        todo.apply(TodoPatch {
            text: None,
            completed: Some(false),
        });
        assert!(!todo.completed);
        assert!(todo.completed_at.is_none());
    }

    #[test]
    fn test_text_only_patch_leaves_completion() {
        let mut todo = sample_todo();
        todo.completed = true;
        todo.completed_at = Some(123);
        todo.apply(TodoPatch {
            text: Some("Renamed".to_string()),
            completed: None,
        });
        assert!(todo.completed);
        assert_eq!(todo.completed_at, Some(123));
    }

    #[test]
    fn test_patch_validation() {
        let patch = TodoPatch {
            text: Some("  ".to_string()),
            completed: None,
        }
        .normalized();
        assert!(patch.validate().is_err());
        assert!(TodoPatch::default().validate().is_ok());
    }
}
