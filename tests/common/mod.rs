#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web, App};
use todo_api::auth::{hash_password, issue_token, TokenKeys};
use todo_api::models::{AccessTag, NewUser, Todo, TodoInput};
use todo_api::routes;
use todo_api::AppState;
use uuid::Uuid;

pub const TEST_SECRET: &str = "abc123";
/// bcrypt's minimum cost keeps the suites fast.
pub const TEST_COST: u32 = 4;

pub struct SeedUser {
    pub id: Uuid,
    pub email: &'static str,
    pub password: &'static str,
    /// Pre-issued session token, if the fixture holds one.
    pub token: Option<String>,
}

pub struct Seed {
    pub state: web::Data<AppState>,
    pub users: Vec<SeedUser>,
    pub todos: Vec<Todo>,
}

/// Builds a fresh in-memory state holding two users and two todos.
///
/// User one holds an active token; user two has none. Todo one belongs to user one
/// and is open; todo two belongs to user two and was completed at `123`.
pub async fn seed() -> Seed {
    let state = web::Data::new(AppState::in_memory(
        TokenKeys::from_secret(TEST_SECRET),
        TEST_COST,
    ));

    let mut users = Vec::new();
    for (email, password, with_token) in [
        ("a@a.com", "useOnePass", true),
        ("b@b.com", "useTwoPass", false),
    ] {
        let mut user = state
            .users
            .create_user(NewUser {
                email: email.to_string(),
                password_hash: hash_password(password, TEST_COST).expect("hash seed password"),
            })
            .await
            .expect("insert seed user");
        let token = if with_token {
            Some(
                issue_token(&state.keys, state.users.as_ref(), &mut user, AccessTag::Auth)
                    .await
                    .expect("issue seed token"),
            )
        } else {
            None
        };
        users.push(SeedUser {
            id: user.id,
            email,
            password,
            token,
        });
    }

    let first = Todo::new(
        TodoInput {
            text: "Todo 1".to_string(),
        },
        users[0].id,
    );
    let mut second = Todo::new(
        TodoInput {
            text: "Todo 2".to_string(),
        },
        users[1].id,
    );
    second.completed = true;
    second.completed_at = Some(123);

    let mut todos = Vec::new();
    for todo in [first, second] {
        todos.push(
            state
                .todos
                .create_todo(todo)
                .await
                .expect("insert seed todo"),
        );
    }

    Seed {
        state,
        users,
        todos,
    }
}

impl Seed {
    pub fn token(&self, index: usize) -> String {
        self.users[index]
            .token
            .clone()
            .expect("seed user holds no token")
    }
}

pub async fn init_app(
    state: web::Data<AppState>,
) -> impl Service<
    actix_http::Request,
    Response = ServiceResponse<impl MessageBody>,
    Error = actix_web::Error,
> {
    test::init_service(
        App::new()
            .app_data(state)
            .wrap(actix_web::middleware::NormalizePath::trim())
            .configure(routes::config),
    )
    .await
}
