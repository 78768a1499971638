// Test data
//
// A small blog domain: users, the posts they write, and a tree of nodes.

use fixture_harness::{Column, ColumnType, Entity, ModelRegistry, Table};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl User {
    pub fn new(id: i64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            active: true,
        }
    }
}

impl Entity for User {
    const MODEL: &'static str = "blog.models.User";

    fn table() -> Table {
        Table::new("users")
            .column(Column::new("id", ColumnType::Integer).primary_key())
            .column(Column::new("name", ColumnType::Text).not_null())
            .column(Column::new("email", ColumnType::Text).not_null().unique())
            .column(Column::new("active", ColumnType::Boolean).not_null())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
}

impl Entity for Post {
    const MODEL: &'static str = "blog.models.Post";

    fn table() -> Table {
        Table::new("posts")
            .column(Column::new("id", ColumnType::Integer).primary_key())
            .column(
                Column::new("user_id", ColumnType::Integer)
                    .not_null()
                    .references("users", "id"),
            )
            .column(Column::new("title", ColumnType::Text).not_null())
            .column(Column::new("body", ColumnType::Text))
    }
}

/// A tree node pointing at its parent in the same table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Node {
    pub id: i64,
    #[serde(default)]
    pub parent_id: Option<i64>,
    pub label: String,
}

impl Entity for Node {
    const MODEL: &'static str = "blog.models.Node";

    fn table() -> Table {
        Table::new("nodes")
            .column(Column::new("id", ColumnType::Integer).primary_key())
            .column(Column::new("parent_id", ColumnType::Integer).references("nodes", "id"))
            .column(Column::new("label", ColumnType::Text).not_null())
    }
}

/// Posts are registered first; table order comes from the foreign key
pub fn sample_registry() -> ModelRegistry {
    ModelRegistry::new()
        .with::<Post>()
        .with::<User>()
        .with::<Node>()
}
