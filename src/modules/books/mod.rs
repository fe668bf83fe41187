pub mod models;
pub mod routes;
pub mod service;

use async_trait::async_trait;
use axum::Router;
use libris_db::Database;
use libris_kernel::{InitCtx, Module};
use serde_json::json;

use service::BookService;

/// Book catalogue module: CRUD over the `books` collection
pub struct BooksModule {
    service: BookService,
}

impl BooksModule {
    pub fn new(database: &Database) -> Self {
        Self {
            service: BookService::new(database),
        }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "book"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            collection = self.service.collection_name(),
            "book module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                    }
                }
            })
        };
        let book = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/Book" }
                    }
                }
            })
        };
        let id_param = json!([{
            "name": "id",
            "in": "path",
            "required": true,
            "schema": { "type": "string" }
        }]);

        Some(json!({
            "paths": {
                "/": {
                    "post": {
                        "summary": "Create a new book",
                        "tags": ["books"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/CreateBook" }
                                }
                            }
                        },
                        "responses": {
                            "201": book("Book created"),
                            "422": error("Validation error"),
                            "500": error("Internal server error")
                        }
                    },
                    "get": {
                        "summary": "List all books (at most 100)",
                        "tags": ["books"],
                        "responses": {
                            "200": {
                                "description": "List of books",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Book" }
                                        }
                                    }
                                }
                            },
                            "500": error("Internal server error")
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Get a single book by id",
                        "tags": ["books"],
                        "parameters": id_param.clone(),
                        "responses": {
                            "200": book("The book"),
                            "404": error("Book not found")
                        }
                    },
                    "put": {
                        "summary": "Update a book",
                        "tags": ["books"],
                        "parameters": id_param.clone(),
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/BookPatch" }
                                }
                            }
                        },
                        "responses": {
                            "200": book("The updated book"),
                            "404": error("Book not found"),
                            "422": error("Validation error")
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["books"],
                        "parameters": id_param,
                        "responses": {
                            "204": { "description": "Book deleted" },
                            "404": error("Book not found")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string", "description": "Unique identifier for the book" },
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "synopsis": { "type": "string" }
                        },
                        "required": ["id", "title", "author", "synopsis"],
                        "example": {
                            "id": "066de609-b04a-4b30-b46c-32537c7f1f6e",
                            "title": "Don Quixote",
                            "author": "Miguel de Cervantes",
                            "synopsis": "..."
                        }
                    },
                    "CreateBook": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string", "description": "Generated when omitted" },
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "synopsis": { "type": "string" }
                        },
                        "required": ["title", "author", "synopsis"]
                    },
                    "BookPatch": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "synopsis": { "type": "string" }
                        },
                        "additionalProperties": false
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "book module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "book module stopped");
        Ok(())
    }
}

/// Create a new instance of the book module
pub fn create_module(database: &Database) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new(database))
}
