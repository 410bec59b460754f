//! Library module: books with their authors and publishers.

pub mod convert;
pub mod models;
pub mod repository;
pub mod routes;
pub mod schema;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use libris_kernel::{InitCtx, Migration, Module};
use serde_json::json;

use repository::BookRepository;

pub struct LibraryModule {
    repository: Arc<dyn BookRepository>,
}

impl LibraryModule {
    pub fn new(repository: Arc<dyn BookRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl Module for LibraryModule {
    fn name(&self) -> &'static str {
        "library"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            seed = ctx.settings.database.seed,
            "library module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.repository.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
    }

    fn migrations(&self) -> Vec<Migration> {
        schema::migrations()
    }

    fn seeds(&self) -> Vec<Migration> {
        schema::seeds()
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "library module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "library module stopped");
        Ok(())
    }
}

fn error_response(description: &str) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

fn book_list_response() -> serde_json::Value {
    json!({
        "description": "Books with author and publisher",
        "content": {
            "application/json": {
                "schema": {
                    "type": "array",
                    "items": { "$ref": "#/components/schemas/Book" }
                }
            }
        }
    })
}

fn id_parameter() -> serde_json::Value {
    json!({
        "name": "id",
        "in": "path",
        "required": true,
        "schema": { "type": "integer", "format": "int64" }
    })
}

fn openapi_fragment() -> serde_json::Value {
    let named = |description: &str| {
        json!({
            "type": "object",
            "description": description,
            "properties": {
                "id": { "type": ["integer", "null"], "format": "int64" },
                "name": { "type": "string" }
            },
            "required": ["name"]
        })
    };

    json!({
        "paths": {
            "/books": {
                "get": {
                    "summary": "List books",
                    "tags": ["Library"],
                    "responses": {
                        "200": book_list_response(),
                        "500": error_response("Internal server error")
                    }
                },
                "post": {
                    "summary": "Add a book",
                    "tags": ["Library"],
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/Book" }
                            }
                        }
                    },
                    "responses": {
                        "201": { "description": "Book created" },
                        "400": error_response("Book has an id or fails validation")
                    }
                }
            },
            "/books/{id}": {
                "get": {
                    "summary": "Get a book",
                    "tags": ["Library"],
                    "parameters": [id_parameter()],
                    "responses": {
                        "200": {
                            "description": "The book",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/Book" }
                                }
                            }
                        },
                        "404": error_response("Book not found")
                    }
                },
                "patch": {
                    "summary": "Apply JSON Patch operations to a book",
                    "tags": ["Library"],
                    "parameters": [id_parameter()],
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json-patch+json": {
                                "schema": {
                                    "type": "array",
                                    "items": { "$ref": "#/components/schemas/PatchOperation" }
                                }
                            }
                        }
                    },
                    "responses": {
                        "200": {
                            "description": "The patched book",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/Book" }
                                }
                            }
                        },
                        "400": error_response("Patch could not be applied"),
                        "404": error_response("Book not found")
                    }
                },
                "delete": {
                    "summary": "Delete a book",
                    "tags": ["Library"],
                    "parameters": [id_parameter()],
                    "responses": {
                        "204": { "description": "Book deleted" },
                        "404": error_response("Book not found")
                    }
                }
            },
            "/authors/{author}/books": {
                "get": {
                    "summary": "List books by author full name",
                    "tags": ["Library"],
                    "parameters": [{
                        "name": "author",
                        "in": "path",
                        "required": true,
                        "schema": { "type": "string" }
                    }],
                    "responses": {
                        "200": book_list_response()
                    }
                }
            },
            "/health": {
                "get": {
                    "summary": "Library health check",
                    "tags": ["Library"],
                    "responses": {
                        "200": {
                            "description": "OK",
                            "content": { "text/plain": { "schema": { "type": "string" } } }
                        }
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Book": {
                    "type": "object",
                    "properties": {
                        "id": { "type": ["integer", "null"], "format": "int64" },
                        "title": { "type": "string" },
                        "isbn": { "type": "string" },
                        "author": named("Author of the book"),
                        "publisher": named("Publisher of the book")
                    },
                    "required": ["title", "isbn", "author", "publisher"]
                },
                "PatchOperation": {
                    "type": "object",
                    "properties": {
                        "op": {
                            "type": "string",
                            "enum": ["add", "remove", "replace", "move", "copy", "test"]
                        },
                        "path": { "type": "string" },
                        "from": { "type": "string" },
                        "value": {}
                    },
                    "required": ["op", "path"]
                }
            }
        }
    })
}

/// Create the library module around an already constructed repository
pub fn create_module(repository: Arc<dyn BookRepository>) -> Arc<dyn Module> {
    Arc::new(LibraryModule::new(repository))
}
