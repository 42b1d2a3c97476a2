//! Handler serving the OpenAPI description of the link endpoints.

use axum::Json;
use serde_json::{Value, json};

use crate::application::services::MAX_PAGE_LIMIT;
use crate::utils::slug::{MAX_SLUG_LENGTH, MIN_SLUG_LENGTH};

/// Returns the OpenAPI 3.0 document.
///
/// # Endpoint
///
/// `GET /api-docs/openapi.json`
pub async fn openapi_handler() -> Json<Value> {
    Json(openapi_document())
}

/// Builds the OpenAPI 3.0 document for the link API.
pub fn openapi_document() -> Value {
    let error = json!({ "$ref": "#/components/schemas/Error" });

    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "URL Shortener API",
            "description": "API for shortening URLs and managing them",
            "version": env!("CARGO_PKG_VERSION")
        },
        "paths": {
            "/links": {
                "post": {
                    "summary": "Create a short link",
                    "requestBody": {
                        "required": true,
                        "content": { "application/json": { "schema": { "$ref": "#/components/schemas/LinkCreate" } } }
                    },
                    "responses": {
                        "201": { "description": "Link created", "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Link" } } } },
                        "400": { "description": "Validation failed", "content": { "application/json": { "schema": error } } },
                        "409": { "description": "Slug already exists", "content": { "application/json": { "schema": error } } }
                    }
                },
                "get": {
                    "summary": "List links",
                    "parameters": [
                        { "name": "search", "in": "query", "required": false, "schema": { "type": "string" } },
                        { "name": "offset", "in": "query", "required": false, "schema": { "type": "integer", "minimum": 0, "default": 0 } },
                        { "name": "limit", "in": "query", "required": false, "schema": { "type": "integer", "minimum": 0, "maximum": MAX_PAGE_LIMIT, "default": 100 } }
                    ],
                    "responses": {
                        "200": { "description": "A page of links", "content": { "application/json": { "schema": { "$ref": "#/components/schemas/LinkList" } } } },
                        "400": { "description": "Invalid pagination", "content": { "application/json": { "schema": error } } }
                    }
                }
            },
            "/links/{slug}": {
                "get": {
                    "summary": "Redirect to the original URL",
                    "parameters": [
                        { "name": "slug", "in": "path", "required": true, "schema": { "type": "string" } }
                    ],
                    "responses": {
                        "302": { "description": "Redirects to the original URL", "headers": { "Location": { "schema": { "type": "string", "format": "uri" } } } },
                        "404": { "description": "Link has not been found", "content": { "application/json": { "schema": error } } },
                        "410": { "description": "Link expired", "content": { "application/json": { "schema": error } } }
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "LinkCreate": {
                    "type": "object",
                    "required": ["url"],
                    "properties": {
                        "url": { "type": "string", "format": "uri" },
                        "slug": { "type": "string", "minLength": MIN_SLUG_LENGTH, "maxLength": MAX_SLUG_LENGTH },
                        "expiresAt": { "type": "string", "format": "date-time" }
                    }
                },
                "Link": {
                    "type": "object",
                    "required": ["id", "url", "slug", "visits", "expiresAt"],
                    "properties": {
                        "id": { "type": "integer" },
                        "url": { "type": "string", "format": "uri" },
                        "slug": { "type": "string" },
                        "visits": { "type": "integer", "minimum": 0 },
                        "expiresAt": { "type": "string", "format": "date-time", "nullable": true }
                    }
                },
                "LinkList": {
                    "type": "object",
                    "required": ["items", "total", "limit", "offset"],
                    "properties": {
                        "items": { "type": "array", "items": { "$ref": "#/components/schemas/Link" } },
                        "total": { "type": "integer" },
                        "limit": { "type": "integer" },
                        "offset": { "type": "integer" }
                    }
                },
                "Error": {
                    "type": "object",
                    "properties": {
                        "error": {
                            "type": "object",
                            "properties": {
                                "code": { "type": "string" },
                                "message": { "type": "string" },
                                "details": { "type": "object" }
                            }
                        }
                    }
                }
            }
        }
    })
}
