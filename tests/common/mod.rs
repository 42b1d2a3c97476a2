#![allow(dead_code)]

use axum::Router;
use link_shortener::api::routes::link_routes;
use link_shortener::infrastructure::persistence::{InMemoryLinkRepository, PgLinkRepository};
use link_shortener::state::AppState;
use sqlx::PgPool;
use std::sync::Arc;

pub const DEFAULT_PAGE_LIMIT: i64 = 100;

pub async fn create_test_link(pool: &PgPool, slug: &str, url: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO links (slug, url) VALUES ($1, $2) RETURNING id")
        .bind(slug)
        .bind(url)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn create_expired_link(pool: &PgPool, slug: &str, url: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO links (slug, url, expires_at) VALUES ($1, $2, NOW() - INTERVAL '1 hour') RETURNING id",
    )
    .bind(slug)
    .bind(url)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_future_link(pool: &PgPool, slug: &str, url: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO links (slug, url, expires_at) VALUES ($1, $2, NOW() + INTERVAL '1 day') RETURNING id",
    )
    .bind(slug)
    .bind(url)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn get_visits(pool: &PgPool, slug: &str) -> i64 {
    sqlx::query_scalar("SELECT visits FROM links WHERE slug = $1")
        .bind(slug)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub fn create_test_state(pool: PgPool) -> AppState {
    let link_repo = Arc::new(PgLinkRepository::new(Arc::new(pool)));
    AppState::new(link_repo, DEFAULT_PAGE_LIMIT)
}

pub fn create_memory_state() -> AppState {
    AppState::new(Arc::new(InMemoryLinkRepository::new()), DEFAULT_PAGE_LIMIT)
}

pub fn link_app(state: AppState) -> Router {
    link_routes().with_state(state)
}
