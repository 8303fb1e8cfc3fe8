//! # Seed
//!
//! Fills a development database with a few demo accounts and posts, then
//! prints a signed identity token per account for use with `curl`.
//! Running it twice is harmless: existing accounts are left alone.

use anyhow::Context;
use auth_adapters::mint_token;
use chrono::Duration;
use configs::Settings;
use domains::{NewNotification, NewPost, NewUser, PostFilter, PostRepo, ProfileUpdate, SocialRepo, User, UserRepo};
use secrecy::ExposeSecret;
use serde_json::json;
use storage_adapters::SqliteStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

struct DemoUser {
    handle: &'static str,
    name: &'static str,
    bio: &'static str,
    first_post: &'static str,
}

const DEMO_USERS: [DemoUser; 3] = [
    DemoUser { handle: "test", name: "Test User", bio: "Test user bio", first_post: "This is my first post on Hearth!" },
    DemoUser { handle: "alice", name: "Alice Smith", bio: "Hello, I'm Alice!", first_post: "Good morning, everyone." },
    DemoUser { handle: "bob", name: "Bob Jones", bio: "Mostly here for the comments.", first_post: "Anyone up for a walk later?" },
];

const TOKEN_TTL_DAYS: i64 = 30;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading configuration")?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log.filter)))
        .init();

    let store = SqliteStore::open(&settings.database.url, settings.database.max_connections)
        .await
        .with_context(|| format!("opening database {}", settings.database.url))?;

    let mut users = Vec::with_capacity(DEMO_USERS.len());
    for demo in &DEMO_USERS {
        users.push(ensure_user(&store, demo).await?);
    }

    // Bob follows Alice; Alice likes the test user's first post.
    if let [test, alice, bob] = users.as_slice() {
        if !store.is_following(bob.id, alice.id).await? {
            store.toggle_follow(bob.id, alice.id, NewNotification::follow(bob.id, alice.id)).await?;
        }
        let test_posts = store.list_posts(PostFilter::Author(test.id)).await?;
        if let Some(post) = test_posts.last() {
            if !post.liked_by.contains(&alice.id) {
                store
                    .toggle_like(alice.id, post.post.id, NewNotification::like(alice.id, test.id, post.post.id))
                    .await?;
            }
        }
    }

    let secret = settings.identity.secret.expose_secret().as_bytes();
    for (demo, user) in DEMO_USERS.iter().zip(&users) {
        let profile = json!({ "email": user.email, "username": user.username, "name": demo.name });
        let token = mint_token(secret, &user.external_id, profile, Duration::days(TOKEN_TTL_DAYS))?;
        println!("{:<6} {token}", user.username);
    }

    store.close().await;
    Ok(())
}

async fn ensure_user(store: &SqliteStore, demo: &DemoUser) -> anyhow::Result<User> {
    let external_id = format!("seed_{}", demo.handle);
    if let Some(existing) = store.find_user_by_external_id(&external_id).await? {
        return Ok(existing);
    }

    let user = store
        .create_user(NewUser {
            external_id,
            username: demo.handle.to_string(),
            email: format!("{}@example.com", demo.handle),
            name: Some(demo.name.to_string()),
            image: None,
        })
        .await
        .with_context(|| format!("creating {}", demo.handle))?;

    let user = store
        .update_profile(user.id, ProfileUpdate { bio: Some(demo.bio.to_string()), ..Default::default() })
        .await?;
    store
        .create_post(NewPost { author_id: user.id, content: Some(demo.first_post.to_string()), image: None })
        .await?;

    info!(username = %user.username, "seeded user");
    Ok(user)
}
