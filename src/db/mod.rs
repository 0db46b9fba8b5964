use std::path::Path;

use anyhow::Context as _;
use serde::Deserialize;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};

use crate::utils::config::DbConfig;

pub type Db = SqlitePool;

pub mod blog_post;
pub mod comment;
pub mod contact;
pub mod project;
pub mod settings;
pub mod skill;
pub mod subscriber;
pub mod testimonial;

/// Create a new db connection pool, initializing and running migrations if necessary.
pub async fn init(db_config: &DbConfig) -> anyhow::Result<Db> {
    let url = format!("sqlite://{}", db_config.file.display());
    if !Sqlite::database_exists(&url).await? {
        Sqlite::create_database(&url).await?;
    }
    let db = SqlitePool::connect(&url).await?;

    migrate(&db).await?;

    if let Some(seed_data) = &db_config.seed_data {
        seed_db(&db, seed_data).await?;
    }

    Ok(db)
}

/// Apply the embedded migrations.
pub async fn migrate(db: &Db) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(db).await?;
    Ok(())
}

/// An in-memory database with the schema applied, for tests. The pool is
/// pinned to one connection since each sqlite `:memory:` handle is its own
/// database.
pub async fn init_memory() -> anyhow::Result<Db> {
    let db = SqlitePoolOptions::new().max_connections(1).connect("sqlite::memory:").await?;
    migrate(&db).await?;
    Ok(db)
}

#[derive(Deserialize)]
struct SeedData {
    #[serde(default)]
    projects: Vec<project::UpdateProject>,
    #[serde(default)]
    skills: Vec<skill::UpdateSkill>,
    #[serde(default)]
    testimonials: Vec<testimonial::UpdateTestimonial>,
}

impl SeedData {
    pub async fn load(file: &Path) -> anyhow::Result<Self> {
        let contents = tokio::fs::read_to_string(file).await?;
        toml::from_str(&contents).with_context(|| format!("loading seed data={file:#?}"))
    }
}

async fn seed_db(db: &Db, seed_data_path: &Path) -> anyhow::Result<()> {
    let seed_data = SeedData::load(seed_data_path).await?;

    for p in seed_data.projects {
        if project::Project::lookup_by_slug(db, &p.slug).await?.is_none() {
            project::Project::create(db, &p).await?;
        }
    }
    for s in seed_data.skills {
        if skill::Skill::lookup_by_name(db, &s.name).await?.is_none() {
            skill::Skill::create(db, &s).await?;
        }
    }
    for t in seed_data.testimonials {
        if testimonial::Testimonial::lookup_by_name(db, &t.name).await?.is_none() {
            testimonial::Testimonial::create(db, &t).await?;
        }
    }

    Ok(())
}
