use crate::prelude::*;

/// A skill entry, grouped by category on the home page.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct Skill {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub proficiency: i64,
    pub sort_order: i64,
    pub is_active: bool,
    pub featured: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, serde::Deserialize)]
pub struct UpdateSkill {
    pub name: String,
    pub category: String,
    pub proficiency: i64,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default)]
    pub featured: bool,
}

impl Skill {
    pub async fn create(db: &Db, s: &UpdateSkill) -> AppResult<i64> {
        let row = sqlx::query(
            "INSERT INTO skills (name, category, proficiency, sort_order, featured) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&s.name)
        .bind(&s.category)
        .bind(s.proficiency)
        .bind(s.sort_order)
        .bind(s.featured)
        .execute(db)
        .await?;
        Ok(row.last_insert_rowid())
    }

    pub async fn lookup_by_name(db: &Db, name: &str) -> AppResult<Option<Skill>> {
        let skill = sqlx::query_as::<_, Skill>("SELECT * FROM skills WHERE name = ?")
            .bind(name)
            .fetch_optional(db)
            .await?;
        Ok(skill)
    }

    pub async fn list_active(db: &Db) -> AppResult<Vec<Skill>> {
        let skills = sqlx::query_as::<_, Skill>(
            "SELECT * FROM skills \
             WHERE is_active = 1 \
             ORDER BY featured DESC, sort_order ASC, name ASC",
        )
        .fetch_all(db)
        .await?;
        Ok(skills)
    }
}
