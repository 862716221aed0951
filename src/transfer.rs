//! CSV dumps of the categories and questions tables.

use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::db::queries::categories::{get_all_categories, import_categories};
use crate::db::queries::questions::{get_all_questions, import_questions};
use crate::db::{Category, Question};

const CATEGORIES_FILE: &str = "categories.csv";
const QUESTIONS_FILE: &str = "questions.csv";

#[derive(Debug, PartialEq, Eq)]
pub struct ImportReport {
    pub categories: u64,
    pub questions: u64,
}

fn write_to(path: &Path, data: Vec<impl Serialize>) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Cannot create {}", path.display()))?;
    let mut wtr = csv::Writer::from_writer(file);
    for line in data {
        wtr.serialize(line)?;
    }
    wtr.flush()?;
    Ok(())
}

fn read_from<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    let file =
        std::fs::File::open(path).with_context(|| format!("Cannot open {}", path.display()))?;
    let mut rdr = csv::Reader::from_reader(file);
    let mut out = Vec::new();
    for record in rdr.deserialize() {
        let record: T = record.with_context(|| format!("Malformed row in {}", path.display()))?;
        out.push(record);
    }
    Ok(out)
}

pub async fn export_data(pool: &SqlitePool, dir: &Path) -> anyhow::Result<()> {
    let categories = get_all_categories(pool).await?;
    let questions = get_all_questions(pool).await?;
    if !dir.exists() {
        std::fs::create_dir_all(dir)?
    }
    tracing::info!(
        categories = categories.len(),
        questions = questions.len(),
        "Exporting to {}",
        dir.display()
    );
    write_to(&dir.join(CATEGORIES_FILE), categories)?;
    write_to(&dir.join(QUESTIONS_FILE), questions)?;
    Ok(())
}

/// Adds rows from the dump whose ids are not in the database yet.
pub async fn import_data(pool: &SqlitePool, dir: &Path) -> anyhow::Result<ImportReport> {
    let categories: Vec<Category> = read_from(&dir.join(CATEGORIES_FILE))?;
    let questions: Vec<Question> = read_from(&dir.join(QUESTIONS_FILE))?;
    // questions reference categories
    let report = ImportReport {
        categories: import_categories(pool, categories).await?,
        questions: import_questions(pool, questions).await?,
    };
    tracing::info!(?report, "Imported from {}", dir.display());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::queries::questions::create_question;
    use crate::db::{test_pool, NewQuestion};
    use tempfile::TempDir;

    #[tokio::test]
    async fn export_then_import_into_fresh_database() {
        let source = test_pool().await;
        create_question(
            &source,
            &NewQuestion {
                question: "Which planet is known as the red planet?".to_owned(),
                answer: "Mars".to_owned(),
                category: 1,
                difficulty: 2,
            },
        )
        .await
        .unwrap();
        sqlx::query("INSERT INTO categories (id, type) VALUES (7, 'Music')")
            .execute(&source)
            .await
            .unwrap();

        let dir = TempDir::with_prefix("trivia-export").unwrap();
        export_data(&source, dir.path()).await.unwrap();

        let target = test_pool().await;
        let report = import_data(&target, dir.path()).await.unwrap();
        assert_eq!(
            report,
            ImportReport {
                categories: 1,
                questions: 1
            }
        );
        assert_eq!(
            get_all_questions(&target).await.unwrap(),
            get_all_questions(&source).await.unwrap()
        );

        // importing the same dump twice changes nothing
        let again = import_data(&target, dir.path()).await.unwrap();
        assert_eq!(
            again,
            ImportReport {
                categories: 0,
                questions: 0
            }
        );
    }

    #[tokio::test]
    async fn missing_dump_is_an_error() {
        let pool = test_pool().await;
        let dir = TempDir::with_prefix("trivia-empty").unwrap();
        assert!(import_data(&pool, dir.path()).await.is_err());
    }
}
