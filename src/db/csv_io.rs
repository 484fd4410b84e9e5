//! CSV import/export used to seed a database with questions.

use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;

use super::queries::categories::{get_all_categories, import_categories};
use super::queries::questions::{get_all_questions, import_questions};
use super::{Category, Question};

const CATEGORIES_FILE: &str = "categories.csv";
const QUESTIONS_FILE: &str = "questions.csv";

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
        let record: T = record.with_context(|| format!("Bad record in {}", path.display()))?;
        out.push(record);
    }
    Ok(out)
}

pub async fn export_data(pool: &SqlitePool, path: &Path) -> anyhow::Result<()> {
    let categories = get_all_categories(pool).await?;
    let questions = get_all_questions(pool).await?;
    if !path.exists() {
        std::fs::create_dir_all(path)?
    }
    write_to(&path.join(CATEGORIES_FILE), categories)?;
    write_to(&path.join(QUESTIONS_FILE), questions)?;
    tracing::info!(path = %path.display(), "Export finished");
    Ok(())
}

/// Upserts both files in one transaction; a bad record leaves the database untouched.
pub async fn import_data(pool: &SqlitePool, path: &Path) -> anyhow::Result<()> {
    let categories: Vec<Category> = read_from(&path.join(CATEGORIES_FILE))?;
    let questions: Vec<Question> = read_from(&path.join(QUESTIONS_FILE))?;
    let (n_categories, n_questions) = (categories.len(), questions.len());

    let mut tx = pool.begin().await?;
    import_categories(&mut tx, categories).await?;
    import_questions(&mut tx, questions).await?;
    tx.commit().await?;

    tracing::info!(
        categories = n_categories,
        questions = n_questions,
        "Import finished"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test]
    async fn import_seeds_questions(pool: SqlitePool) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CATEGORIES_FILE),
            "id,type\n1,Science\n7,Music\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join(QUESTIONS_FILE),
            "id,question,answer,category,difficulty\n\
             12,Who wrote the Ring cycle?,Wagner,7,3\n\
             13,What is H2O?,Water,1,1\n",
        )
        .unwrap();

        import_data(&pool, dir.path()).await.unwrap();

        let questions = get_all_questions(&pool).await.unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].id, 12);
        assert_eq!(questions[0].answer, "Wagner");
        assert_eq!(get_all_categories(&pool).await.unwrap().len(), 7);
    }

    #[sqlx::test]
    async fn bad_record_aborts_import(pool: SqlitePool) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CATEGORIES_FILE), "id,type\n9,Music\n").unwrap();
        std::fs::write(
            dir.path().join(QUESTIONS_FILE),
            "id,question,answer,category,difficulty\n1,Broken?,Yes,9,hard\n",
        )
        .unwrap();

        assert!(import_data(&pool, dir.path()).await.is_err());
        assert_eq!(get_all_categories(&pool).await.unwrap().len(), 6);
        assert!(get_all_questions(&pool).await.unwrap().is_empty());
    }

    #[sqlx::test]
    async fn export_creates_missing_directory(pool: SqlitePool) {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("dump");

        export_data(&pool, &target).await.unwrap();

        let categories: Vec<Category> = read_from(&target.join(CATEGORIES_FILE)).unwrap();
        assert_eq!(categories.len(), 6);
        assert_eq!(categories[0].kind, "Science");
        assert!(target.join(QUESTIONS_FILE).exists());
    }
}
