// ============================================================================
// IMPORT DU CATALOGUE D'INGRÉDIENTS
// ============================================================================
//
// Entrée: fichier JSON, tableau d'objets {"name": ..., "measurement_unit": ...}
//
// Workflow:
//   1. Lire et parser le fichier (fichier absent / JSON invalide / champ
//      manquant → ImportError, rapporté dans les logs)
//   2. Charger les couples (name, unit) déjà présents en BD
//   3. Garder uniquement les couples nouveaux (doublons du fichier inclus)
//   4. Insertion en masse dans une seule transaction, ON CONFLICT DO NOTHING
//
// Relancer l'import avec le même fichier n'insère rien (idempotent).
//
// ============================================================================

use std::collections::HashSet;
use std::path::Path;

use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use thiserror::Error;

use crate::models::ingredient;

// 2 paramètres par ligne, limite Postgres à 65535 paramètres par requête
const INSERT_CHUNK_SIZE: usize = 5000;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("File {0} not found")]
    FileNotFound(String),

    #[error("Malformed JSON: {0}")]
    MalformedJson(String),

    #[error("Missing required field `{field}` in record #{index}")]
    MissingField { index: usize, field: &'static str },

    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    Imported(u64),
    NothingToImport,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IngredientRecord {
    pub name: String,
    pub measurement_unit: String,
}

pub struct IngredientImporter;

impl IngredientImporter {
    /// Lance l'import et rapporte le résultat dans les logs, sans jamais échouer
    pub async fn import_and_report(db: &DatabaseConnection, path: &Path) -> Option<ImportOutcome> {
        match Self::import_file(db, path).await {
            Ok(ImportOutcome::Imported(count)) => {
                log::info!("✅ Imported {} new ingredients from {}", count, path.display());
                Some(ImportOutcome::Imported(count))
            }
            Ok(ImportOutcome::NothingToImport) => {
                log::info!("No new ingredients to import from {}", path.display());
                Some(ImportOutcome::NothingToImport)
            }
            Err(e) => {
                log::error!("❌ Ingredient import failed: {}", e);
                None
            }
        }
    }

    pub async fn import_file(
        db: &DatabaseConnection,
        path: &Path,
    ) -> Result<ImportOutcome, ImportError> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ImportError::FileNotFound(path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let records = parse_records(&content)?;
        Self::import_records(db, records).await
    }

    pub async fn import_records(
        db: &DatabaseConnection,
        records: Vec<IngredientRecord>,
    ) -> Result<ImportOutcome, ImportError> {
        let existing: HashSet<(String, String)> = ingredient::Entity::find()
            .all(db)
            .await?
            .into_iter()
            .map(|i| (i.name, i.measurement_unit))
            .collect();

        let new_records = select_new(records, &existing);
        if new_records.is_empty() {
            return Ok(ImportOutcome::NothingToImport);
        }

        let txn = db.begin().await?;
        let mut inserted = 0;

        for chunk in new_records.chunks(INSERT_CHUNK_SIZE) {
            let models = chunk.iter().map(|record| ingredient::ActiveModel {
                name: Set(record.name.clone()),
                measurement_unit: Set(record.measurement_unit.clone()),
                ..Default::default()
            });

            inserted += ingredient::Entity::insert_many(models)
                .on_conflict(
                    OnConflict::columns([
                        ingredient::Column::Name,
                        ingredient::Column::MeasurementUnit,
                    ])
                    .do_nothing()
                    .to_owned(),
                )
                .exec_without_returning(&txn)
                .await?;
        }

        txn.commit().await?;

        Ok(if inserted == 0 {
            ImportOutcome::NothingToImport
        } else {
            ImportOutcome::Imported(inserted)
        })
    }
}

pub fn parse_records(content: &str) -> Result<Vec<IngredientRecord>, ImportError> {
    let values: Vec<serde_json::Value> =
        serde_json::from_str(content).map_err(|e| ImportError::MalformedJson(e.to_string()))?;

    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let field = |field: &'static str| {
                value
                    .get(field)
                    .and_then(|v| v.as_str())
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .ok_or(ImportError::MissingField { index, field })
            };

            Ok(IngredientRecord {
                name: field("name")?,
                measurement_unit: field("measurement_unit")?,
            })
        })
        .collect()
}

/// Couples absents de la BD, sans doublons, dans l'ordre du fichier
pub fn select_new(
    records: Vec<IngredientRecord>,
    existing: &HashSet<(String, String)>,
) -> Vec<IngredientRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| !existing.contains(&(r.name.clone(), r.measurement_unit.clone())))
        .filter(|r| seen.insert(r.clone()))
        .collect()
}
