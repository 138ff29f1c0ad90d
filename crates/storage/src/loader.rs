//! CSV Loader

use crate::repository::Repository;
use crate::schema::{quote, Column, CustomerTable, CUSTOMER_ID};
use crate::value::CellValue;
use crate::StorageError;
use serde::Serialize;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments};
use std::path::Path;
use tracing::{info, warn};

/// Outcome of loading one CSV file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadSummary {
    pub table: CustomerTable,
    pub rows: usize,
    /// CSV headers with no matching column in the table schema
    pub ignored_columns: Vec<String>,
}

impl Repository {
    /// Replace a table's rows with the contents of a CSV file.
    ///
    /// Runs in one transaction: on any error the table keeps its previous rows.
    pub async fn load_csv(&self, table: CustomerTable, path: &Path) -> Result<LoadSummary, StorageError> {
        let csv_error = |message: String| StorageError::Csv {
            path: path.to_path_buf(),
            message,
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| csv_error(e.to_string()))?;

        let headers = reader.headers().map_err(|e| csv_error(e.to_string()))?.clone();

        let mut mapping: Vec<(usize, &'static Column)> = Vec::new();
        let mut ignored_columns = Vec::new();
        for (idx, header) in headers.iter().enumerate() {
            match table.column(header) {
                Some(column) => mapping.push((idx, column)),
                None => ignored_columns.push(header.to_string()),
            }
        }

        if !mapping.iter().any(|(_, c)| c.name == CUSTOMER_ID) {
            return Err(csv_error(format!("missing {:?} column", CUSTOMER_ID)));
        }
        if !ignored_columns.is_empty() {
            warn!(
                "{}: ignoring columns not in the {} schema: {:?}",
                path.display(),
                table,
                ignored_columns
            );
        }

        let records = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| csv_error(e.to_string()))?;

        let column_list: Vec<String> = mapping.iter().map(|(_, c)| quote(c.name)).collect();
        let placeholders = vec!["?"; mapping.len()].join(", ");
        let insert = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote(table.name()),
            column_list.join(", "),
            placeholders
        );

        let mut tx = self.pool.begin().await?;
        sqlx::query(&format!("DELETE FROM {}", quote(table.name())))
            .execute(&mut *tx)
            .await?;

        for record in &records {
            let mut query = sqlx::query(&insert);
            for (idx, column) in &mapping {
                let raw = record.get(*idx).unwrap_or("");
                query = bind_cell(query, CellValue::parse(raw, column.sql_type));
            }
            query.execute(&mut *tx).await?;
        }
        tx.commit().await?;

        info!("Loaded {} rows into {} from {}", records.len(), table, path.display());
        Ok(LoadSummary {
            table,
            rows: records.len(),
            ignored_columns,
        })
    }

    /// Load `<table>.csv` for all six tables from `dir`
    pub async fn load_directory(&self, dir: &Path) -> Result<Vec<LoadSummary>, StorageError> {
        let files: Vec<_> = CustomerTable::ALL
            .iter()
            .map(|table| (*table, dir.join(format!("{}.csv", table.name()))))
            .collect();

        if let Some((_, missing)) = files.iter().find(|(_, path)| !path.is_file()) {
            return Err(StorageError::Csv {
                path: missing.clone(),
                message: "file not found".to_string(),
            });
        }

        let mut summaries = Vec::with_capacity(files.len());
        for (table, path) in &files {
            summaries.push(self.load_csv(*table, path).await?);
        }
        Ok(summaries)
    }
}

fn bind_cell<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: CellValue,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        CellValue::Null => query.bind(None::<String>),
        CellValue::Integer(v) => query.bind(v),
        CellValue::Real(v) => query.bind(v),
        CellValue::Text(v) => query.bind(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn csv_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("churn-csv-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    const CUSTOMER_CSV: &str = "\
Customer ID,Gender,Age,Senior Citizen,Married,Dependents,Number of Dependents,Under 30,Partner,Extra
0002-ORFBO,Female,37,No,Yes,No,0,No,Yes,x
0003-MKNFE,Male,46,No,No,No,,No,No,y
";

    #[tokio::test]
    async fn test_load_csv() {
        let dir = csv_dir("single");
        let path = dir.join("customer.csv");
        std::fs::write(&path, CUSTOMER_CSV).unwrap();

        let repo = Repository::in_memory().await.unwrap();
        let summary = repo.load_csv(CustomerTable::Customer, &path).await.unwrap();

        assert_eq!(summary.rows, 2);
        assert_eq!(summary.ignored_columns, vec!["Extra".to_string()]);

        let data = repo.scan_table(CustomerTable::Customer).await.unwrap();
        assert_eq!(data.rows[0][2], CellValue::Integer(37));
        assert_eq!(data.rows[1][6], CellValue::Null);
    }

    #[tokio::test]
    async fn test_reload_replaces_rows() {
        let dir = csv_dir("reload");
        let path = dir.join("customer.csv");
        std::fs::write(&path, CUSTOMER_CSV).unwrap();

        let repo = Repository::in_memory().await.unwrap();
        repo.load_csv(CustomerTable::Customer, &path).await.unwrap();
        repo.load_csv(CustomerTable::Customer, &path).await.unwrap();

        assert_eq!(repo.row_count(CustomerTable::Customer).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_rows() {
        let dir = csv_dir("rollback");
        let good = dir.join("good.csv");
        let duplicate = dir.join("duplicate.csv");
        std::fs::write(&good, CUSTOMER_CSV).unwrap();
        std::fs::write(
            &duplicate,
            "Customer ID,Gender\n1111-AAAAA,Male\n1111-AAAAA,Female\n",
        )
        .unwrap();

        let repo = Repository::in_memory().await.unwrap();
        repo.load_csv(CustomerTable::Customer, &good).await.unwrap();

        let result = repo.load_csv(CustomerTable::Customer, &duplicate).await;
        assert!(matches!(result, Err(StorageError::DatabaseError(_))));
        assert!(repo.lookup_customer("0002-ORFBO").await.unwrap().is_some());
        assert_eq!(repo.row_count(CustomerTable::Customer).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_requires_customer_id() {
        let dir = csv_dir("nokey");
        let path = dir.join("churn.csv");
        std::fs::write(&path, "Churn,Churn Score\nYes,80\n").unwrap();

        let repo = Repository::in_memory().await.unwrap();
        let result = repo.load_csv(CustomerTable::Churn, &path).await;
        assert!(matches!(result, Err(StorageError::Csv { .. })));
    }

    #[tokio::test]
    async fn test_load_directory_requires_all_files() {
        let dir = csv_dir("partial");
        std::fs::write(dir.join("customer.csv"), CUSTOMER_CSV).unwrap();

        let repo = Repository::in_memory().await.unwrap();
        let result = repo.load_directory(&dir).await;
        assert!(matches!(result, Err(StorageError::Csv { .. })));
        assert_eq!(repo.row_count(CustomerTable::Customer).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_load_directory() {
        let dir = csv_dir("full");
        for table in CustomerTable::ALL {
            let header: Vec<&str> = table.columns().iter().map(|c| c.name).collect();
            std::fs::write(
                dir.join(format!("{}.csv", table.name())),
                format!("{}\n0002-ORFBO{}\n", header.join(","), ",".repeat(header.len() - 1)),
            )
            .unwrap();
        }

        let repo = Repository::in_memory().await.unwrap();
        let summaries = repo.load_directory(&dir).await.unwrap();
        assert_eq!(summaries.len(), 6);
        assert!(summaries.iter().all(|s| s.rows == 1));

        let record = repo.lookup_customer("0002-ORFBO").await.unwrap().unwrap();
        assert_eq!(record.get("location_City"), Some(&CellValue::Null));
    }
}
