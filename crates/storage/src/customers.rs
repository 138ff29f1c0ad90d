//! Customer Data Store

use crate::repository::Repository;
use crate::schema::{lookup_sql, CustomerTable};
use crate::value::{CellValue, CustomerRecord, RecordField, TableData};
use crate::StorageError;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, TypeInfo, ValueRef};
use tracing::debug;

impl Repository {
    /// Join one customer across all six tables. `None` when the ID is unknown.
    pub async fn lookup_customer(&self, customer_id: &str) -> Result<Option<CustomerRecord>, StorageError> {
        let (sql, names) = lookup_sql();

        let row = {
            let mut conn = self.pool.acquire().await?;
            sqlx::query(&sql)
                .bind(customer_id)
                .fetch_optional(&mut *conn)
                .await?
        };

        let Some(row) = row else {
            debug!("No customer with ID {}", customer_id);
            return Ok(None);
        };

        let values = decode_row(&row, names.len())?;
        let fields = names
            .into_iter()
            .zip(values)
            .map(|(name, value)| RecordField { name, value })
            .collect();

        Ok(Some(CustomerRecord {
            customer_id: customer_id.to_string(),
            fields,
        }))
    }

    /// Every row of one table, in load order
    pub async fn scan_table(&self, table: CustomerTable) -> Result<TableData, StorageError> {
        let rows = {
            let mut conn = self.pool.acquire().await?;
            sqlx::query(&table.select_sql())
                .fetch_all(&mut *conn)
                .await?
        };

        let columns: Vec<String> = table.columns().iter().map(|c| c.name.to_string()).collect();
        let rows = rows
            .iter()
            .map(|row| decode_row(row, columns.len()))
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Scanned {} rows from {}", rows.len(), table);
        Ok(TableData {
            table,
            columns,
            rows,
        })
    }
}

fn decode_row(row: &SqliteRow, width: usize) -> Result<Vec<CellValue>, StorageError> {
    (0..width).map(|idx| decode_cell(row, idx)).collect()
}

/// Decode by the value's runtime storage class, not the declared column type
fn decode_cell(row: &SqliteRow, idx: usize) -> Result<CellValue, StorageError> {
    let storage_class = {
        let raw = row.try_get_raw(idx)?;
        if raw.is_null() {
            return Ok(CellValue::Null);
        }
        raw.type_info().name().to_string()
    };

    let value = match storage_class.as_str() {
        "INTEGER" => CellValue::Integer(row.try_get_unchecked::<i64, _>(idx)?),
        "REAL" => CellValue::Real(row.try_get_unchecked::<f64, _>(idx)?),
        "TEXT" => CellValue::Text(row.try_get_unchecked::<String, _>(idx)?),
        other => CellValue::Text(format!("<{}>", other.to_ascii_lowercase())),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> Repository {
        let repo = Repository::in_memory().await.unwrap();
        sqlx::query(
            r#"INSERT INTO customer ("Customer ID", "Gender", "Age", "Married")
               VALUES ('0002-ORFBO', 'Female', 37, 'Yes'), ('0003-MKNFE', 'Male', 46, 'No')"#,
        )
        .execute(&repo.pool)
        .await
        .unwrap();
        sqlx::query(
            r#"INSERT INTO churn ("Customer ID", "Churn", "Churn Score")
               VALUES ('0002-ORFBO', 'No', 65)"#,
        )
        .execute(&repo.pool)
        .await
        .unwrap();
        sqlx::query(
            r#"INSERT INTO charges ("Customer ID", "Monthly Charge")
               VALUES ('0002-ORFBO', 65.6)"#,
        )
        .execute(&repo.pool)
        .await
        .unwrap();
        repo
    }

    #[tokio::test]
    async fn test_lookup_joins_tables() {
        let repo = seeded().await;
        let record = repo.lookup_customer("0002-ORFBO").await.unwrap().unwrap();

        assert_eq!(record.customer_id, "0002-ORFBO");
        assert_eq!(
            record.get("Customer ID"),
            Some(&CellValue::Text("0002-ORFBO".to_string()))
        );
        assert_eq!(record.get("customer_Age"), Some(&CellValue::Integer(37)));
        assert_eq!(record.get("churn_Churn Score"), Some(&CellValue::Integer(65)));
        assert_eq!(record.get("charges_Monthly Charge"), Some(&CellValue::Real(65.6)));
        assert_eq!(record.get("services_Phone Service"), Some(&CellValue::Null));
    }

    #[tokio::test]
    async fn test_lookup_without_joined_rows() {
        let repo = seeded().await;
        let record = repo.lookup_customer("0003-MKNFE").await.unwrap().unwrap();
        assert_eq!(record.get("customer_Gender"), Some(&CellValue::Text("Male".to_string())));
        assert_eq!(record.get("churn_Churn"), Some(&CellValue::Null));
    }

    #[tokio::test]
    async fn test_lookup_unknown_id() {
        let repo = seeded().await;
        assert!(repo.lookup_customer("9999-XXXXX").await.unwrap().is_none());
        assert!(repo.lookup_customer("' OR '1'='1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_scan_table() {
        let repo = seeded().await;
        let data = repo.scan_table(CustomerTable::Customer).await.unwrap();

        assert_eq!(data.table, CustomerTable::Customer);
        assert_eq!(data.columns.len(), 9);
        assert_eq!(data.rows.len(), 2);
        assert_eq!(data.rows[0][0], CellValue::Text("0002-ORFBO".to_string()));
        assert_eq!(data.rows[1][2], CellValue::Integer(46));
        assert_eq!(data.rows[1][8], CellValue::Null);

        let empty = repo.scan_table(CustomerTable::Services).await.unwrap();
        assert!(empty.rows.is_empty());
        assert_eq!(empty.columns.len(), 13);
    }
}
