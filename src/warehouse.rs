//! Warehouse gateway boundary. The cleaning core hands cleaned CSV bytes to
//! a gateway and asks it aggregate questions; everything behind the trait is
//! an external collaborator.

use crate::error::{InsightError, Result};
use crate::table::{Column, ColumnValues, Table};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Connection settings for a warehouse client. Constructed once per process
/// invocation and passed explicitly; never ambient global state.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct WarehouseConfig {
    pub project: String,
    pub dataset: String,
    pub credentials_path: Option<std::path::PathBuf>,
}

impl WarehouseConfig {
    /// Fully qualified destination identifier for a table in this dataset.
    pub fn qualified_destination(&self, table: &str) -> String {
        format!("{}.{}.{}", self.project, self.dataset, table)
    }
}

/// Bulk-load and query boundary to the warehouse. `load` accepts CSV bytes
/// (header row included, schema inferred) and blocks until the load
/// finishes; `query` runs a read query and returns a tabular result. The
/// core never retries these calls; failures surface to the caller.
#[async_trait]
pub trait WarehouseGateway: Send + Sync {
    async fn load(&self, table_bytes: &[u8], destination: &str) -> Result<()>;
    async fn query(&self, sql: &str) -> Result<Table>;
}

/// In-memory warehouse implementation for development/testing. Stores
/// loaded tables by destination and answers the one aggregate query shape
/// the report uses:
///
/// `SELECT <cat>, AVG(<val>) AS <alias> FROM <dest> GROUP BY <cat> ORDER BY <alias> DESC`
pub struct InMemoryWarehouse {
    tables: Arc<Mutex<HashMap<String, Table>>>,
}

static AVG_QUERY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)^\s*SELECT\s+(\w+)\s*,\s*AVG\(\s*(\w+)\s*\)\s+AS\s+(\w+)\s+FROM\s+`?([\w.-]+)`?\s+GROUP\s+BY\s+(\w+)\s+ORDER\s+BY\s+(\w+)\s+DESC\s*;?\s*$",
    )
    .expect("aggregate query pattern")
});

impl InMemoryWarehouse {
    pub fn new() -> Self {
        Self {
            tables: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn lookup(&self, destination: &str) -> Result<Table> {
        let tables = self.tables.lock().unwrap();
        if let Some(table) = tables.get(destination) {
            return Ok(table.clone());
        }
        // Fully qualified names fall back to their last dotted segment.
        if let Some(short) = destination.rsplit('.').next() {
            if let Some(table) = tables.get(short) {
                return Ok(table.clone());
            }
        }
        Err(InsightError::Warehouse(format!(
            "unknown destination '{}'",
            destination
        )))
    }
}

impl Default for InMemoryWarehouse {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WarehouseGateway for InMemoryWarehouse {
    async fn load(&self, table_bytes: &[u8], destination: &str) -> Result<()> {
        // Schema inference reuses the CSV loader, matching how a real
        // warehouse ingests the byte stream.
        let table = crate::table::io::read_csv_bytes(table_bytes)
            .map_err(|e| InsightError::Warehouse(format!("load rejected: {}", e)))?;

        let rows = table.row_count();
        let mut tables = self.tables.lock().unwrap();
        tables.insert(destination.to_string(), table);
        info!(destination, rows, "bulk load complete");
        Ok(())
    }

    async fn query(&self, sql: &str) -> Result<Table> {
        let captures = AVG_QUERY.captures(sql).ok_or_else(|| {
            InsightError::Warehouse(format!("unsupported query shape: {}", sql.trim()))
        })?;

        let category = captures.get(1).unwrap().as_str();
        let value = captures.get(2).unwrap().as_str();
        let alias = captures.get(3).unwrap().as_str();
        let destination = captures.get(4).unwrap().as_str();
        let group_by = captures.get(5).unwrap().as_str();
        let order_by = captures.get(6).unwrap().as_str();

        if group_by != category || order_by != alias {
            return Err(InsightError::Warehouse(format!(
                "GROUP BY/ORDER BY must reference '{}' and '{}'",
                category, alias
            )));
        }

        let table = self.lookup(destination)?;
        debug!(destination, category, value, "running aggregate query");
        average_by(&table, category, value, alias)
    }
}

/// Averages `value` per distinct `category`, sorted by average descending
/// (ties broken by category name for determinism).
fn average_by(table: &Table, category: &str, value: &str, alias: &str) -> Result<Table> {
    let categories = match &table
        .column(category)
        .ok_or_else(|| InsightError::MissingColumn(category.to_string()))?
        .values
    {
        ColumnValues::Textual(v) => v,
        ColumnValues::Numeric(_) => {
            return Err(InsightError::Warehouse(format!(
                "'{}' is numeric; GROUP BY needs a textual column",
                category
            )))
        }
    };
    let values = match &table
        .column(value)
        .ok_or_else(|| InsightError::MissingColumn(value.to_string()))?
        .values
    {
        ColumnValues::Numeric(v) => v,
        ColumnValues::Textual(_) => {
            return Err(InsightError::Warehouse(format!(
                "'{}' is textual; AVG needs a numeric column",
                value
            )))
        }
    };

    let mut sums: HashMap<&str, (f64, usize)> = HashMap::new();
    for (cell, amount) in categories.iter().zip(values.iter()) {
        if let (Some(cat), Some(v)) = (cell.as_deref(), amount) {
            let entry = sums.entry(cat).or_insert((0.0, 0));
            entry.0 += v;
            entry.1 += 1;
        }
    }

    let mut rows: Vec<(String, f64)> = sums
        .into_iter()
        .map(|(cat, (sum, count))| (cat.to_string(), sum / count as f64))
        .collect();
    rows.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap().then_with(|| a.0.cmp(&b.0)));

    let (cats, avgs): (Vec<_>, Vec<_>) = rows
        .into_iter()
        .map(|(cat, avg)| (Some(cat), Some(avg)))
        .unzip();
    Ok(Table::new(vec![
        Column::textual(category, cats),
        Column::numeric(alias, avgs),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLEANED_CSV: &[u8] =
        b"job_title_category,annual_base_pay\nEngineering,100000\nEngineering,120000\nDesign,90000\n";

    #[tokio::test]
    async fn load_then_query_returns_sorted_averages() {
        let warehouse = InMemoryWarehouse::new();
        warehouse.load(CLEANED_CSV, "cleaned_salaries").await.unwrap();

        let result = warehouse
            .query(
                "SELECT job_title_category, AVG(annual_base_pay) AS avg_salary \
                 FROM cleaned_salaries GROUP BY job_title_category ORDER BY avg_salary DESC",
            )
            .await
            .unwrap();

        assert_eq!(
            result.column("job_title_category").unwrap().values,
            ColumnValues::Textual(vec![
                Some("Engineering".to_string()),
                Some("Design".to_string())
            ])
        );
        assert_eq!(
            result.column("avg_salary").unwrap().values,
            ColumnValues::Numeric(vec![Some(110_000.0), Some(90_000.0)])
        );
    }

    #[tokio::test]
    async fn fully_qualified_destination_resolves() {
        let warehouse = InMemoryWarehouse::new();
        warehouse.load(CLEANED_CSV, "cleaned_salaries").await.unwrap();

        let result = warehouse
            .query(
                "SELECT job_title_category, AVG(annual_base_pay) AS avg_salary \
                 FROM `tech-salary-insights.tech_salaries_dataset.cleaned_salaries` \
                 GROUP BY job_title_category ORDER BY avg_salary DESC",
            )
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn unknown_destination_is_a_gateway_error() {
        let warehouse = InMemoryWarehouse::new();
        let result = warehouse
            .query(
                "SELECT a, AVG(b) AS c FROM nowhere GROUP BY a ORDER BY c DESC",
            )
            .await;
        assert!(matches!(result, Err(InsightError::Warehouse(_))));
    }

    #[tokio::test]
    async fn unsupported_query_shape_is_rejected() {
        let warehouse = InMemoryWarehouse::new();
        warehouse.load(CLEANED_CSV, "cleaned_salaries").await.unwrap();

        let result = warehouse.query("SELECT * FROM cleaned_salaries").await;
        assert!(matches!(result, Err(InsightError::Warehouse(_))));
    }

    #[tokio::test]
    async fn malformed_bytes_are_rejected_by_load() {
        let warehouse = InMemoryWarehouse::new();
        let result = warehouse.load(b"a,b\n1,2\n3\n", "broken").await;
        assert!(matches!(result, Err(InsightError::Warehouse(_))));
    }
}
