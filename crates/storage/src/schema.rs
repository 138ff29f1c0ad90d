//! Customer Table Schemas

use crate::StorageError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Key column shared by every customer table
pub const CUSTOMER_ID: &str = "Customer ID";

/// Declared SQLite column type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Text,
    Integer,
    Real,
}

impl SqlType {
    pub const fn as_sql(&self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
        }
    }
}

/// A declared column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub sql_type: SqlType,
}

const fn text(name: &'static str) -> Column {
    Column { name, sql_type: SqlType::Text }
}

const fn integer(name: &'static str) -> Column {
    Column { name, sql_type: SqlType::Integer }
}

const fn real(name: &'static str) -> Column {
    Column { name, sql_type: SqlType::Real }
}

const CHARGES: &[Column] = &[
    text(CUSTOMER_ID),
    real("Monthly Charge"),
    real("Total Charges"),
    real("Total Revenue"),
    real("Total Refunds"),
    real("Total Long Distance Charges"),
    real("Total Extra Data Charges"),
    real("Avg Monthly GB Download"),
    real("Avg Monthly Long Distance Charges"),
    real("CLTV"),
    text("Payment Method"),
    text("Paperless Billing"),
];

const CHURN: &[Column] = &[
    text(CUSTOMER_ID),
    text("Churn"),
    text("Churn Category"),
    text("Churn Reason"),
    integer("Churn Score"),
    text("Customer Status"),
    integer("Satisfaction Score"),
];

const CUSTOMER: &[Column] = &[
    text(CUSTOMER_ID),
    text("Gender"),
    integer("Age"),
    text("Senior Citizen"),
    text("Married"),
    text("Dependents"),
    integer("Number of Dependents"),
    text("Under 30"),
    text("Partner"),
];

const LOCATION: &[Column] = &[
    text(CUSTOMER_ID),
    text("City"),
    text("State"),
    text("Country"),
    text("Zip Code"),
    real("Latitude"),
    real("Longitude"),
    text("Lat Long"),
    integer("Population"),
];

const REFERRALS: &[Column] = &[
    text(CUSTOMER_ID),
    text("Referred a Friend"),
    integer("Number of Referrals"),
    text("Offer"),
    text("Contract"),
    integer("Tenure in Months"),
    text("Quarter"),
];

const SERVICES: &[Column] = &[
    text(CUSTOMER_ID),
    text("Phone Service"),
    text("Multiple Lines"),
    text("Internet Service"),
    text("Internet Type"),
    text("Streaming TV"),
    text("Streaming Movies"),
    text("Streaming Music"),
    text("Online Security"),
    text("Online Backup"),
    text("Device Protection Plan"),
    text("Premium Tech Support"),
    text("Unlimited Data"),
];

/// The six customer tables, each keyed by [`CUSTOMER_ID`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerTable {
    Charges,
    Churn,
    Customer,
    Location,
    Referrals,
    Services,
}

impl CustomerTable {
    /// All tables in display order
    pub const ALL: [CustomerTable; 6] = [
        CustomerTable::Charges,
        CustomerTable::Churn,
        CustomerTable::Customer,
        CustomerTable::Location,
        CustomerTable::Referrals,
        CustomerTable::Services,
    ];

    /// SQL table name (also the CSV file stem)
    pub const fn name(&self) -> &'static str {
        match self {
            CustomerTable::Charges => "charges",
            CustomerTable::Churn => "churn",
            CustomerTable::Customer => "customer",
            CustomerTable::Location => "location",
            CustomerTable::Referrals => "referrals",
            CustomerTable::Services => "services",
        }
    }

    /// Declared columns, key first
    pub const fn columns(&self) -> &'static [Column] {
        match self {
            CustomerTable::Charges => CHARGES,
            CustomerTable::Churn => CHURN,
            CustomerTable::Customer => CUSTOMER,
            CustomerTable::Location => LOCATION,
            CustomerTable::Referrals => REFERRALS,
            CustomerTable::Services => SERVICES,
        }
    }

    /// Look up a declared column
    pub fn column(&self, name: &str) -> Option<&'static Column> {
        self.columns().iter().find(|c| c.name == name)
    }

    pub(crate) fn create_sql(&self) -> String {
        let columns: Vec<String> = self
            .columns()
            .iter()
            .map(|c| {
                let key = if c.name == CUSTOMER_ID { " PRIMARY KEY" } else { "" };
                format!("{} {}{}", quote(c.name), c.sql_type.as_sql(), key)
            })
            .collect();

        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            quote(self.name()),
            columns.join(", ")
        )
    }

    pub(crate) fn select_sql(&self) -> String {
        let columns: Vec<String> = self.columns().iter().map(|c| quote(c.name)).collect();
        format!(
            "SELECT {} FROM {} ORDER BY rowid",
            columns.join(", "),
            quote(self.name())
        )
    }
}

impl fmt::Display for CustomerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CustomerTable {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CustomerTable::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| StorageError::UnknownTable(s.to_string()))
    }
}

/// Quote an SQL identifier
pub(crate) fn quote(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Joined single-customer query: result columns are the key followed by
/// `<table>_<column>` for every other column of every table.
pub(crate) fn lookup_sql() -> (String, Vec<String>) {
    let base = CustomerTable::Customer;
    let joined = [
        CustomerTable::Charges,
        CustomerTable::Churn,
        CustomerTable::Location,
        CustomerTable::Referrals,
        CustomerTable::Services,
    ];

    let mut names = vec![CUSTOMER_ID.to_string()];
    let mut select = vec![format!(
        "{}.{} AS {}",
        quote(base.name()),
        quote(CUSTOMER_ID),
        quote(CUSTOMER_ID)
    )];

    for table in std::iter::once(base).chain(joined) {
        for column in table.columns().iter().filter(|c| c.name != CUSTOMER_ID) {
            let alias = format!("{}_{}", table.name(), column.name);
            select.push(format!(
                "{}.{} AS {}",
                quote(table.name()),
                quote(column.name),
                quote(&alias)
            ));
            names.push(alias);
        }
    }

    let joins: Vec<String> = joined
        .iter()
        .map(|t| {
            format!(
                "LEFT JOIN {t} ON {base}.{id} = {t}.{id}",
                t = quote(t.name()),
                base = quote(base.name()),
                id = quote(CUSTOMER_ID)
            )
        })
        .collect();

    let sql = format!(
        "SELECT {} FROM {} {} WHERE {}.{} = ?",
        select.join(", "),
        quote(base.name()),
        joins.join(" "),
        quote(base.name()),
        quote(CUSTOMER_ID)
    );

    (sql, names)
}
