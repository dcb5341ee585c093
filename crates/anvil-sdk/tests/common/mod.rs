//! Shared fixtures: a small bank-transaction dataset and its feature family
#![allow(dead_code)]

use anvil_sdk::{
    BoxError, CoreError, Dataset, EntityType, EntityView, Feature, Row, Table, Value,
};
use std::sync::Arc;

pub fn transaction() -> EntityType {
    EntityType::new("transaction")
}

pub fn account() -> EntityType {
    EntityType::new("account")
}

/// Bank statement dataset: row granularity is one transaction, the account
/// granularity groups transactions by account number
pub struct BankDataset {
    data: Table,
}

impl BankDataset {
    pub fn new(data: Table) -> Self {
        Self { data }
    }
}

impl Dataset for BankDataset {
    fn table(&self) -> &Table {
        &self.data
    }

    fn supported_entity_types(&self) -> Vec<EntityType> {
        vec![transaction(), account()]
    }

    fn map_to_view(
        &self,
        entity: &EntityType,
        table: &Table,
    ) -> std::result::Result<EntityView, CoreError> {
        if *entity == account() {
            EntityView::group_first_by(table, "account_no")
        } else {
            Ok(EntityView::rows(table.clone()))
        }
    }
}

pub fn bank_table() -> Table {
    Table::from_columns(vec![
        (
            "account_no",
            vec![
                Value::from("ACC-1"),
                Value::from("ACC-1"),
                Value::from("ACC-2"),
                Value::from("ACC-2"),
                Value::from("ACC-3"),
                Value::from("ACC-1"),
            ],
        ),
        (
            "date",
            vec![
                Value::from("2025-01-15"),
                Value::from("2025-01-31"),
                Value::from("2025-02-10"),
                Value::from("2025-03-05"),
                Value::from("2025-03-14"),
                Value::from("2025-04-02"),
            ],
        ),
        (
            "withdrawal_amt",
            vec![
                Value::from(120.5),
                Value::from(0.0),
                Value::from(1000.0),
                Value::from(50.25),
                Value::from(0.0),
                Value::from(75.75),
            ],
        ),
        (
            "deposit_amt",
            vec![
                Value::from(0.0),
                Value::from(250.0),
                Value::from(0.0),
                Value::from(0.0),
                Value::from(990.1),
                Value::from(0.3),
            ],
        ),
        (
            "balance_amt",
            vec![
                Value::from(879.5),
                Value::from(1129.5),
                Value::from(4000.0),
                Value::from(3949.75),
                Value::from(990.1),
                Value::from(1053.45),
            ],
        ),
    ])
    .unwrap()
}

pub fn num(row: &Row, column: &str) -> std::result::Result<f64, BoxError> {
    row.get(column)
        .and_then(Value::as_number)
        .ok_or_else(|| BoxError::from(format!("missing numeric column '{column}'")))
}

fn month_of(value: &Value) -> std::result::Result<f64, BoxError> {
    value
        .as_str()
        .and_then(|s| s.get(5..7))
        .and_then(|m| m.parse::<f64>().ok())
        .ok_or_else(|| BoxError::from("date column must be formatted YYYY-MM-DD"))
}

/// Clone `table` with one extra column derived value-by-value from `source`
fn map_column(
    table: &Table,
    source: &str,
    name: &str,
    f: impl Fn(&Value) -> std::result::Result<Value, BoxError>,
) -> std::result::Result<Table, BoxError> {
    let column = table
        .column(source)
        .ok_or_else(|| BoxError::from(format!("missing column '{source}'")))?;
    let values = column.iter().map(f).collect::<std::result::Result<Vec<_>, _>>()?;
    let mut out = table.clone();
    out.push_column(name, values)?;
    Ok(out)
}

/// The transaction feature family used across the integration tests.
///
/// Built as one set so that shared ancestors are shared nodes.
pub struct FeatureSet {
    pub month: Arc<Feature>,
    pub amount_change: Arc<Feature>,
    pub rounded: Arc<Feature>,
    pub diff: Arc<Feature>,
    pub diff_doubled: Arc<Feature>,
    pub diff_squared: Arc<Feature>,
    pub half_rounded: Arc<Feature>,
    pub rounded_doubled: Arc<Feature>,
    pub account_open_balance: Arc<Feature>,
}

pub fn features() -> FeatureSet {
    let month = Feature::builder("transaction_month", transaction())
        .description("calendar month of the transaction date")
        .row_fn(|row| {
            let date = row
                .get("date")
                .cloned()
                .ok_or_else(|| BoxError::from("missing date column"))?;
            row.insert("transaction_month".to_string(), Value::from(month_of(&date)?));
            Ok(())
        })
        .table_fn(|table| {
            map_column(table, "date", "transaction_month", |v| {
                Ok(Value::from(month_of(v)?))
            })
        })
        .build()
        .unwrap();

    let amount_change = Feature::builder("transaction_amount_change", transaction())
        .description("difference between the withdrawal amount and the deposit amount")
        .row_fn(|row| {
            let value = num(row, "withdrawal_amt")? - num(row, "deposit_amt")?;
            row.insert("transaction_amount_change".to_string(), Value::from(value));
            Ok(())
        })
        .table_fn(|table| {
            let withdrawals = table
                .column("withdrawal_amt")
                .ok_or_else(|| BoxError::from("missing column 'withdrawal_amt'"))?;
            let deposits = table
                .column("deposit_amt")
                .ok_or_else(|| BoxError::from("missing column 'deposit_amt'"))?;
            let values = withdrawals
                .iter()
                .zip(deposits)
                .map(|(w, d)| {
                    match (w.as_number(), d.as_number()) {
                        (Some(w), Some(d)) => Ok(Value::from(w - d)),
                        _ => Err(BoxError::from("amounts must be numeric")),
                    }
                })
                .collect::<std::result::Result<Vec<_>, _>>()?;
            let mut out = table.clone();
            out.push_column("transaction_amount_change", values)?;
            Ok(out)
        })
        .build()
        .unwrap();

    let rounded = Feature::builder("transaction_rounded_amount_change", transaction())
        .description("amount change rounded to the nearest whole unit")
        .depends_on(&amount_change)
        .row_fn(|row| {
            let value = num(row, "transaction_amount_change")?.round();
            row.insert(
                "transaction_rounded_amount_change".to_string(),
                Value::from(value),
            );
            Ok(())
        })
        .build()
        .unwrap();

    let diff = Feature::builder("transaction_rounded_amount_change_diff", transaction())
        .description("difference between the rounded amount change and the raw amount change")
        .depends_on(&amount_change)
        .depends_on(&rounded)
        .row_fn(|row| {
            let value =
                num(row, "transaction_rounded_amount_change")? - num(row, "transaction_amount_change")?;
            row.insert(
                "transaction_rounded_amount_change_diff".to_string(),
                Value::from(value),
            );
            Ok(())
        })
        .table_fn(|table| {
            let rounded = table
                .column("transaction_rounded_amount_change")
                .ok_or_else(|| BoxError::from("missing rounded amount change"))?;
            let raw = table
                .column("transaction_amount_change")
                .ok_or_else(|| BoxError::from("missing amount change"))?;
            let values = rounded
                .iter()
                .zip(raw)
                .map(|(r, a)| match (r.as_number(), a.as_number()) {
                    (Some(r), Some(a)) => Ok(Value::from(r - a)),
                    _ => Err(BoxError::from("amount changes must be numeric")),
                })
                .collect::<std::result::Result<Vec<_>, _>>()?;
            let mut out = table.clone();
            out.push_column("transaction_rounded_amount_change_diff", values)?;
            Ok(out)
        })
        .build()
        .unwrap();

    let diff_doubled = Feature::builder(
        "transaction_rounded_amount_change_diff_doubled",
        transaction(),
    )
    .description("rounding difference doubled")
    .depends_on(&diff)
    .row_fn(|row| {
        let value = num(row, "transaction_rounded_amount_change_diff")? * 2.0;
        row.insert(
            "transaction_rounded_amount_change_diff_doubled".to_string(),
            Value::from(value),
        );
        Ok(())
    })
    .build()
    .unwrap();

    let diff_squared = Feature::builder(
        "transaction_rounded_amount_change_diff_squared",
        transaction(),
    )
    .description("rounding difference squared")
    .depends_on(&diff)
    .row_fn(|row| {
        let diff = num(row, "transaction_rounded_amount_change_diff")?;
        row.insert(
            "transaction_rounded_amount_change_diff_squared".to_string(),
            Value::from(diff * diff),
        );
        Ok(())
    })
    .build()
    .unwrap();

    let half_rounded = Feature::builder("transaction_half_rounded_amount_change", transaction())
        .description("half of the rounded amount change")
        .depends_on(&rounded)
        .row_fn(|row| {
            let value = num(row, "transaction_rounded_amount_change")? / 2.0;
            row.insert(
                "transaction_half_rounded_amount_change".to_string(),
                Value::from(value),
            );
            Ok(())
        })
        .table_fn(|table| {
            map_column(
                table,
                "transaction_rounded_amount_change",
                "transaction_half_rounded_amount_change",
                |v| {
                    v.as_number()
                        .map(|n| Value::from(n / 2.0))
                        .ok_or_else(|| BoxError::from("rounded amount change must be numeric"))
                },
            )
        })
        .build()
        .unwrap();

    let rounded_doubled = Feature::builder("transaction_rounded_amount_change_doubled", transaction())
        .description("half of the rounded amount change, doubled back")
        .depends_on(&half_rounded)
        .row_fn(|row| {
            let value = num(row, "transaction_half_rounded_amount_change")? * 2.0;
            row.insert(
                "transaction_rounded_amount_change_doubled".to_string(),
                Value::from(value),
            );
            Ok(())
        })
        .table_fn(|table| {
            map_column(
                table,
                "transaction_half_rounded_amount_change",
                "transaction_rounded_amount_change_doubled",
                |v| {
                    v.as_number()
                        .map(|n| Value::from(n * 2.0))
                        .ok_or_else(|| BoxError::from("half rounded amount change must be numeric"))
                },
            )
        })
        .build()
        .unwrap();

    let account_open_balance = Feature::builder("account_open_balance", account())
        .description("balance on the account's first recorded transaction")
        .row_fn(|row| {
            let value = num(row, "balance_amt")?;
            row.insert("account_open_balance".to_string(), Value::from(value));
            Ok(())
        })
        .build()
        .unwrap();

    FeatureSet {
        month,
        amount_change,
        rounded,
        diff,
        diff_doubled,
        diff_squared,
        half_rounded,
        rounded_doubled,
        account_open_balance,
    }
}
