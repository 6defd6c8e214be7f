//! Insert / update / skip decision for one decoded record.
//!
//! Every entity goes through the same routine: look the key up, compare the
//! stored data columns against the decoded ones with `SqlValue::matches`,
//! then issue at most one statement.

use chrono::NaiveDateTime;
use log::debug;
use rusqlite::{Connection, Row};

use super::schema_gen::{generate_insert, generate_lookup, generate_update};
use crate::audit::AuditLog;
use crate::error::RecordError;
use crate::parser::{
    Building, CsvRow, Entity, Farmer, FarmerNeighbor, Irrigation, Plantation, SqlValue, Tractor,
};
use crate::schema::{ColumnType, EntityKind, TableSchema};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Inserted,
    Updated,
    Duplicate,
}

/// Reconcile one record against its table
pub fn reconcile<E: Entity>(conn: &Connection, record: &E) -> rusqlite::Result<Decision> {
    let schema = E::schema();
    let values = record.values();
    let (key, data) = split_key(schema, &values);

    let Some(stored) = lookup(conn, schema, &key)? else {
        execute(conn, &generate_insert(schema), values.iter())?;
        return Ok(Decision::Inserted);
    };

    let changed = changed_columns(schema, &stored, &data);
    if changed.is_empty() {
        return Ok(Decision::Duplicate);
    }

    debug!(
        "Updating {} {:?}: {} changed",
        schema.name,
        key,
        changed.join(", ")
    );
    execute(
        conn,
        &generate_update(schema),
        data.iter().copied().chain(key.iter().copied()),
    )?;
    Ok(Decision::Updated)
}

/// Names of the data columns whose stored value differs from the decoded one
pub fn changed_columns(
    schema: &'static TableSchema,
    stored: &[SqlValue],
    decoded: &[&SqlValue],
) -> Vec<&'static str> {
    schema
        .data_columns()
        .zip(stored.iter().zip(decoded))
        .filter(|(_, (stored, decoded))| !stored.matches(decoded))
        .map(|(col, _)| col.name)
        .collect()
}

fn split_key<'v>(
    schema: &TableSchema,
    values: &'v [SqlValue],
) -> (Vec<&'v SqlValue>, Vec<&'v SqlValue>) {
    let mut key = Vec::new();
    let mut data = Vec::new();
    for (col, value) in schema.columns.iter().zip(values) {
        if col.key {
            key.push(value);
        } else {
            data.push(value);
        }
    }
    (key, data)
}

/// Stored data columns for a key, first matching row only
fn lookup(
    conn: &Connection,
    schema: &TableSchema,
    key: &[&SqlValue],
) -> rusqlite::Result<Option<Vec<SqlValue>>> {
    let mut stmt = conn.prepare_cached(&generate_lookup(schema))?;
    for (idx, value) in key.iter().enumerate() {
        value.bind_to(idx + 1, &mut stmt)?;
    }

    let mut rows = stmt.raw_query();
    let Some(row) = rows.next()? else {
        return Ok(None);
    };

    let mut stored = Vec::new();
    for (idx, col) in schema.data_columns().enumerate() {
        stored.push(read_value(row, idx, col.col_type)?);
    }
    Ok(Some(stored))
}

fn read_value(row: &Row, idx: usize, col_type: ColumnType) -> rusqlite::Result<SqlValue> {
    let value = match col_type {
        ColumnType::Integer => row.get::<_, Option<i64>>(idx)?.map(SqlValue::Integer),
        ColumnType::Real => row.get::<_, Option<f64>>(idx)?.map(SqlValue::Real),
        ColumnType::Text => row.get::<_, Option<String>>(idx)?.map(SqlValue::Text),
        ColumnType::Timestamp => row
            .get::<_, Option<NaiveDateTime>>(idx)?
            .map(SqlValue::Timestamp),
    };
    Ok(value.unwrap_or(SqlValue::Null))
}

fn execute<'v>(
    conn: &Connection,
    sql: &str,
    params: impl Iterator<Item = &'v SqlValue>,
) -> rusqlite::Result<usize> {
    let mut stmt = conn.prepare_cached(sql)?;
    for (idx, value) in params.enumerate() {
        value.bind_to(idx + 1, &mut stmt)?;
    }
    stmt.raw_execute()
}

/// Decode + reconcile for one CSV row of a given entity kind
pub type RowHandler = fn(&Connection, &CsvRow<'_>, &AuditLog) -> Result<Decision, RecordError>;

/// Handler for a kind, picked once per file
pub fn row_handler(kind: EntityKind) -> RowHandler {
    match kind {
        EntityKind::Farmer => handle_row::<Farmer>,
        EntityKind::Plantation => handle_row::<Plantation>,
        EntityKind::Irrigation => handle_row::<Irrigation>,
        EntityKind::Building => handle_row::<Building>,
        EntityKind::Tractor => handle_row::<Tractor>,
        EntityKind::FarmerNeighbor => handle_row::<FarmerNeighbor>,
    }
}

fn handle_row<E: Entity>(
    conn: &Connection,
    row: &CsvRow<'_>,
    audit: &AuditLog,
) -> Result<Decision, RecordError> {
    let record = E::decode(row)?;
    let decision = reconcile(conn, &record)?;
    if decision == Decision::Duplicate {
        let description = record.describe();
        debug!("{}", description);
        audit.duplicate(&description);
    }
    Ok(decision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ALL_TABLES;
    use crate::writer::schema_gen::generate_create_table;
    use chrono::NaiveDate;

    fn test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        for schema in ALL_TABLES {
            conn.execute(&generate_create_table(schema), []).unwrap();
        }
        conn
    }

    fn juan(money: f64) -> Farmer {
        Farmer {
            id: 1,
            name: "Juan".to_string(),
            description: "x".to_string(),
            money,
            points: 5,
            level: 1,
        }
    }

    fn stored_farmer(conn: &Connection, id: i32) -> (String, String, f64, i32, i32) {
        conn.query_row(
            "SELECT nombre, descripcion, dinero, puntos, nivel FROM granjeros WHERE id = ?1",
            [id],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?)),
        )
        .unwrap()
    }

    fn count(conn: &Connection, table: &str) -> i64 {
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| {
            r.get(0)
        })
        .unwrap()
    }

    #[test]
    fn test_insert_then_duplicate_then_update() {
        let conn = test_db();

        assert_eq!(reconcile(&conn, &juan(100.0)).unwrap(), Decision::Inserted);
        assert_eq!(
            stored_farmer(&conn, 1),
            ("Juan".to_string(), "x".to_string(), 100.0, 5, 1)
        );

        assert_eq!(reconcile(&conn, &juan(100.0)).unwrap(), Decision::Duplicate);
        assert_eq!(count(&conn, "granjeros"), 1);

        assert_eq!(reconcile(&conn, &juan(150.0)).unwrap(), Decision::Updated);
        assert_eq!(stored_farmer(&conn, 1).2, 150.0);
        assert_eq!(count(&conn, "granjeros"), 1);
    }

    #[test]
    fn test_nullable_fk_null_matches_absent() {
        let conn = test_db();
        conn.execute(
            "INSERT INTO construcciones VALUES (4, 'Granero', 250.5, NULL)",
            [],
        )
        .unwrap();

        let building = Building {
            id: 4,
            name: "Granero".to_string(),
            price: 250.5,
            farmer_id: None,
        };
        assert_eq!(reconcile(&conn, &building).unwrap(), Decision::Duplicate);
    }

    #[test]
    fn test_nullable_fk_null_differs_from_value_both_ways() {
        let conn = test_db();
        conn.execute("INSERT INTO granjeros VALUES (1, 'Juan', 'x', 1.0, 1, 1)", [])
            .unwrap();
        conn.execute(
            "INSERT INTO construcciones VALUES (4, 'Granero', 250.5, NULL)",
            [],
        )
        .unwrap();

        let mut building = Building {
            id: 4,
            name: "Granero".to_string(),
            price: 250.5,
            farmer_id: Some(1),
        };
        assert_eq!(reconcile(&conn, &building).unwrap(), Decision::Updated);
        let owner: Option<i32> = conn
            .query_row("SELECT id_granjero FROM construcciones WHERE id = 4", [], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(owner, Some(1));

        building.farmer_id = None;
        assert_eq!(reconcile(&conn, &building).unwrap(), Decision::Updated);
        let owner: Option<i32> = conn
            .query_row("SELECT id_granjero FROM construcciones WHERE id = 4", [], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(owner, None);
    }

    #[test]
    fn test_composite_key() {
        let conn = test_db();
        conn.execute_batch(
            "INSERT INTO granjeros VALUES (1, 'A', 'a', 0.0, 0, 1);
             INSERT INTO granjeros VALUES (2, 'B', 'b', 0.0, 0, 1);",
        )
        .unwrap();

        let link = FarmerNeighbor {
            farmer_id: 1,
            neighbor_id: 2,
            shared_points: 10,
        };
        let reverse = FarmerNeighbor {
            farmer_id: 2,
            neighbor_id: 1,
            shared_points: 10,
        };
        assert_eq!(reconcile(&conn, &link).unwrap(), Decision::Inserted);
        assert_eq!(reconcile(&conn, &reverse).unwrap(), Decision::Inserted);
        assert_eq!(reconcile(&conn, &link).unwrap(), Decision::Duplicate);

        let changed = FarmerNeighbor {
            shared_points: 12,
            ..link
        };
        assert_eq!(reconcile(&conn, &changed).unwrap(), Decision::Updated);
        assert_eq!(count(&conn, "granjero_granjero"), 2);
    }

    #[test]
    fn test_timestamp_round_trips_as_duplicate() {
        let conn = test_db();
        conn.execute("INSERT INTO granjeros VALUES (1, 'Juan', 'x', 1.0, 1, 1)", [])
            .unwrap();

        let plantation = Plantation {
            id: 10,
            name: "Trigo".to_string(),
            purchase_price: 12.5,
            sale_price: 20.0,
            next_harvest: NaiveDate::from_ymd_opt(2024, 6, 1)
                .unwrap()
                .and_hms_milli_opt(8, 0, 0, 500)
                .unwrap(),
            farmer_id: 1,
        };
        assert_eq!(reconcile(&conn, &plantation).unwrap(), Decision::Inserted);
        assert_eq!(reconcile(&conn, &plantation).unwrap(), Decision::Duplicate);
    }

    #[test]
    fn test_changed_columns() {
        let farmer = juan(100.0);
        let values = farmer.values();
        let data: Vec<&SqlValue> = values[1..].iter().collect();
        let stored = vec![
            SqlValue::Text("Juan".to_string()),
            SqlValue::Text("y".to_string()),
            SqlValue::Real(100.0),
            SqlValue::Integer(5),
            SqlValue::Integer(2),
        ];
        assert_eq!(
            changed_columns(Farmer::schema(), &stored, &data),
            vec!["descripcion", "nivel"]
        );
    }

    #[test]
    fn test_database_error_propagates() {
        let conn = test_db();
        // id_granjero 99 does not exist
        let plantation = Plantation {
            id: 1,
            name: "Maiz".to_string(),
            purchase_price: 1.0,
            sale_price: 2.0,
            next_harvest: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            farmer_id: 99,
        };
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        assert!(reconcile(&conn, &plantation).is_err());
    }
}
