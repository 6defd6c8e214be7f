use crate::schema::{ColumnType, TableSchema};

/// Generate CREATE TABLE SQL for a table schema
pub fn generate_create_table(schema: &TableSchema) -> String {
    let mut sql = format!("CREATE TABLE IF NOT EXISTS {} (\n", schema.name);
    let mut columns = Vec::new();
    let keys: Vec<&str> = schema.key_columns().map(|c| c.name).collect();
    let single_key = keys.len() == 1;

    for col in schema.columns {
        let sql_type = match col.col_type {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
            ColumnType::Timestamp => "TEXT",
        };

        let null_constraint = if !col.nullable { " NOT NULL" } else { "" };
        let pk = if col.key && single_key { " PRIMARY KEY" } else { "" };

        columns.push(format!(
            "    {} {}{}{}",
            col.name, sql_type, pk, null_constraint
        ));
    }

    // Composite keys become a table constraint
    if keys.len() > 1 {
        columns.push(format!("    PRIMARY KEY ({})", keys.join(", ")));
    }

    // Add foreign key constraints
    for fk in schema.foreign_keys {
        columns.push(format!(
            "    FOREIGN KEY ({}) REFERENCES {}({})",
            fk.column, fk.references_table, fk.references_column
        ));
    }

    sql.push_str(&columns.join(",\n"));
    sql.push_str("\n)");

    sql
}

/// Generate CREATE INDEX statements for foreign key columns
pub fn generate_indexes(schema: &TableSchema) -> Vec<String> {
    schema
        .foreign_keys
        .iter()
        .map(|fk| {
            format!(
                "CREATE INDEX IF NOT EXISTS idx_{}_{} ON {}({})",
                schema.name, fk.column, schema.name, fk.column
            )
        })
        .collect()
}

fn key_predicate(schema: &TableSchema, first_param: usize) -> String {
    schema
        .key_columns()
        .enumerate()
        .map(|(i, col)| format!("{} = ?{}", col.name, first_param + i))
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// SELECT of the data columns, bound by the key columns
pub fn generate_lookup(schema: &TableSchema) -> String {
    let data: Vec<&str> = schema.data_columns().map(|c| c.name).collect();
    format!(
        "SELECT {} FROM {} WHERE {}",
        data.join(", "),
        schema.name,
        key_predicate(schema, 1)
    )
}

/// INSERT of every column in schema order
pub fn generate_insert(schema: &TableSchema) -> String {
    let columns: Vec<&str> = schema.columns.iter().map(|c| c.name).collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        schema.name,
        columns.join(", "),
        placeholders.join(", ")
    )
}

/// UPDATE of every data column; data values bind first, then the key
pub fn generate_update(schema: &TableSchema) -> String {
    let assignments: Vec<String> = schema
        .data_columns()
        .enumerate()
        .map(|(i, col)| format!("{} = ?{}", col.name, i + 1))
        .collect();
    format!(
        "UPDATE {} SET {} WHERE {}",
        schema.name,
        assignments.join(", "),
        key_predicate(schema, assignments.len() + 1)
    )
}
