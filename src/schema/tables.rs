//! Table schema definitions for the six farm tables

use super::types::*;

// =============================================================================
// Independent Tables (no FK dependencies)
// =============================================================================

pub static GRANJEROS: TableSchema = TableSchema {
    name: "granjeros",
    source_file: "granjeros",
    columns: &[
        Column::key("id"),
        Column::required("nombre", ColumnType::Text),
        Column::required("descripcion", ColumnType::Text),
        Column::required("dinero", ColumnType::Real),
        Column::required("puntos", ColumnType::Integer),
        Column::required("nivel", ColumnType::Integer),
    ],
    foreign_keys: &[],
};

// =============================================================================
// Tables with FK dependencies
// =============================================================================

pub static PLANTACIONES: TableSchema = TableSchema {
    name: "plantaciones",
    source_file: "plantaciones",
    columns: &[
        Column::key("id"),
        Column::required("nombre", ColumnType::Text),
        Column::required("precio_compra", ColumnType::Real),
        Column::required("precio_venta", ColumnType::Real),
        Column::required("proxima_cosecha", ColumnType::Timestamp),
        Column::required("id_granjero", ColumnType::Integer),
    ],
    foreign_keys: &[ForeignKey::new("id_granjero", "granjeros")],
};

pub static RIEGOS: TableSchema = TableSchema {
    name: "riegos",
    source_file: "riegos",
    columns: &[
        Column::key("id"),
        Column::required("tipo", ColumnType::Text),
        Column::required("velocidad", ColumnType::Real),
        Column::required("id_plantacion", ColumnType::Integer),
    ],
    foreign_keys: &[ForeignKey::new("id_plantacion", "plantaciones")],
};

pub static CONSTRUCCIONES: TableSchema = TableSchema {
    name: "construcciones",
    source_file: "construcciones",
    columns: &[
        Column::key("id"),
        Column::required("nombre", ColumnType::Text),
        Column::required("precio", ColumnType::Real),
        // Buildings may not have an owner yet
        Column::nullable("id_granjero", ColumnType::Integer),
    ],
    foreign_keys: &[ForeignKey::new("id_granjero", "granjeros")],
};

pub static TRACTORES: TableSchema = TableSchema {
    name: "tractores",
    source_file: "tractores",
    columns: &[
        Column::key("id"),
        Column::required("modelo", ColumnType::Text),
        Column::required("velocidad", ColumnType::Integer),
        Column::required("precio_venta", ColumnType::Real),
        Column::nullable("id_construccion", ColumnType::Integer),
    ],
    foreign_keys: &[ForeignKey::new("id_construccion", "construcciones")],
};

// =============================================================================
// Junction Tables
// =============================================================================

pub static GRANJERO_GRANJERO: TableSchema = TableSchema {
    name: "granjero_granjero",
    source_file: "granjero_granjero",
    columns: &[
        Column::key("id_granjero"),
        Column::key("id_vecino"),
        Column::required("puntos_compartidos", ColumnType::Integer),
    ],
    foreign_keys: &[
        ForeignKey::new("id_granjero", "granjeros"),
        ForeignKey::new("id_vecino", "granjeros"),
    ],
};

/// All tables in processing order
pub static ALL_TABLES: &[&TableSchema] = &[
    &GRANJEROS,
    &PLANTACIONES,
    &RIEGOS,
    &CONSTRUCCIONES,
    &TRACTORES,
    &GRANJERO_GRANJERO,
];
