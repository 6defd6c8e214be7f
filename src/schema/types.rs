use std::fmt;
use std::path::{Path, PathBuf};

use super::tables::{
    CONSTRUCCIONES, GRANJEROS, GRANJERO_GRANJERO, PLANTACIONES, RIEGOS, TRACTORES,
};

/// Column data type
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
    /// Naive date-time, stored as TEXT
    Timestamp,
}

/// Column definition
#[derive(Debug, Clone)]
pub struct Column {
    /// Column name, also the (case-insensitive) CSV header
    pub name: &'static str,
    pub col_type: ColumnType,
    pub nullable: bool,
    /// Part of the primary (or composite) key
    pub key: bool,
}

impl Column {
    /// Create a required (non-nullable) column
    pub const fn required(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            name,
            col_type,
            nullable: false,
            key: false,
        }
    }

    /// Create an optional (nullable) column
    pub const fn nullable(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            name,
            col_type,
            nullable: true,
            key: false,
        }
    }

    /// Create a key column (always required)
    pub const fn key(name: &'static str) -> Self {
        Self {
            name,
            col_type: ColumnType::Integer,
            nullable: false,
            key: true,
        }
    }
}

/// Foreign key reference
#[derive(Debug, Clone)]
pub struct ForeignKey {
    pub column: &'static str,
    pub references_table: &'static str,
    pub references_column: &'static str,
}

impl ForeignKey {
    pub const fn new(column: &'static str, references_table: &'static str) -> Self {
        Self {
            column,
            references_table,
            references_column: "id",
        }
    }
}

/// Table schema definition
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub name: &'static str,
    /// Base name of the CSV file and of the directory that holds it
    pub source_file: &'static str,
    /// Key columns first, then the data columns in CSV order
    pub columns: &'static [Column],
    pub foreign_keys: &'static [ForeignKey],
}

impl TableSchema {
    pub fn key_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.key)
    }

    pub fn data_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| !c.key)
    }

    /// File name of the CSV source, e.g. `granjeros.csv`
    pub fn file_name(&self) -> String {
        format!("{}.csv", self.source_file)
    }

    /// `<root>/<basename>/<basename>.csv`
    pub fn csv_path(&self, root: &Path) -> PathBuf {
        root.join(self.source_file).join(self.file_name())
    }
}

/// The six entity kinds, one per table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Farmer,
    Plantation,
    Irrigation,
    Building,
    Tractor,
    FarmerNeighbor,
}

impl EntityKind {
    /// Processing order. Parents come before the tables that reference them.
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Farmer,
        EntityKind::Plantation,
        EntityKind::Irrigation,
        EntityKind::Building,
        EntityKind::Tractor,
        EntityKind::FarmerNeighbor,
    ];

    pub fn schema(self) -> &'static TableSchema {
        match self {
            EntityKind::Farmer => &GRANJEROS,
            EntityKind::Plantation => &PLANTACIONES,
            EntityKind::Irrigation => &RIEGOS,
            EntityKind::Building => &CONSTRUCCIONES,
            EntityKind::Tractor => &TRACTORES,
            EntityKind::FarmerNeighbor => &GRANJERO_GRANJERO,
        }
    }

    pub fn file_name(self) -> String {
        self.schema().file_name()
    }

    pub fn csv_path(self, root: &Path) -> PathBuf {
        self.schema().csv_path(root)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityKind::Farmer => "farmer",
            EntityKind::Plantation => "plantation",
            EntityKind::Irrigation => "irrigation",
            EntityKind::Building => "building",
            EntityKind::Tractor => "tractor",
            EntityKind::FarmerNeighbor => "farmer neighbor",
        };
        write!(f, "{}", label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_path_nests_basename_directory() {
        let path = EntityKind::Tractor.csv_path(Path::new("/data"));
        assert_eq!(path, PathBuf::from("/data/tractores/tractores.csv"));
    }

    #[test]
    fn test_key_and_data_columns_split() {
        let schema = EntityKind::FarmerNeighbor.schema();
        let keys: Vec<_> = schema.key_columns().map(|c| c.name).collect();
        let data: Vec<_> = schema.data_columns().map(|c| c.name).collect();
        assert_eq!(keys, vec!["id_granjero", "id_vecino"]);
        assert_eq!(data, vec!["puntos_compartidos"]);
    }
}
