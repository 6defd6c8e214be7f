use chrono::NaiveDateTime;

use super::row::CsvRow;
use crate::error::DecodeError;
use crate::schema::{
    TableSchema, CONSTRUCCIONES, GRANJEROS, GRANJERO_GRANJERO, PLANTACIONES, RIEGOS, TRACTORES,
};

/// A column value, either decoded from CSV or read back from the database
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Timestamp(NaiveDateTime),
}

impl SqlValue {
    pub fn bind_to(&self, idx: usize, stmt: &mut rusqlite::Statement) -> rusqlite::Result<()> {
        match self {
            SqlValue::Null => stmt.raw_bind_parameter(idx, rusqlite::types::Null)?,
            SqlValue::Integer(i) => stmt.raw_bind_parameter(idx, i)?,
            SqlValue::Real(f) => stmt.raw_bind_parameter(idx, f)?,
            SqlValue::Text(s) => stmt.raw_bind_parameter(idx, s.as_str())?,
            SqlValue::Timestamp(t) => stmt.raw_bind_parameter(idx, t)?,
        }
        Ok(())
    }

    /// Field equality used to tell duplicates from updates.
    ///
    /// Floats compare with native `==`, so NaN never matches. NULL matches
    /// only NULL, which is how an absent nullable FK meets a stored NULL.
    pub fn matches(&self, other: &SqlValue) -> bool {
        match (self, other) {
            (SqlValue::Null, SqlValue::Null) => true,
            (SqlValue::Integer(a), SqlValue::Integer(b)) => a == b,
            (SqlValue::Real(a), SqlValue::Real(b)) => a == b,
            (SqlValue::Text(a), SqlValue::Text(b)) => a == b,
            (SqlValue::Timestamp(a), SqlValue::Timestamp(b)) => a == b,
            _ => false,
        }
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Integer(v.into())
    }
}

impl From<Option<i32>> for SqlValue {
    fn from(v: Option<i32>) -> Self {
        v.map(SqlValue::from).unwrap_or(SqlValue::Null)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Real(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<NaiveDateTime> for SqlValue {
    fn from(v: NaiveDateTime) -> Self {
        SqlValue::Timestamp(v)
    }
}

/// A typed record backed by one table
pub trait Entity: Sized {
    fn schema() -> &'static TableSchema;

    fn decode(row: &CsvRow<'_>) -> Result<Self, DecodeError>;

    /// Values in the order of `schema().columns`
    fn values(&self) -> Vec<SqlValue>;

    /// Text written to the duplicate log
    fn describe(&self) -> String;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Farmer {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub money: f64,
    pub points: i32,
    pub level: i32,
}

impl Entity for Farmer {
    fn schema() -> &'static TableSchema {
        &GRANJEROS
    }

    fn decode(row: &CsvRow<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            id: row.int("id")?,
            name: row.text("nombre")?,
            description: row.text("descripcion")?,
            money: row.real("dinero")?,
            points: row.int("puntos")?,
            level: row.int("nivel")?,
        })
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.id.into(),
            self.name.as_str().into(),
            self.description.as_str().into(),
            self.money.into(),
            self.points.into(),
            self.level.into(),
        ]
    }

    fn describe(&self) -> String {
        format!("Granjero ID {} ({}) ya existe y es idéntico.", self.id, self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Plantation {
    pub id: i32,
    pub name: String,
    pub purchase_price: f64,
    pub sale_price: f64,
    pub next_harvest: NaiveDateTime,
    pub farmer_id: i32,
}

impl Entity for Plantation {
    fn schema() -> &'static TableSchema {
        &PLANTACIONES
    }

    fn decode(row: &CsvRow<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            id: row.int("id")?,
            name: row.text("nombre")?,
            purchase_price: row.real("precio_compra")?,
            sale_price: row.real("precio_venta")?,
            next_harvest: row.timestamp("proxima_cosecha")?,
            farmer_id: row.int("id_granjero")?,
        })
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.id.into(),
            self.name.as_str().into(),
            self.purchase_price.into(),
            self.sale_price.into(),
            self.next_harvest.into(),
            self.farmer_id.into(),
        ]
    }

    fn describe(&self) -> String {
        format!("Plantación ID {} ({}) ya existe y es idéntica.", self.id, self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Irrigation {
    pub id: i32,
    pub kind: String,
    pub speed: f64,
    pub plantation_id: i32,
}

impl Entity for Irrigation {
    fn schema() -> &'static TableSchema {
        &RIEGOS
    }

    fn decode(row: &CsvRow<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            id: row.int("id")?,
            kind: row.text("tipo")?,
            speed: row.real("velocidad")?,
            plantation_id: row.int("id_plantacion")?,
        })
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.id.into(),
            self.kind.as_str().into(),
            self.speed.into(),
            self.plantation_id.into(),
        ]
    }

    fn describe(&self) -> String {
        format!("Riego ID {} ({}) ya existe y es idéntico.", self.id, self.kind)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Building {
    pub id: i32,
    pub name: String,
    pub price: f64,
    pub farmer_id: Option<i32>,
}

impl Entity for Building {
    fn schema() -> &'static TableSchema {
        &CONSTRUCCIONES
    }

    fn decode(row: &CsvRow<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            id: row.int("id")?,
            name: row.text("nombre")?,
            price: row.real("precio")?,
            farmer_id: row.nullable_int("id_granjero")?,
        })
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.id.into(),
            self.name.as_str().into(),
            self.price.into(),
            self.farmer_id.into(),
        ]
    }

    fn describe(&self) -> String {
        format!("Construcción ID {} ({}) ya existe y es idéntica.", self.id, self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tractor {
    pub id: i32,
    pub model: String,
    pub speed: i32,
    pub sale_price: f64,
    pub building_id: Option<i32>,
}

impl Entity for Tractor {
    fn schema() -> &'static TableSchema {
        &TRACTORES
    }

    fn decode(row: &CsvRow<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            id: row.int("id")?,
            model: row.text("modelo")?,
            speed: row.int("velocidad")?,
            sale_price: row.real("precio_venta")?,
            building_id: row.nullable_int("id_construccion")?,
        })
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.id.into(),
            self.model.as_str().into(),
            self.speed.into(),
            self.sale_price.into(),
            self.building_id.into(),
        ]
    }

    fn describe(&self) -> String {
        format!("Tractor ID {} ({}) ya existe y es idéntico.", self.id, self.model)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FarmerNeighbor {
    pub farmer_id: i32,
    pub neighbor_id: i32,
    pub shared_points: i32,
}

impl Entity for FarmerNeighbor {
    fn schema() -> &'static TableSchema {
        &GRANJERO_GRANJERO
    }

    fn decode(row: &CsvRow<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            farmer_id: row.int("id_granjero")?,
            neighbor_id: row.int("id_vecino")?,
            shared_points: row.int("puntos_compartidos")?,
        })
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.farmer_id.into(),
            self.neighbor_id.into(),
            self.shared_points.into(),
        ]
    }

    fn describe(&self) -> String {
        format!(
            "Relación Granjero ID {} - Vecino ID {} ya existe y es idéntica.",
            self.farmer_id, self.neighbor_id
        )
    }
}
