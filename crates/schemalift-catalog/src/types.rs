//! Warehouse-native type name mapping
//!
//! Maps the type strings reported by INFORMATION_SCHEMA to the portable
//! [`ColumnType`]. The mapping decides which columns count as
//! semi-structured and therefore get expanded during schema inference.

use schemalift_core::ColumnType;

/// Map a BigQuery type name (e.g. `INT64`, `NUMERIC(10,2)`, `ARRAY<STRING>`)
pub fn map_bigquery_type(bq_type: &str) -> ColumnType {
    // Parameterized types like NUMERIC(10,2) and ARRAY<STRING> carry the
    // base name before the first '(' or '<'.
    let base_type = bq_type
        .split('(')
        .next()
        .unwrap_or(bq_type)
        .split('<')
        .next()
        .unwrap_or(bq_type)
        .trim()
        .to_uppercase();

    match base_type.as_str() {
        "BOOL" | "BOOLEAN" => ColumnType::Bool,

        "INT64" | "INTEGER" | "INT" | "SMALLINT" | "BIGINT" | "TINYINT" | "BYTEINT" => {
            ColumnType::Int
        }

        "FLOAT64" | "FLOAT" => ColumnType::Float,

        "NUMERIC" | "BIGNUMERIC" | "DECIMAL" => parse_decimal(bq_type, 38, 9),

        "STRING" | "BYTES" => ColumnType::String,

        "DATE" => ColumnType::Date,
        "DATETIME" | "TIMESTAMP" | "TIME" => ColumnType::Timestamp,

        // GeoJSON text
        "GEOGRAPHY" => ColumnType::String,

        "JSON" => ColumnType::SemiStructured,
        "STRUCT" | "RECORD" => ColumnType::Struct,
        "ARRAY" => ColumnType::Array,

        _ => ColumnType::Unknown,
    }
}

/// Map a Snowflake type name (e.g. `NUMBER(38,0)`, `VARIANT`, `TIMESTAMP_NTZ`)
pub fn map_snowflake_type(sf_type: &str) -> ColumnType {
    let base_type = sf_type
        .split('(')
        .next()
        .unwrap_or(sf_type)
        .trim()
        .to_uppercase();

    match base_type.as_str() {
        "BOOLEAN" => ColumnType::Bool,

        "NUMBER" | "DECIMAL" | "NUMERIC" => {
            // NUMBER with scale 0 behaves as an integer
            if is_integer_number(sf_type) {
                ColumnType::Int
            } else {
                parse_decimal(sf_type, 38, 0)
            }
        }

        "INT" | "INTEGER" | "BIGINT" | "SMALLINT" | "TINYINT" | "BYTEINT" => ColumnType::Int,

        "FLOAT" | "FLOAT4" | "FLOAT8" | "DOUBLE" | "DOUBLE PRECISION" | "REAL" => {
            ColumnType::Float
        }

        "VARCHAR" | "STRING" | "TEXT" | "CHAR" | "CHARACTER" | "NVARCHAR" | "NCHAR" => {
            ColumnType::String
        }

        "BINARY" | "VARBINARY" => ColumnType::String,

        "DATE" => ColumnType::Date,

        "DATETIME" | "TIMESTAMP" | "TIMESTAMP_NTZ" | "TIMESTAMP_LTZ" | "TIMESTAMP_TZ" | "TIME" => {
            ColumnType::Timestamp
        }

        "VARIANT" | "OBJECT" => ColumnType::SemiStructured,
        "ARRAY" => ColumnType::Array,

        "GEOGRAPHY" | "GEOMETRY" => ColumnType::String,

        _ => ColumnType::Unknown,
    }
}

/// Check if a NUMBER type is effectively an integer (scale 0)
fn is_integer_number(type_str: &str) -> bool {
    // Bare NUMBER defaults to decimal
    if !type_str.contains('(') {
        return false;
    }

    if let Some(params) = type_str.split('(').nth(1) {
        if let Some(params) = params.strip_suffix(')') {
            let parts: Vec<&str> = params.split(',').collect();
            if parts.len() == 2 {
                if let Ok(scale) = parts[1].trim().parse::<i32>() {
                    return scale == 0;
                }
            } else if parts.len() == 1 {
                // NUMBER(precision) with no scale defaults to 0
                return true;
            }
        }
    }

    false
}

/// Parse `DECIMAL(precision, scale)` parameters, with warehouse defaults
fn parse_decimal(type_str: &str, default_precision: u16, default_scale: u16) -> ColumnType {
    if let Some(params) = type_str.split('(').nth(1) {
        if let Some(params) = params.strip_suffix(')') {
            let parts: Vec<&str> = params.split(',').collect();
            if parts.len() == 2 {
                return ColumnType::Decimal {
                    precision: parts[0].trim().parse().ok(),
                    scale: parts[1].trim().parse().ok(),
                };
            } else if parts.len() == 1 {
                return ColumnType::Decimal {
                    precision: parts[0].trim().parse().ok(),
                    scale: Some(0),
                };
            }
        }
    }

    ColumnType::Decimal {
        precision: Some(default_precision),
        scale: Some(default_scale),
    }
}
