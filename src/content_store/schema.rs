//! SQLite schema for the relational content store.
//!
//! One row per record, genres are denormalized into a comma-joined column.
//! `revision` lets writers commit only if the row is unchanged since read.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema};

const CONTENTS_TABLE: Table = Table {
    name: "contents",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true), // hyphenated uuid
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("sub_title", &SqlType::Text, non_null = true),
        sqlite_column!("description", &SqlType::Text, non_null = true),
        sqlite_column!("image_url", &SqlType::Text, non_null = true),
        sqlite_column!("duration", &SqlType::Integer, non_null = true),
        sqlite_column!("start_time", &SqlType::Text, non_null = true), // RFC 3339
        sqlite_column!("end_time", &SqlType::Text, non_null = true),   // RFC 3339
        sqlite_column!(
            "genre_list",
            &SqlType::Text,
            non_null = true,
            default_value = Some("''")
        ),
        sqlite_column!(
            "revision",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ), // bumped on every write, used for compare-and-swap
    ],
    indices: &[("idx_contents_title", "title")],
};

pub const CONTENT_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[CONTENTS_TABLE],
    migration: None,
}];
