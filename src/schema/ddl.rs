//! DDL materialization for derived schema documents.
//!
//! Turns a schema document into `CREATE TABLE IF NOT EXISTS` statements and
//! applies them to a freshly provisioned tenant database. The semantics are
//! "ensure this structure exists", not incremental migration; running the
//! statements against a database that already has the tables is a no-op.

use anyhow::{Context, Result};
use regex::Regex;
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use std::sync::OnceLock;

use super::deriver::{EntityBlock, SchemaError, parse_entities};

fn field_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*([A-Za-z_]\w*)\s+([A-Za-z]\w*)(\?|\[\])?\s*(.*)$").unwrap()
    })
}

fn default_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"@default\(([^)]*)\)"#).unwrap())
}

/// Map a schema scalar type to its SQL column type.
fn sql_type(base_type: &str) -> Option<&'static str> {
    Some(match base_type {
        "Uuid" => "uuid",
        "String" => "text",
        "Int" => "integer",
        "BigInt" => "bigint",
        "Boolean" => "boolean",
        "DateTime" => "timestamptz",
        "Json" => "jsonb",
        "Float" => "double precision",
        "Bytes" => "bytea",
        _ => return None,
    })
}

/// Convert a camelCase field or PascalCase entity name to snake_case.
fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Table name for an entity: snake_case, pluralized.
fn table_name(entity: &str) -> String {
    format!("{}s", snake_case(entity))
}

fn default_clause(attrs: &str) -> Option<String> {
    let raw = default_re().captures(attrs)?.get(1)?.as_str().trim();
    if raw == "now()" {
        return Some("CURRENT_TIMESTAMP".to_string());
    }
    if raw == "true" || raw == "false" {
        return Some(raw.to_string());
    }
    if raw.parse::<i64>().is_ok() {
        return Some(raw.to_string());
    }
    if raw.starts_with('"') && raw.ends_with('"') && raw.len() >= 2 {
        return Some(format!("'{}'", &raw[1..raw.len() - 1]));
    }
    None
}

fn column_definitions(block: &EntityBlock) -> Vec<String> {
    let mut columns = Vec::new();

    for line in &block.lines {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("//") {
            continue;
        }
        let Some(caps) = field_re().captures(line) else {
            continue;
        };

        let name = &caps[1];
        let base_type = &caps[2];
        let marker = caps.get(3).map(|m| m.as_str());
        let attrs = caps.get(4).map(|m| m.as_str()).unwrap_or("");

        // Relation and list fields carry no column of their own.
        if marker == Some("[]") {
            continue;
        }
        let Some(column_type) = sql_type(base_type) else {
            continue;
        };

        let mut def = format!("\"{}\" {}", snake_case(name), column_type);
        if attrs.contains("@id") {
            def.push_str(" NOT NULL PRIMARY KEY");
        } else {
            if marker != Some("?") {
                def.push_str(" NOT NULL");
            }
            if attrs.contains("@unique") {
                def.push_str(" UNIQUE");
            }
        }
        if let Some(default) = default_clause(attrs) {
            def.push_str(&format!(" DEFAULT {}", default));
        }

        columns.push(def);
    }

    columns
}

/// Build one `CREATE TABLE IF NOT EXISTS` statement per entity block.
pub fn statements(document: &str) -> Result<Vec<String>, SchemaError> {
    let entities = parse_entities(document)?;

    let mut stmts = Vec::with_capacity(entities.len());
    for block in &entities {
        let columns = column_definitions(block);
        if columns.is_empty() {
            return Err(SchemaError::Malformed {
                message: format!("entity '{}' has no scalar columns", block.name),
            });
        }
        stmts.push(format!(
            "CREATE TABLE IF NOT EXISTS \"{}\" (\n  {}\n)",
            table_name(&block.name),
            columns.join(",\n  ")
        ));
    }

    Ok(stmts)
}

/// Apply a schema document to a database, statement by statement.
///
/// Returns the number of statements executed.
pub async fn apply(db: &DatabaseConnection, document: &str) -> Result<usize> {
    let stmts = statements(document).context("failed to build tenant DDL")?;
    let count = stmts.len();

    for sql in stmts {
        db.execute(Statement::from_string(db.get_database_backend(), sql))
            .await
            .context("failed to apply tenant DDL statement")?;
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"
entity Customer {
  id        Uuid     @id
  firstName String
  email     String   @unique
  phone     String?
  rating    Int      @default(0)
  active    Boolean  @default(true)
  createdAt DateTime @default(now())
  vehicles  Vehicle[]
}
"#;

    #[test]
    fn builds_create_table_statement() {
        let stmts = statements(DOC).unwrap();
        assert_eq!(stmts.len(), 1);

        let sql = &stmts[0];
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS \"customers\""));
        assert!(sql.contains("\"id\" uuid NOT NULL PRIMARY KEY"));
        assert!(sql.contains("\"first_name\" text NOT NULL"));
        assert!(sql.contains("\"email\" text NOT NULL UNIQUE"));
        assert!(sql.contains("\"phone\" text,"));
        assert!(sql.contains("\"rating\" integer NOT NULL DEFAULT 0"));
        assert!(sql.contains("\"active\" boolean NOT NULL DEFAULT true"));
        assert!(sql.contains("\"created_at\" timestamptz NOT NULL DEFAULT CURRENT_TIMESTAMP"));
    }

    #[test]
    fn relation_and_list_fields_carry_no_column() {
        let stmts = statements(DOC).unwrap();
        assert!(!stmts[0].contains("vehicles"));
    }

    #[test]
    fn entity_without_columns_is_rejected() {
        let doc = "entity Empty {\n  owners User[]\n}\n";
        assert!(matches!(
            statements(doc),
            Err(SchemaError::Malformed { .. })
        ));
    }

    #[test]
    fn snake_case_conversion() {
        assert_eq!(snake_case("firstName"), "first_name");
        assert_eq!(snake_case("WarrantyPackage"), "warranty_package");
        assert_eq!(snake_case("vin"), "vin");
        assert_eq!(table_name("WarrantyPackageItem"), "warranty_package_items");
    }

    #[tokio::test]
    async fn applies_to_an_empty_database() {
        let db = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
        let applied = apply(&db, DOC).await.unwrap();
        assert_eq!(applied, 1);

        // Idempotent: a second application is a no-op.
        let applied_again = apply(&db, DOC).await.unwrap();
        assert_eq!(applied_again, 1);
    }
}
