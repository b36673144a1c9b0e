//! Tenant schema derivation.
//!
//! Filters the master entity schema down to the subset a tenant database is
//! allowed to carry: excluded entities disappear wholesale, and any field
//! line referencing an excluded entity is dropped unless it is a bare scalar
//! identifier field (`<word>Id` with a scalar type), which downstream code
//! still needs even though the referenced row lives in the master database.
//!
//! The transform is pure and deterministic: identical input yields
//! byte-identical output, and the artifact is written in a single call after
//! the whole document has been assembled in memory.

use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

/// Header stamped onto every derived schema document.
const GENERATED_HEADER: &str = "// Code generated by the dealerhub schema deriver. DO NOT EDIT.\n\
     // Derived from the master entity schema; regenerate instead of editing.\n";

/// Scalar field types that never reference another entity.
const SCALAR_TYPES: &[&str] = &[
    "Uuid", "String", "Int", "BigInt", "Boolean", "DateTime", "Json", "Float", "Bytes",
];

/// Errors raised while deriving a tenant schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to read schema source {path}: {source}")]
    SourceUnreadable {
        path: String,
        source: std::io::Error,
    },
    #[error("malformed schema source: {message}")]
    Malformed { message: String },
    #[error("failed to write derived schema {path}: {source}")]
    OutputWrite {
        path: String,
        source: std::io::Error,
    },
}

/// One named entity block extracted from a schema document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityBlock {
    pub name: String,
    /// Interior lines of the block, verbatim.
    pub lines: Vec<String>,
}

fn entity_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*entity\s+([A-Za-z]\w*)\s*\{\s*$").unwrap())
}

fn field_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // name, base type, optional `?` or list `[]` marker
    RE.get_or_init(|| Regex::new(r"^\s*([A-Za-z_]\w*)\s+([A-Za-z]\w*)(\?|\[\])?").unwrap())
}

fn id_field_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z][A-Za-z0-9]*Id$").unwrap())
}

/// Extract every entity block from a schema document, in order.
///
/// Content between blocks (comments, blank lines) is ignored. An
/// unterminated block is a hard error.
pub fn parse_entities(source: &str) -> Result<Vec<EntityBlock>, SchemaError> {
    let mut entities = Vec::new();
    let mut current: Option<EntityBlock> = None;

    for (idx, line) in source.lines().enumerate() {
        if current.is_none() {
            if let Some(caps) = entity_header_re().captures(line) {
                current = Some(EntityBlock {
                    name: caps[1].to_string(),
                    lines: Vec::new(),
                });
            }
        } else if line.trim() == "}" {
            entities.push(current.take().expect("block in progress"));
        } else if entity_header_re().is_match(line) {
            let open = current.as_ref().map(|b| b.name.clone()).unwrap_or_default();
            return Err(SchemaError::Malformed {
                message: format!(
                    "new entity opened before '{}' was closed (line {})",
                    open,
                    idx + 1
                ),
            });
        } else if let Some(block) = current.as_mut() {
            block.lines.push(line.to_string());
        }
    }

    if let Some(block) = current {
        return Err(SchemaError::Malformed {
            message: format!("entity '{}' is never closed", block.name),
        });
    }

    Ok(entities)
}

/// Derives the tenant schema document from the master schema source.
#[derive(Debug, Clone)]
pub struct SchemaDeriver {
    excluded: Vec<String>,
}

impl SchemaDeriver {
    /// Create a deriver for the given set of excluded entity names.
    pub fn new<I, S>(excluded: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            excluded: excluded.into_iter().map(Into::into).collect(),
        }
    }

    /// Pure transform: master schema text in, tenant schema text out.
    ///
    /// Entity blocks named in the exclusion set are dropped. Within the
    /// surviving blocks, any line mentioning an excluded entity is dropped
    /// unless it is a scalar identifier field. Duplicate entity names keep
    /// their first occurrence only.
    pub fn derive(&self, source: &str) -> Result<String, SchemaError> {
        let entities = parse_entities(source)?;

        let mut seen: HashSet<&str> = HashSet::new();
        let mut output = String::from(GENERATED_HEADER);

        for entity in &entities {
            if self.excluded.iter().any(|name| name == &entity.name) {
                continue;
            }
            if !seen.insert(entity.name.as_str()) {
                continue;
            }

            output.push('\n');
            output.push_str(&format!("entity {} {{\n", entity.name));
            for line in &entity.lines {
                if self.references_excluded(line) && !is_retained_scalar_id(line) {
                    continue;
                }
                output.push_str(line);
                output.push('\n');
            }
            output.push_str("}\n");
        }

        Ok(output)
    }

    /// Read the source, derive, and write the artifact in one shot.
    ///
    /// The output file is only touched after the full document has been
    /// assembled, so a failure never leaves a partial artifact behind.
    pub fn generate(&self, source_path: &Path, output_path: &Path) -> Result<String, SchemaError> {
        let source =
            std::fs::read_to_string(source_path).map_err(|source| SchemaError::SourceUnreadable {
                path: source_path.display().to_string(),
                source,
            })?;

        let derived = self.derive(&source)?;

        std::fs::write(output_path, &derived).map_err(|source| SchemaError::OutputWrite {
            path: output_path.display().to_string(),
            source,
        })?;

        Ok(derived)
    }

    fn references_excluded(&self, line: &str) -> bool {
        self.excluded.iter().any(|name| line.contains(name.as_str()))
    }
}

/// A line is a retained scalar identifier field when the field name matches
/// `<word>Id` and its declared type is a plain scalar, e.g.
/// `soldByUserId Uuid?`. Relation fields never match.
fn is_retained_scalar_id(line: &str) -> bool {
    let Some(caps) = field_line_re().captures(line) else {
        return false;
    };
    let name = &caps[1];
    let base_type = &caps[2];
    let is_list = caps.get(3).map(|m| m.as_str()) == Some("[]");

    !is_list && id_field_re().is_match(name) && SCALAR_TYPES.contains(&base_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"
// test fixture
entity User {
  id    Uuid   @id
  email String @unique
}

entity Customer {
  id               Uuid   @id
  firstName        String
  accountManagerUserId Uuid?
  accountManager   User?  @relation(fields: [accountManagerUserId])
  vehicles         Vehicle[]
}

entity Vehicle {
  id         Uuid   @id
  customerId Uuid
  owner      User?
}
"#;

    fn deriver() -> SchemaDeriver {
        SchemaDeriver::new(["User"])
    }

    #[test]
    fn excluded_entities_are_removed() {
        let derived = deriver().derive(SOURCE).unwrap();
        assert!(!derived.contains("entity User"));
        assert!(derived.contains("entity Customer"));
        assert!(derived.contains("entity Vehicle"));
    }

    #[test]
    fn relation_fields_to_excluded_entities_are_removed() {
        let derived = deriver().derive(SOURCE).unwrap();
        assert!(!derived.contains("accountManager   User?"));
        assert!(!derived.contains("owner      User?"));
        // Unrelated relation fields survive.
        assert!(derived.contains("vehicles         Vehicle[]"));
    }

    #[test]
    fn scalar_identifier_fields_are_retained() {
        let derived = deriver().derive(SOURCE).unwrap();
        // The field name mentions the excluded entity but carries a scalar
        // type, so the foreign-key value is kept.
        assert!(derived.contains("accountManagerUserId Uuid?"));
    }

    #[test]
    fn duplicate_entities_keep_first_occurrence() {
        let source = r#"
entity Customer {
  id Uuid @id
}
entity Customer {
  id    Uuid   @id
  extra String
}
"#;
        let derived = deriver().derive(source).unwrap();
        assert_eq!(derived.matches("entity Customer").count(), 1);
        assert!(!derived.contains("extra String"));
    }

    #[test]
    fn derivation_is_idempotent() {
        let first = deriver().derive(SOURCE).unwrap();
        let second = deriver().derive(SOURCE).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn derived_document_carries_generated_header() {
        let derived = deriver().derive(SOURCE).unwrap();
        assert!(derived.starts_with("// Code generated"));
    }

    #[test]
    fn derived_document_reparses() {
        let derived = deriver().derive(SOURCE).unwrap();
        let entities = parse_entities(&derived).unwrap();
        let names: Vec<_> = entities.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Customer", "Vehicle"]);
    }

    #[test]
    fn unterminated_block_is_malformed() {
        let result = deriver().derive("entity Customer {\n  id Uuid @id\n");
        assert!(matches!(result, Err(SchemaError::Malformed { .. })));
    }

    #[test]
    fn generate_writes_byte_identical_output_on_rerun() {
        let dir = tempfile::tempdir().unwrap();
        let source_path = dir.path().join("master.schema");
        let output_path = dir.path().join("tenant.schema");
        std::fs::write(&source_path, SOURCE).unwrap();

        let deriver = deriver();
        deriver.generate(&source_path, &output_path).unwrap();
        let first = std::fs::read(&output_path).unwrap();

        deriver.generate(&source_path, &output_path).unwrap();
        let second = std::fs::read(&output_path).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn missing_source_fails_without_writing_output() {
        let dir = tempfile::tempdir().unwrap();
        let source_path = dir.path().join("absent.schema");
        let output_path = dir.path().join("tenant.schema");

        let result = deriver().generate(&source_path, &output_path);
        assert!(matches!(result, Err(SchemaError::SourceUnreadable { .. })));
        assert!(!output_path.exists());
    }
}
