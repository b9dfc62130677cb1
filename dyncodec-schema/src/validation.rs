//! Layout validation for resolved schemas.
//!
//! Offsets come from the introspection provider. Before a schema is handed
//! to the codec, every field must lie inside the declared instance size and
//! after the field before it, so that instance accessors and the codec can
//! index the inline block without further checks.

use crate::error::SchemaError;
use crate::types::TypeSchema;

/// Validates the field layout of a schema (not recursing into nested types).
///
/// # Arguments
/// * `schema` - The schema to validate
///
/// # Errors
/// Returns [`SchemaError::InvalidOffset`] if fields overlap, or
/// [`SchemaError::FieldOutOfBounds`] if a field extends past the instance size.
pub fn validate_layout(schema: &TypeSchema) -> Result<(), SchemaError> {
    let mut expected_offset = 0;

    for field in schema.fields() {
        let footprint = field.footprint();

        if field.offset < expected_offset && footprint > 0 {
            return Err(SchemaError::InvalidOffset {
                field: field.name.clone(),
                offset: field.offset,
            });
        }

        let end = field
            .offset
            .checked_add(footprint)
            .filter(|end| *end <= schema.size())
            .ok_or_else(|| SchemaError::FieldOutOfBounds {
                type_name: schema.qualified_name(),
                field: field.name.clone(),
                offset: field.offset,
                footprint,
                size: schema.size(),
            })?;

        expected_offset = end;
    }

    Ok(())
}
