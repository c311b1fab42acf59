use crate::error::{InventoryError, InventoryResult};
use regex::Regex;
use std::sync::LazyLock;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

static CAS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2,7}-\d{2}-\d$").expect("CAS pattern is a valid regex"));

/// Run the validator-derived rules and fold any failures into one `Validation` error
pub fn validate_model<T: Validate>(model: &T) -> InventoryResult<()> {
    match model.validate() {
        Ok(()) => Ok(()),
        Err(errors) => {
            let error_messages = format_validation_errors(&errors);
            Err(InventoryError::validation("model", error_messages))
        }
    }
}

pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();
    collect_messages("", errors, &mut messages);
    messages.join(", ")
}

fn collect_messages(prefix: &str, errors: &ValidationErrors, messages: &mut Vec<String>) {
    let mut fields: Vec<_> = errors.errors().iter().collect();
    fields.sort_by_key(|(field, _)| **field);

    for (field, kind) in fields {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let message = match (&error.message, error.code.as_ref()) {
                        (Some(message), _) => format!("{}: {}", path, message),
                        (None, "range") => format!("Value out of range for field '{}'", path),
                        (None, "length") => {
                            format!("Length validation failed for field '{}'", path)
                        }
                        (None, "required") => format!("Field '{}' is required", path),
                        (None, code) => format!("Validation failed for field '{}': {}", path, code),
                    };
                    messages.push(message);
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_messages(&path, inner, messages),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_messages(&format!("{}[{}]", path, index), inner, messages);
                }
            }
        }
    }
}

/// Check CAS registry format (2-7 digits, 2 digits, check digit) and the check digit itself
pub fn validate_cas_number(cas_number: &str) -> InventoryResult<()> {
    if !CAS_REGEX.is_match(cas_number) {
        return Err(InventoryError::validation(
            "cas_number",
            "Invalid CAS number format. Expected format: XXXXXX-XX-X",
        ));
    }

    let digits: Vec<u32> = cas_number.chars().filter_map(|c| c.to_digit(10)).collect();
    let (check_digit, body) = match digits.split_last() {
        Some((check, body)) => (*check, body),
        None => {
            return Err(InventoryError::validation(
                "cas_number",
                "CAS number has no digits",
            ))
        }
    };

    let sum: u32 = body
        .iter()
        .rev()
        .enumerate()
        .map(|(i, digit)| digit * (i as u32 + 1))
        .sum();

    if sum % 10 != check_digit {
        return Err(InventoryError::validation(
            "cas_number",
            "Invalid CAS number check digit",
        ));
    }

    Ok(())
}

pub fn validate_file_type(file_name: &str, allowed_types: &[String]) -> InventoryResult<()> {
    let extension = std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase();

    if !allowed_types.iter().any(|allowed| allowed.eq_ignore_ascii_case(&extension)) {
        return Err(InventoryError::validation(
            "file_type",
            format!(
                "File type '{}' not allowed. Allowed types: {}",
                extension,
                allowed_types.join(", ")
            ),
        ));
    }

    Ok(())
}

pub fn validate_file_size(file_size: u64, max_size: u64) -> InventoryResult<()> {
    if file_size > max_size {
        return Err(InventoryError::validation(
            "file_size",
            format!(
                "File size {} bytes exceeds maximum allowed size {} bytes",
                file_size, max_size
            ),
        ));
    }

    Ok(())
}
