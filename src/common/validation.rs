// src/common/validation.rs

use validator::ValidationError;

/// Campo obrigatório: vazio ou só espaços é "required".
/// O `length(max = ..)` do campo cuida do limite superior.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

/// Nome do campo como o cliente enviou (`first_name` -> `firstName`).
pub fn json_field_name(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper_next = false;
    for c in field.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_are_required() {
        assert_eq!(not_blank("").unwrap_err().code, "required");
        assert_eq!(not_blank("   ").unwrap_err().code, "required");
        assert!(not_blank("Jane").is_ok());
    }

    #[test]
    fn field_names_follow_the_json_payload() {
        assert_eq!(json_field_name("first_name"), "firstName");
        assert_eq!(json_field_name("phone_number"), "phoneNumber");
        assert_eq!(json_field_name("email"), "email");
    }
}
