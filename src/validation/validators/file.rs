//! Validators for uploaded files. Only available to multipart forms.

use crate::form::{FormFile, Value};
use crate::validation::pipeline::RuleContext;
use crate::validation::validators::general::{parse_bound, unsupported};
use crate::validation::validators::{fail, ValidatorError};

/// Skips the rest of the field when no file was uploaded.
pub fn optional_file(ctx: &mut RuleContext<'_>, key: &str, _value: &str) -> Result<(), ValidatorError> {
    match ctx.get_file(key).cloned() {
        Ok(file) => ctx.set_working(Value::File(file)),
        Err(_) => ctx.set_skip_remaining(true),
    }
    Ok(())
}

pub fn required_file(ctx: &mut RuleContext<'_>, key: &str, _value: &str) -> Result<(), ValidatorError> {
    match ctx.get_file(key).cloned() {
        Ok(file) => {
            ctx.set_working(Value::File(file));
            Ok(())
        }
        Err(_) => fail(format!("{} file is required", key)),
    }
}

/// The sniffed type of the working file must be one of the comma-separated
/// types in the argument. The declared type is ignored.
pub fn content_type(ctx: &mut RuleContext<'_>, key: &str, value: &str) -> Result<(), ValidatorError> {
    let detected = working_file(ctx, "contentType", key)?.sniff();
    if value.split(',').any(|allowed| allowed.trim() == detected) {
        Ok(())
    } else {
        fail(format!("File {} does not have a valid content type", key))
    }
}

pub fn max_bytes(ctx: &mut RuleContext<'_>, key: &str, value: &str) -> Result<(), ValidatorError> {
    let limit = parse_bound("maxBytes", key, value)?;
    let size = working_file(ctx, "maxBytes", key)?.size();
    if i128::from(size) > i128::from(limit) {
        fail(format!("{} is too large", key))
    } else {
        Ok(())
    }
}

fn working_file<'c>(
    ctx: &'c RuleContext<'_>,
    rule: &'static str,
    key: &str,
) -> Result<&'c FormFile, ValidatorError> {
    match ctx.working() {
        Some(Value::File(file)) => Ok(file),
        other => Err(unsupported(rule, key, other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::MultipartForm;
    use crate::validation::pipeline::FieldState;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    fn form_with(content: &[u8]) -> MultipartForm {
        MultipartForm::new().with_file(
            "upload",
            FormFile::new(Some("f.bin".into()), Some("image/png".into()), content.to_vec()),
        )
    }

    #[test]
    fn test_required_file() {
        let form = form_with(PNG);
        let mut state = FieldState::default();
        let mut ctx = RuleContext::new(&form, &mut state);
        assert!(required_file(&mut ctx, "upload", "").is_ok());
        assert!(matches!(ctx.working(), Some(Value::File(_))));

        let mut state = FieldState::default();
        let mut ctx = RuleContext::new(&form, &mut state);
        assert_eq!(required_file(&mut ctx, "avatar", ""), fail("avatar file is required"));
    }

    #[test]
    fn test_optional_file_skips_when_missing() {
        let form = MultipartForm::new();
        let mut state = FieldState::default();
        let mut ctx = RuleContext::new(&form, &mut state);
        assert!(optional_file(&mut ctx, "upload", "").is_ok());
        assert!(ctx.skip_remaining());
        assert!(ctx.working().is_none());
    }

    #[test]
    fn test_content_type_uses_sniffed_type() {
        let form = form_with(PNG);
        let mut state = FieldState::default();
        let mut ctx = RuleContext::new(&form, &mut state);
        required_file(&mut ctx, "upload", "").unwrap();
        assert!(content_type(&mut ctx, "upload", "image/jpeg,image/png").is_ok());

        let text = form_with(b"just some text");
        let mut state = FieldState::default();
        let mut ctx = RuleContext::new(&text, &mut state);
        required_file(&mut ctx, "upload", "").unwrap();
        assert_eq!(
            content_type(&mut ctx, "upload", "image/png"),
            fail("File upload does not have a valid content type")
        );
    }

    #[test]
    fn test_max_bytes() {
        let form = form_with(PNG);
        let mut state = FieldState::default();
        let mut ctx = RuleContext::new(&form, &mut state);
        required_file(&mut ctx, "upload", "").unwrap();

        let size = PNG.len().to_string();
        assert!(max_bytes(&mut ctx, "upload", &size).is_ok());
        assert_eq!(max_bytes(&mut ctx, "upload", "4"), fail("upload is too large"));
        assert!(matches!(
            max_bytes(&mut ctx, "upload", "big"),
            Err(ValidatorError::Misconfigured(_))
        ));
    }

    #[test]
    fn test_file_rules_need_a_file() {
        let form = form_with(PNG);
        let mut state = FieldState::default();
        let mut ctx = RuleContext::new(&form, &mut state);
        ctx.set_working(Value::String("upload".into()));
        assert!(matches!(
            max_bytes(&mut ctx, "upload", "10"),
            Err(ValidatorError::Misconfigured(_))
        ));
    }
}
