// src/uploads/tests/validators_tests.rs

#[cfg(test)]
mod tests {
    use crate::common::Validator;
    use crate::uploads::models::UploadCandidate;
    use crate::uploads::validators::*;

    fn candidate(content_type: &str, size: u64) -> UploadCandidate {
        UploadCandidate {
            filename: "cat.png".to_string(),
            content_type: content_type.to_string(),
            size,
        }
    }

    #[test]
    fn test_every_allowed_type_passes() {
        for content_type in ALLOWED_CONTENT_TYPES {
            let result = UploadValidator.validate(&candidate(content_type, 1024));
            assert!(result.is_valid, "{} should be accepted", content_type);
        }
    }

    #[test]
    fn test_other_types_fail() {
        for content_type in [
            "",
            "text/plain",
            "image/svg+xml",
            "application/octet-stream",
            "IMAGE/PNG",
            "image/png; charset=binary",
        ] {
            let result = UploadValidator.validate(&candidate(content_type, 1024));
            assert!(!result.is_valid, "{:?} should be rejected", content_type);
            assert!(result.has_error_for("content_type"));
            assert_eq!(result.summary(), INVALID_TYPE_MESSAGE);
        }
    }

    #[test]
    fn test_size_ceiling_is_inclusive() {
        let at_limit = UploadValidator.validate(&candidate("image/png", MAX_UPLOAD_BYTES));
        assert!(at_limit.is_valid);

        let over = UploadValidator.validate(&candidate("image/png", MAX_UPLOAD_BYTES + 1));
        assert!(!over.is_valid);
        assert!(over.has_error_for("size"));
        assert_eq!(over.summary(), TOO_LARGE_MESSAGE);
    }

    #[test]
    fn test_empty_file_is_accepted() {
        assert!(UploadValidator.validate(&candidate("application/pdf", 0)).is_valid);
    }

    #[test]
    fn test_multiple_failures_are_collected() {
        let result = UploadValidator.validate(&candidate("text/html", MAX_UPLOAD_BYTES * 2));
        assert_eq!(result.errors.len(), 2);
    }

    #[test]
    fn test_missing_filename() {
        let mut upload = candidate("image/png", 10);
        upload.filename = "  ".to_string();

        let result = UploadValidator.validate(&upload);
        assert!(result.has_error_for("file"));
    }

    #[test]
    fn test_storage_key_layout() {
        assert_eq!(
            storage_key("google-sub-42", 1_700_000_000, "cat.png"),
            "uploads/google-sub-42/1700000000_cat.png"
        );
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("cat.png"), "cat.png");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\ada\\report.pdf"), "report.pdf");
        assert_eq!(sanitize_filename("bad\u{0}\nname.zip"), "badname.zip");
        assert_eq!(sanitize_filename("my photo (1).jpg"), "my photo (1).jpg");
        assert_eq!(sanitize_filename(".."), "file");
        assert_eq!(sanitize_filename("dir/"), "file");
        assert_eq!(sanitize_filename(""), "file");
    }
}
