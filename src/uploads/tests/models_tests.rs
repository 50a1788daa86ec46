// src/uploads/tests/models_tests.rs

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use crate::uploads::models::*;

    fn upload() -> FileUpload {
        FileUpload {
            filename: "my cat & dog.png".to_string(),
            size: 10_240,
            content_type: "image/png".to_string(),
            key: "uploads/u1/1700000000_my cat & dog.png".to_string(),
            url: "https://b.s3.ap-northeast-1.amazonaws.com/uploads/u1/1700000000_my cat & dog.png"
                .to_string(),
            uploaded_at: Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap(),
            user_id: "u1".to_string(),
        }
    }

    #[test]
    fn test_success_query_encodes_values() {
        let query = upload().success_query();

        assert!(query.starts_with("filename=my%20cat%20%26%20dog.png&size=10240&"));
        assert!(query.contains("contentType=image%2Fpng"));
        assert!(query.contains("url=https%3A%2F%2Fb.s3.ap-northeast-1.amazonaws.com%2F"));
        assert!(query.ends_with("uploadTime=2023-11-14%2022%3A13%3A20"));
    }

    #[test]
    fn test_receipt_from_full_query() {
        let query = SuccessQuery {
            filename: Some("cat.png".to_string()),
            size: Some("10240".to_string()),
            content_type: Some("image/png".to_string()),
            url: Some("https://example.com/cat.png".to_string()),
            upload_time: Some("2023-11-14 22:13:20".to_string()),
        };

        let receipt = query.receipt().unwrap();
        assert_eq!(receipt.filename, "cat.png");
        assert_eq!(receipt.size, 10_240);
        assert_eq!(
            receipt.uploaded_at,
            NaiveDate::from_ymd_opt(2023, 11, 14)
                .unwrap()
                .and_hms_opt(22, 13, 20)
                .unwrap()
        );
    }

    #[test]
    fn test_receipt_requires_filename_and_size() {
        let no_name = SuccessQuery {
            size: Some("1".to_string()),
            ..Default::default()
        };
        assert!(no_name.receipt().is_none());

        let no_size = SuccessQuery {
            filename: Some("cat.png".to_string()),
            ..Default::default()
        };
        assert!(no_size.receipt().is_none());
    }

    #[test]
    fn test_receipt_tolerates_bad_size_and_time() {
        let before = Utc::now().naive_utc();
        let query = SuccessQuery {
            filename: Some("cat.png".to_string()),
            size: Some("lots".to_string()),
            upload_time: Some("yesterday".to_string()),
            ..Default::default()
        };

        let receipt = query.receipt().unwrap();
        assert_eq!(receipt.size, 0);
        assert!(receipt.uploaded_at >= before);
    }

    #[test]
    fn test_upload_page_data() {
        let data = UploadPageData::new("test-bucket");
        assert_eq!(data.max_file_size, 52_428_800);
        assert_eq!(data.allowed_types.len(), 7);
        assert_eq!(data.bucket, "test-bucket");
    }
}
