use resume_scout::domain::{JobId, ObjectKey, StoragePath};

#[test]
fn given_job_id_when_building_paths_then_follow_bucket_layout() {
    let job_id = JobId::new("abc");

    assert_eq!(StoragePath::by_job(&job_id).as_str(), "maps/by-job/abc.json");
    assert_eq!(StoragePath::extracted(&job_id).as_str(), "extracted/abc.json");
    assert_eq!(StoragePath::checkpoint(&job_id).as_str(), "checkpoints/abc.json");
}

#[test]
fn given_object_key_with_slashes_when_building_by_upload_path_then_key_is_one_segment() {
    let path = StoragePath::by_upload(&ObjectKey::new("uploads/my cv.pdf"));
    assert_eq!(path.as_str(), "maps/by-upload/uploads%2Fmy%20cv.pdf.json");
}

#[test]
fn given_uri_mark_characters_when_building_by_upload_path_then_they_stay_literal() {
    let path = StoragePath::by_upload(&ObjectKey::new("uploads/my cv (final)!~*'_-.pdf"));
    assert_eq!(
        path.as_str(),
        "maps/by-upload/uploads%2Fmy%20cv%20(final)!~*'_-.pdf.json"
    );
}

#[test]
fn given_reserved_and_non_ascii_characters_when_building_by_upload_path_then_they_are_escaped() {
    let path = StoragePath::by_upload(&ObjectKey::new("uploads/cv [v2]#1+é%.pdf"));
    assert_eq!(
        path.as_str(),
        "maps/by-upload/uploads%2Fcv%20%5Bv2%5D%231%2B%C3%A9%25.pdf.json"
    );
}

#[test]
fn given_extracted_key_when_parsing_then_accepted() {
    let path = StoragePath::parse_extracted("extracted/abc.json").unwrap();
    assert_eq!(path.as_str(), "extracted/abc.json");
}

#[test]
fn given_key_outside_extracted_namespace_when_parsing_then_rejected() {
    assert!(StoragePath::parse_extracted("maps/by-job/abc.json").is_none());
    assert!(StoragePath::parse_extracted("extracted/").is_none());
    assert!(StoragePath::parse_extracted("extracted/../maps/x.json").is_none());
    assert!(StoragePath::parse_extracted("extracted/a/b.json").is_none());
}
