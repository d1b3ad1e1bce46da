//! Static file serving integration tests, including traversal attempts.
//!
//! Run with: `cargo test -p picbox-api --test uploads_test`

mod helpers;

use helpers::{fixtures, setup_test_app};

#[tokio::test]
async fn test_uploaded_file_round_trips_byte_for_byte() {
    let app = setup_test_app().await;
    let original = fixtures::create_fake_jpeg();

    let upload = app
        .upload("photo.jpg", "image/jpeg", original.clone())
        .await;
    assert_eq!(upload.status_code(), 200);
    let body: serde_json::Value = upload.json();
    let filename = body["filename"].as_str().unwrap();

    let response = app.client().get(&format!("/uploads/{filename}")).await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.as_bytes().as_ref(), original.as_slice());
    assert_eq!(
        response.headers().get("content-type").map(|v| v.to_str().unwrap()),
        Some("image/jpeg")
    );
    assert_eq!(
        response
            .headers()
            .get("x-content-type-options")
            .map(|v| v.to_str().unwrap()),
        Some("nosniff")
    );
}

#[tokio::test]
async fn test_content_type_is_inferred_from_extension() {
    let app = setup_test_app().await;
    app.seed_file("a.png", &fixtures::create_minimal_png());
    app.seed_file("b.GIF", &fixtures::create_minimal_gif());

    let png = app.client().get("/uploads/a.png").await;
    assert_eq!(
        png.headers().get("content-type").map(|v| v.to_str().unwrap()),
        Some("image/png")
    );

    let gif = app.client().get("/uploads/b.GIF").await;
    assert_eq!(
        gif.headers().get("content-type").map(|v| v.to_str().unwrap()),
        Some("image/gif")
    );
}

#[tokio::test]
async fn test_missing_file_is_404() {
    let app = setup_test_app().await;
    std::fs::create_dir_all(&app.upload_dir).unwrap();

    let response = app.client().get("/uploads/1700000000000.png").await;

    assert_eq!(response.status_code(), 404);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Not found");
}

#[tokio::test]
async fn test_missing_directory_is_404() {
    let app = setup_test_app().await;

    let response = app.client().get("/uploads/a.png").await;

    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_encoded_traversal_never_escapes_upload_dir() {
    let app = setup_test_app().await;
    std::fs::create_dir_all(&app.upload_dir).unwrap();
    let secret = app.upload_dir.parent().unwrap().join("secret.txt");
    std::fs::write(&secret, b"top secret").unwrap();

    for path in [
        "/uploads/..%2Fsecret.txt",
        "/uploads/..%5Csecret.txt",
        "/uploads/%2Fetc%2Fpasswd",
        "/uploads/.hidden",
    ] {
        let response = app.client().get(path).await;
        assert_ne!(response.status_code(), 200, "{path} was served");
        assert!(
            !response.text().contains("top secret"),
            "{path} leaked the secret"
        );
    }
}

#[tokio::test]
async fn test_undecodable_filename_is_json_400() {
    let app = setup_test_app().await;

    let response = app.client().get("/uploads/%FF.png").await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(
        response.headers().get("content-type").map(|v| v.to_str().unwrap()),
        Some("application/json")
    );
    let body: serde_json::Value = response.json();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_nested_path_is_not_a_stored_file() {
    let app = setup_test_app().await;
    std::fs::create_dir_all(app.upload_dir.join("sub")).unwrap();
    std::fs::write(app.upload_dir.join("sub").join("a.png"), b"nested").unwrap();

    let response = app.client().get("/uploads/sub/a.png").await;

    assert_eq!(response.status_code(), 404);
}

#[cfg(unix)]
#[tokio::test]
async fn test_symlink_out_of_upload_dir_is_refused() {
    let app = setup_test_app().await;
    std::fs::create_dir_all(&app.upload_dir).unwrap();
    let secret = app.upload_dir.parent().unwrap().join("secret.txt");
    std::fs::write(&secret, b"top secret").unwrap();
    std::os::unix::fs::symlink(&secret, app.upload_dir.join("link.png")).unwrap();

    let response = app.client().get("/uploads/link.png").await;

    assert_ne!(response.status_code(), 200);
    assert!(!response.text().contains("top secret"));
}
