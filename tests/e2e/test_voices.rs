use crate::e2e::helpers;

use helpers::{generate_test_jwt, TestContext};
use hyper::StatusCode;
use serial_test::serial;
use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, ResponseTemplate};

async fn mock_storage_upload(ctx: &TestContext) {
    Mock::given(method("POST"))
        .and(path_regex(r"^/storage/v1/object/voice-clips/.+"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&ctx.mock_server)
        .await;
}

async fn mock_storage_delete(ctx: &TestContext) {
    Mock::given(method("DELETE"))
        .and(path_regex(r"^/storage/v1/object/voice-clips/.+"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&ctx.mock_server)
        .await;
}

#[tokio::test]
#[serial]
async fn it_should_upload_a_voice_clip() {
    let ctx = TestContext::new().await.unwrap();
    let user = ctx.fixtures.create_user("user@example.com").await.unwrap();
    let token = generate_test_jwt(&user.id, &ctx.config.jwt_secret);
    mock_storage_upload(&ctx).await;

    let response = ctx
        .client
        .post_voice_upload("/api/upload", "My Voice", b"RIFF....WAVEfmt fake audio", &token)
        .await
        .unwrap();

    response.assert_status(StatusCode::CREATED);

    let body = response.body.as_ref().unwrap();
    assert_eq!(body.get("name").and_then(|v| v.as_str()), Some("My Voice"));
    let url = body.get("url").and_then(|v| v.as_str()).expect("Missing url");
    assert!(
        url.contains(&format!("/storage/v1/object/public/voice-clips/{}/My Voice.wav", user.id)),
        "Unexpected voice URL: {}",
        url
    );

    assert_eq!(ctx.fixtures.get_voice_count(user.id).await.unwrap(), 1);
}

#[tokio::test]
#[serial]
async fn it_should_enforce_the_free_plan_voice_cap() {
    let ctx = TestContext::new().await.unwrap();
    let user = ctx.fixtures.create_user("user@example.com").await.unwrap();
    let token = generate_test_jwt(&user.id, &ctx.config.jwt_secret);
    ctx.fixtures
        .create_voice(user.id, "existing", "https://example.com/existing.wav")
        .await
        .unwrap();

    // The cap rejects before any storage traffic
    Mock::given(method("POST"))
        .and(path_regex(r"^/storage/v1/object/.*"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&ctx.mock_server)
        .await;

    let response = ctx
        .client
        .post_voice_upload("/api/upload", "second", b"fake audio", &token)
        .await
        .unwrap();

    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(ctx.fixtures.get_voice_count(user.id).await.unwrap(), 1);
}

#[tokio::test]
#[serial]
async fn it_should_enforce_the_pro_plan_voice_cap() {
    let ctx = TestContext::new().await.unwrap();
    let user = ctx.fixtures.create_pro_user("pro@example.com").await.unwrap();
    let token = generate_test_jwt(&user.id, &ctx.config.jwt_secret);

    for i in 0..3 {
        ctx.fixtures
            .create_voice(
                user.id,
                &format!("voice-{}", i),
                &format!("https://example.com/{}.wav", i),
            )
            .await
            .unwrap();
    }

    let response = ctx
        .client
        .post_voice_upload("/api/upload", "fourth", b"fake audio", &token)
        .await
        .unwrap();

    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(ctx.fixtures.get_voice_count(user.id).await.unwrap(), 3);
}

#[tokio::test]
#[serial]
async fn it_should_report_duplicate_names_as_conflict() {
    let ctx = TestContext::new().await.unwrap();
    let user = ctx.fixtures.create_pro_user("pro@example.com").await.unwrap();
    let token = generate_test_jwt(&user.id, &ctx.config.jwt_secret);
    mock_storage_upload(&ctx).await;

    ctx.client
        .post_voice_upload("/api/upload", "same-name", b"first take", &token)
        .await
        .unwrap()
        .assert_status(StatusCode::CREATED);

    let response = ctx
        .client
        .post_voice_upload("/api/upload", "same-name", b"second take", &token)
        .await
        .unwrap();

    response
        .assert_status(StatusCode::CONFLICT)
        .assert_error_message("already exists");

    assert_eq!(ctx.fixtures.get_voice_count(user.id).await.unwrap(), 1);
}

#[tokio::test]
#[serial]
async fn it_should_reject_blank_names_and_empty_audio() {
    let ctx = TestContext::new().await.unwrap();
    let user = ctx.fixtures.create_user("user@example.com").await.unwrap();
    let token = generate_test_jwt(&user.id, &ctx.config.jwt_secret);

    ctx.client
        .post_voice_upload("/api/upload", "   ", b"fake audio", &token)
        .await
        .unwrap()
        .assert_status(StatusCode::BAD_REQUEST);

    ctx.client
        .post_voice_upload("/api/upload", "a voice", b"", &token)
        .await
        .unwrap()
        .assert_status(StatusCode::BAD_REQUEST);

    assert_eq!(ctx.fixtures.get_voice_count(user.id).await.unwrap(), 0);
}

#[tokio::test]
#[serial]
async fn it_should_list_only_the_callers_voices() {
    let ctx = TestContext::new().await.unwrap();
    let user = ctx.fixtures.create_user("user@example.com").await.unwrap();
    let other = ctx.fixtures.create_user("other@example.com").await.unwrap();
    let token = generate_test_jwt(&user.id, &ctx.config.jwt_secret);

    ctx.fixtures
        .create_voice(user.id, "mine", "https://example.com/mine.wav")
        .await
        .unwrap();
    ctx.fixtures
        .create_voice(other.id, "theirs", "https://example.com/theirs.wav")
        .await
        .unwrap();

    let response = ctx.client.get_with_auth("/api/voices", &token).await.unwrap();

    response.assert_status(StatusCode::OK);
    let voices = response.body.as_ref().unwrap().as_array().unwrap();
    assert_eq!(voices.len(), 1);
    assert_eq!(
        voices[0].get("name").and_then(|v| v.as_str()),
        Some("mine")
    );
}

#[tokio::test]
#[serial]
async fn it_should_delete_an_owned_voice_and_its_blob() {
    let ctx = TestContext::new().await.unwrap();
    let user = ctx.fixtures.create_user("user@example.com").await.unwrap();
    let token = generate_test_jwt(&user.id, &ctx.config.jwt_secret);
    mock_storage_delete(&ctx).await;

    // URL must point into the configured bucket for blob cleanup
    let url = format!(
        "{}/storage/v1/object/public/voice-clips/{}/mine.wav",
        ctx.mock_server.uri(),
        user.id
    );
    let voice = ctx.fixtures.create_voice(user.id, "mine", &url).await.unwrap();

    let response = ctx
        .client
        .delete_with_auth(&format!("/api/voices/{}", voice.id), &token)
        .await
        .unwrap();

    response.assert_status(StatusCode::NO_CONTENT);
    assert!(!ctx.fixtures.voice_exists(voice.id).await.unwrap());
}

#[tokio::test]
#[serial]
async fn it_should_delete_the_row_even_when_storage_cleanup_fails() {
    let ctx = TestContext::new().await.unwrap();
    let user = ctx.fixtures.create_user("user@example.com").await.unwrap();
    let token = generate_test_jwt(&user.id, &ctx.config.jwt_secret);

    Mock::given(method("DELETE"))
        .and(path_regex(r"^/storage/v1/object/voice-clips/.+"))
        .respond_with(ResponseTemplate::new(500).set_body_string("storage down"))
        .mount(&ctx.mock_server)
        .await;

    let url = format!(
        "{}/storage/v1/object/public/voice-clips/{}/mine.wav",
        ctx.mock_server.uri(),
        user.id
    );
    let voice = ctx.fixtures.create_voice(user.id, "mine", &url).await.unwrap();

    let response = ctx
        .client
        .delete_with_auth(&format!("/api/voices/{}", voice.id), &token)
        .await
        .unwrap();

    // Storage cleanup is best effort; the critical row delete still runs
    response.assert_status(StatusCode::NO_CONTENT);
    assert!(!ctx.fixtures.voice_exists(voice.id).await.unwrap());
}

#[tokio::test]
#[serial]
async fn it_should_hide_other_users_voices_behind_not_found() {
    let ctx = TestContext::new().await.unwrap();
    let user = ctx.fixtures.create_user("user@example.com").await.unwrap();
    let other = ctx.fixtures.create_user("other@example.com").await.unwrap();
    let token = generate_test_jwt(&user.id, &ctx.config.jwt_secret);

    let voice = ctx
        .fixtures
        .create_voice(other.id, "theirs", "https://example.com/theirs.wav")
        .await
        .unwrap();

    let response = ctx
        .client
        .delete_with_auth(&format!("/api/voices/{}", voice.id), &token)
        .await
        .unwrap();

    // Ownership mismatch is indistinguishable from absence
    response.assert_status(StatusCode::NOT_FOUND);
    assert!(ctx.fixtures.voice_exists(voice.id).await.unwrap());

    let missing = ctx
        .client
        .delete_with_auth(&format!("/api/voices/{}", uuid::Uuid::new_v4()), &token)
        .await
        .unwrap();
    missing.assert_status(StatusCode::NOT_FOUND);
}
