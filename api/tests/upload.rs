use image::GenericImageView;
use reqwest::StatusCode;
use serde_json::Value;
use thumbtier_api::provision::{self, NewTier};
use thumbtier_db::Store;
use thumbtier_test::fixtures;

use crate::common::{error_message, keys_in_order, run_app_test};

#[tokio::test]
async fn basic_tier_gets_one_thumbnail() {
    run_app_test(|app| async move {
        let user = app.add_user("alice", Some("Basic")).await?;
        let response = app
            .upload(Some(&user), "cat.jpg", fixtures::jpeg(900, 600), None)
            .await?;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = response.text().await?;
        assert_eq!(keys_in_order(&body), vec!["200px_thumbnail", "success"]);

        let body = serde_json::from_str::<Value>(&body)?;
        assert_eq!(body["success"], "Image uploaded successfully");
        let link = body["200px_thumbnail"].as_str().unwrap();
        assert_eq!(
            link,
            format!("/media/{}/images/cat_200px_thumbnail.jpg", user.user_key())
        );

        let response = app.fetch_link(link, Some(&user)).await?;
        assert_eq!(response.status(), StatusCode::OK);
        let thumbnail = image::load_from_memory(&response.bytes().await?)?;
        assert_eq!(thumbnail.dimensions(), (300, 200));
        Ok(())
    })
    .await
}

#[tokio::test]
async fn premium_tier_gets_two_thumbnails_and_the_original() {
    run_app_test(|app| async move {
        let user = app.add_user("bob", Some("Premium")).await?;
        let original = fixtures::png(900, 600);
        let response = app
            .upload(Some(&user), "dog.png", original.clone(), Some("600"))
            .await?;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = response.text().await?;
        assert_eq!(
            keys_in_order(&body),
            vec!["400px_thumbnail", "200px_thumbnail", "original_image", "success"]
        );

        let body = serde_json::from_str::<Value>(&body)?;
        for (key, size) in [("400px_thumbnail", (600, 400)), ("200px_thumbnail", (300, 200))] {
            let link = body[key].as_str().unwrap();
            let response = app.fetch_link(link, Some(&user)).await?;
            let bytes = response.bytes().await?;
            assert_eq!(image::guess_format(&bytes)?, image::ImageFormat::Png);
            assert_eq!(image::load_from_memory(&bytes)?.dimensions(), size);
        }

        let response = app
            .fetch_link(body["original_image"].as_str().unwrap(), Some(&user))
            .await?;
        assert_eq!(response.bytes().await?.as_ref(), original.as_slice());
        Ok(())
    })
    .await
}

#[tokio::test]
async fn enterprise_tier_gets_an_expiring_link() {
    run_app_test(|app| async move {
        let user = app.add_user("carol", Some("Enterprise")).await?;
        let original = fixtures::jpeg(900, 600);
        let response = app
            .upload(Some(&user), "bird.jpeg", original.clone(), Some("300"))
            .await?;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = response.text().await?;
        assert_eq!(
            keys_in_order(&body),
            vec![
                "400px_thumbnail",
                "200px_thumbnail",
                "original_image",
                "300s_expiring_link",
                "success"
            ]
        );

        let body = serde_json::from_str::<Value>(&body)?;
        let link = body["300s_expiring_link"].as_str().unwrap();
        assert_eq!(link, "/media/expiring-images/bird.jpeg");

        // Anyone holding the link can read it.
        let response = app.fetch_link(link, None).await?;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.bytes().await?.as_ref(), original.as_slice());

        let expiring = app.store.list_expiring_images(user.user_id).await?;
        assert_eq!(expiring.len(), 1);
        assert_eq!(expiring[0].live_time, 300);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn live_time_validation_keeps_the_upload() {
    run_app_test(|app| async move {
        let user = app.add_user("dave", Some("Enterprise")).await?;

        let response = app
            .upload(Some(&user), "a.jpg", fixtures::jpeg(90, 60), None)
            .await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_message(response).await?, "No live_time field");

        for live_time in ["299", "3001"] {
            let response = app
                .upload(Some(&user), "a.jpg", fixtures::jpeg(90, 60), Some(live_time))
                .await?;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(
                error_message(response).await?,
                "Live time must be between 300 and 3000 seconds"
            );
        }

        let response = app
            .upload(Some(&user), "a.jpg", fixtures::jpeg(90, 60), Some("soon"))
            .await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_message(response).await?, "live_time must be an integer");

        // Failed expiring links don't undo the uploads or their thumbnails.
        assert!(app.store.list_expiring_images(user.user_id).await?.is_empty());
        assert_eq!(app.store.list_images(user.user_id).await?.len(), 4);
        let thumbnail = app
            .storage
            .path()
            .join(user.user_key())
            .join("images/a_400px_thumbnail.jpg");
        assert!(thumbnail.exists());
        Ok(())
    })
    .await
}

#[tokio::test]
async fn custom_tier_uses_its_own_height() {
    run_app_test(|app| async move {
        provision::add_tier(
            app.store.as_ref(),
            NewTier {
                name: "Gold".to_string(),
                thumbnail_height: Some(150),
                original_link: false,
                expiring_link: false,
            },
        )
        .await?;
        let user = app.add_user("erin", Some("Gold")).await?;

        let response = app
            .upload(Some(&user), "cat.png", fixtures::png(900, 600), None)
            .await?;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = response.text().await?;
        assert_eq!(keys_in_order(&body), vec!["150px_thumbnail", "success"]);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn user_without_tier_is_a_server_error() {
    run_app_test(|app| async move {
        let user = app.add_user("frank", None).await?;
        let response = app
            .upload(Some(&user), "cat.png", fixtures::png(90, 60), None)
            .await?;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn rejected_uploads_leave_no_record() {
    run_app_test(|app| async move {
        let user = app.add_user("grace", Some("Premium")).await?;

        let response = app
            .upload(Some(&user), "cat.bmp", fixtures::bmp(90, 60), None)
            .await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_message(response).await?, "Image format not supported");

        let response = app
            .upload(Some(&user), "cat.jpg", fixtures::bmp(90, 60), None)
            .await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_message(response).await?, "Image format not supported");

        let response = app
            .upload(Some(&user), "cat.png", fixtures::jpeg(900, 600), None)
            .await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_message(response).await?, "Image format not supported");

        let response = app
            .upload(Some(&user), "cat.jpg", b"not an image".to_vec(), None)
            .await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            error_message(response).await?,
            "Upload a valid image. The file you uploaded was either not an image or a corrupted image."
        );

        let form = reqwest::multipart::Form::new().text("live_time", "300");
        let response = app.post("images", Some(&user)).multipart(form).send().await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_message(response).await?, "No file was submitted");

        assert!(app.store.list_images(user.user_id).await?.is_empty());
        assert!(!app.storage.path().join(user.user_key()).exists());
        Ok(())
    })
    .await
}

#[tokio::test]
async fn anonymous_upload_is_forbidden() {
    run_app_test(|app| async move {
        let response = app.upload(None, "cat.jpg", fixtures::jpeg(90, 60), None).await?;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn duplicate_names_get_distinct_files() {
    run_app_test(|app| async move {
        let user = app.add_user("heidi", Some("Premium")).await?;

        let mut originals = Vec::new();
        for _ in 0..2 {
            let response = app
                .upload(Some(&user), "same.jpg", fixtures::jpeg(90, 60), None)
                .await?;
            assert_eq!(response.status(), StatusCode::CREATED);
            let body = response.json::<Value>().await?;
            originals.push(body["original_image"].as_str().unwrap().to_string());
        }

        assert_ne!(originals[0], originals[1]);
        assert_eq!(app.store.list_images(user.user_id).await?.len(), 2);
        Ok(())
    })
    .await
}
