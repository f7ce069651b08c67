use std::sync::Arc;

use eyre::{eyre, Result};
use futures::Future;
use once_cell::sync::Lazy;
use reqwest::{multipart, RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};
use temp_dir::TempDir;

use thumbtier_api::{config::Config, provision, Server};
use thumbtier_db::{object_id::UserId, MemoryStore};

pub struct TestUser {
    pub user_id: UserId,
    pub username: String,
    pub token: String,
}

impl TestUser {
    pub fn user_key(&self) -> String {
        self.user_id.to_string()
    }
}

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    /// Root of the blob store. Removed when the app is dropped.
    pub storage: TempDir,
    pub base_url: String,
    pub client: reqwest::Client,
}

fn test_config(storage: &TempDir) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0, // Bind to random port
        env: "test".to_string(),
        database_url: String::new(),
        db_connections: 1,
        honeycomb_team: None,
        honeycomb_dataset: String::new(),
        cookie_key: Some("QjX+c1Nggom7lrxVTJFxMI7iQ0BRVr1oR9N64orRgdW3pp/SV+lE/1FOwo12UZj9QoBUUuv2rvcO0x+Omq+25Q==".to_string()),
        session_cookie_name: "sid".to_string(),
        session_expire_days: 1,
        storage_root: storage.path().to_path_buf(),
        media_url_base: "/media".to_string(),
        max_upload_size: 10 * 1024 * 1024,
        detect_content_type: false,
    }
}

async fn start_app(configure: impl FnOnce(&mut Config)) -> Result<TestApp> {
    Lazy::force(&thumbtier_test::TRACING);

    let storage = TempDir::new()?;
    let mut config = test_config(&storage);
    configure(&mut config);

    let store = Arc::new(MemoryStore::new());
    provision::seed_tiers(store.as_ref()).await?;

    let server = thumbtier_api::create_server(config, store.clone()).await?;
    let Server { host, port, .. } = &server;
    let base_url = format!("http://{}:{}", host, port);

    tokio::task::spawn(server.run());

    Ok(TestApp {
        store,
        storage,
        base_url,
        client: reqwest::ClientBuilder::new()
            .timeout(std::time::Duration::from_secs(30))
            .build()?,
    })
}

pub async fn run_app_test<F, R>(f: F)
where
    F: FnOnce(TestApp) -> R,
    R: Future<Output = Result<()>>,
{
    run_app_test_with(|_| {}, f).await
}

/// Like [run_app_test] but lets the test adjust the server configuration first.
pub async fn run_app_test_with<C, F, R>(configure: C, f: F)
where
    C: FnOnce(&mut Config),
    F: FnOnce(TestApp) -> R,
    R: Future<Output = Result<()>>,
{
    let app = start_app(configure).await.expect("Starting app");
    f(app).await.unwrap();
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn get(&self, path: &str, user: Option<&TestUser>) -> RequestBuilder {
        with_auth(self.client.get(self.url(path)), user)
    }

    pub fn post(&self, path: &str, user: Option<&TestUser>) -> RequestBuilder {
        with_auth(self.client.post(self.url(path)), user)
    }

    /// Create a user in the given tier and log in as them.
    pub async fn add_user(&self, username: &str, tier: Option<&str>) -> Result<TestUser> {
        let password = format!("{username}-password");
        let user =
            provision::add_user(self.store.as_ref(), username, password.clone(), tier).await?;

        let response = self
            .post("users/login", None)
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?;
        if response.status() != StatusCode::OK {
            return Err(eyre!("login failed with status {}", response.status()));
        }

        let body = response.json::<Value>().await?;
        let token = body["token"]
            .as_str()
            .ok_or_else(|| eyre!("login response had no token: {body}"))?
            .to_string();

        Ok(TestUser {
            user_id: user.user_id,
            username: username.to_string(),
            token,
        })
    }

    /// Upload `bytes` as `file_name`, with an optional `live_time` field.
    pub async fn upload(
        &self,
        user: Option<&TestUser>,
        file_name: &str,
        bytes: Vec<u8>,
        live_time: Option<&str>,
    ) -> Result<Response> {
        let mut form = multipart::Form::new().part(
            "original_image",
            multipart::Part::bytes(bytes).file_name(file_name.to_string()),
        );
        if let Some(live_time) = live_time {
            form = form.text("live_time", live_time.to_string());
        }

        Ok(self.post("images", user).multipart(form).send().await?)
    }

    /// Fetch a link returned by an upload.
    pub async fn fetch_link(&self, link: &str, user: Option<&TestUser>) -> Result<Response> {
        Ok(self.get(link, user).send().await?)
    }
}

fn with_auth(builder: RequestBuilder, user: Option<&TestUser>) -> RequestBuilder {
    match user {
        Some(user) => builder.bearer_auth(&user.token),
        None => builder,
    }
}

/// The `error` message from an error response.
pub async fn error_message(response: Response) -> Result<String> {
    let body = response.json::<Value>().await?;
    body["error"]
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| eyre!("no error message in {body}"))
}

/// Keys of a JSON object in the order they appear in the text.
pub fn keys_in_order(body: &str) -> Vec<String> {
    let value = serde_json::from_str::<Value>(body).unwrap_or(Value::Null);
    let Some(object) = value.as_object() else {
        return Vec::new();
    };

    let mut keys = object
        .keys()
        .map(|k| (body.find(&format!("\"{k}\":")).unwrap_or(usize::MAX), k.clone()))
        .collect::<Vec<_>>();
    keys.sort();
    keys.into_iter().map(|(_, k)| k).collect()
}
