use std::sync::Arc;

use commune_api::app::{build_app, AppServices};
use commune_auth::Credentials;
use reqwest::StatusCode;
use serde_json::{json, Value};

const SECRET: &str = "test-secret";
const PASSWORD: &str = "Str0ng!pass";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod over an in-memory store, on an ephemeral port.
        let services = AppServices::in_memory(Credentials::new(SECRET).with_hash_cost(4));
        let app = build_app(Arc::new(services));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn api(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

struct SignedUp {
    id: String,
    token: String,
}

async fn signup(client: &reqwest::Client, srv: &TestServer, name: &str) -> SignedUp {
    let res = client
        .post(srv.api("/auth/signup"))
        .json(&json!({
            "name": name,
            "email": format!("{}@example.com", name.to_lowercase()),
            "password": PASSWORD,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    SignedUp {
        id: body["content"]["data"]["id"].as_str().unwrap().to_string(),
        token: body["content"]["meta"]["access_token"].as_str().unwrap().to_string(),
    }
}

async fn post_json(client: &reqwest::Client, url: String, token: Option<&str>, body: Value) -> reqwest::Response {
    let mut req = client.post(url).json(&body);
    if let Some(token) = token {
        req = req.bearer_auth(token);
    }
    req.send().await.unwrap()
}

async fn create_role(client: &reqwest::Client, srv: &TestServer, name: &str) -> String {
    let res = post_json(client, srv.api("/role"), None, json!({ "name": name })).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    body["content"]["data"]["id"].as_str().unwrap().to_string()
}

async fn create_community(client: &reqwest::Client, srv: &TestServer, token: &str, name: &str) -> Value {
    let res = post_json(client, srv.api("/community"), Some(token), json!({ "name": name })).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    body["content"]["data"].clone()
}

async fn add_member(
    client: &reqwest::Client,
    srv: &TestServer,
    token: &str,
    community: &str,
    user: &str,
    role: &str,
) -> reqwest::Response {
    post_json(
        client,
        srv.api("/member"),
        Some(token),
        json!({ "community": community, "user": user, "role": role }),
    )
    .await
}

#[tokio::test]
async fn root_and_health_respond() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "success": true, "message": "API is working" }));

    let res = client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn signup_sets_cookie_and_me_reads_it() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.api("/auth/signup"))
        .json(&json!({ "name": "Alice", "email": "alice@example.com", "password": PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let set_cookie = res
        .headers()
        .get(reqwest::header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("access_token="));
    assert!(set_cookie.contains("HttpOnly"));

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], true);
    assert_eq!(body["content"]["data"]["email"], "alice@example.com");
    assert!(body["content"]["data"].get("password").is_none());
    assert!(body["content"]["data"].get("password_hash").is_none());

    // Replay the cookie alone, as a browser would.
    let cookie_pair = set_cookie.split(';').next().unwrap().to_string();
    let res = client
        .get(srv.api("/auth/me"))
        .header(reqwest::header::COOKIE, cookie_pair)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let me: Value = res.json().await.unwrap();
    assert_eq!(me["content"]["data"]["name"], "Alice");
    assert_eq!(me["content"]["data"]["id"], body["content"]["data"]["id"]);
}

#[tokio::test]
async fn signin_accepts_good_and_rejects_bad_credentials() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    signup(&client, &srv, "Bob").await;

    let res = post_json(
        &client,
        srv.api("/auth/signin"),
        None,
        json!({ "email": "bob@example.com", "password": PASSWORD }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert!(body["content"]["meta"]["access_token"].as_str().is_some());

    for (email, password) in [("bob@example.com", "Wr0ng!pass"), ("ghost@example.com", PASSWORD)] {
        let res = post_json(
            &client,
            srv.api("/auth/signin"),
            None,
            json!({ "email": email, "password": password }),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["status"], false);
        assert_eq!(body["error"], "invalid_credentials");
        assert_eq!(body["message"], "Invalid email or password");
    }
}

#[tokio::test]
async fn duplicate_signup_and_bad_body_are_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    signup(&client, &srv, "Carol").await;

    let res = post_json(
        &client,
        srv.api("/auth/signup"),
        None,
        json!({ "name": "Carol", "email": "carol@example.com", "password": PASSWORD }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "conflict");
    assert_eq!(body["message"], "Email already exists");

    let res = client
        .post(srv.api("/auth/signup"))
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.api("/auth/me")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], false);
    assert_eq!(body["error"], "unauthorized");

    let res = client
        .get(srv.api("/community/me/owner"))
        .bearer_auth("not.a.token")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Signed with another secret.
    let foreign = Credentials::new("other-secret")
        .issue_token(commune_core::UserId::new())
        .unwrap();
    let res = post_json(&client, srv.api("/community"), Some(&foreign), json!({ "name": "Nope" })).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Correct secret, but the user does not exist.
    let orphan = Credentials::new(SECRET).issue_token(commune_core::UserId::new()).unwrap();
    let res = client.get(srv.api("/auth/me")).bearer_auth(orphan).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn role_listing_paginates_and_clamps() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.api("/role")).send().await.unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["content"]["meta"], json!({ "total": 0, "pages": 0, "page": 0 }));
    assert_eq!(body["content"]["data"], json!([]));

    for n in 0..23 {
        create_role(&client, &srv, &format!("role-{n:02}")).await;
    }

    let res = client.get(srv.api("/role?page=3")).send().await.unwrap();
    let last: Value = res.json().await.unwrap();
    assert_eq!(last["content"]["meta"], json!({ "total": 23, "pages": 3, "page": 3 }));
    assert_eq!(last["content"]["data"].as_array().unwrap().len(), 3);

    let res = client.get(srv.api("/role?page=8")).send().await.unwrap();
    let beyond: Value = res.json().await.unwrap();
    assert_eq!(beyond["content"], last["content"]);

    let res = client.get(srv.api("/role?page=zero")).send().await.unwrap();
    let first: Value = res.json().await.unwrap();
    assert_eq!(first["content"]["meta"]["page"], 1);
    assert_eq!(first["content"]["data"][0]["name"], "role-00");
}

#[tokio::test]
async fn malformed_query_string_uses_the_error_envelope() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    for path in ["/role?page=1&page=2", "/community?page=1&page=2"] {
        let res = client.get(srv.api(path)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let content_type = res.headers()[reqwest::header::CONTENT_TYPE].to_str().unwrap().to_string();
        assert!(content_type.starts_with("application/json"), "{path}: {content_type}");
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["status"], false);
        assert_eq!(body["error"], "validation_error");
        assert!(body["message"].as_str().unwrap().contains("page"));
    }
}

#[tokio::test]
async fn community_round_trip_and_listings() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let alice = signup(&client, &srv, "Alice").await;
    let bob = signup(&client, &srv, "Bob").await;

    let created = create_community(&client, &srv, &alice.token, "Rustaceans").await;
    assert_eq!(created["slug"], "Rustaceans");
    assert_eq!(created["owner"], alice.id.as_str());

    let res = client.get(srv.api("/community")).send().await.unwrap();
    let all: Value = res.json().await.unwrap();
    let listed = &all["content"]["data"][0];
    assert_eq!(listed["id"], created["id"]);
    assert_eq!(listed["name"], "Rustaceans");
    assert_eq!(listed["slug"], "Rustaceans");
    assert_eq!(listed["owner"], json!({ "id": alice.id, "name": "Alice" }));

    let res = post_json(&client, srv.api("/community"), Some(&bob.token), json!({ "name": "Rustaceans" })).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Community slug already exists");

    let res = client
        .get(srv.api("/community/me/owner"))
        .bearer_auth(&alice.token)
        .send()
        .await
        .unwrap();
    let owned: Value = res.json().await.unwrap();
    assert_eq!(owned["content"]["meta"]["total"], 1);
    assert_eq!(owned["content"]["data"][0]["owner"], alice.id.as_str());

    let role = create_role(&client, &srv, "Community Member").await;
    let community_id = created["id"].as_str().unwrap();
    let res = add_member(&client, &srv, &alice.token, community_id, &bob.id, &role).await;
    assert_eq!(res.status(), StatusCode::OK);
    let added: Value = res.json().await.unwrap();
    assert_eq!(added["content"]["data"]["user"], bob.id.as_str());

    let res = client
        .get(srv.api("/community/me/member"))
        .bearer_auth(&bob.token)
        .send()
        .await
        .unwrap();
    let joined: Value = res.json().await.unwrap();
    assert_eq!(joined["content"]["meta"]["total"], 1);
    assert_eq!(joined["content"]["data"][0]["id"], created["id"]);
    assert_eq!(joined["content"]["data"][0]["owner"]["name"], "Alice");

    let res = client
        .get(srv.api(&format!("/community/{community_id}/member")))
        .send()
        .await
        .unwrap();
    let members: Value = res.json().await.unwrap();
    assert_eq!(members["content"]["data"][0]["user"], json!({ "id": bob.id, "name": "Bob" }));
    assert_eq!(members["content"]["data"][0]["role"]["name"], "Community Member");
}

#[tokio::test]
async fn member_removal_honours_owner_and_moderator() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let alice = signup(&client, &srv, "Alice").await;
    let bob = signup(&client, &srv, "Bob").await;
    let carol = signup(&client, &srv, "Carol").await;
    let dave = signup(&client, &srv, "Dave").await;

    let foo = create_community(&client, &srv, &alice.token, "Foo").await;
    let foo_id = foo["id"].as_str().unwrap();
    let moderator = create_role(&client, &srv, "Community Moderator").await;
    let plain = create_role(&client, &srv, "Community Member").await;

    // Only the owner may add members.
    let res = add_member(&client, &srv, &bob.token, foo_id, &bob.id, &moderator).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Not Allowed Access");

    let mut member_ids = Vec::new();
    for (user, role) in [(&bob.id, &moderator), (&carol.id, &plain), (&dave.id, &plain)] {
        let res = add_member(&client, &srv, &alice.token, foo_id, user, role).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await.unwrap();
        member_ids.push(body["content"]["data"]["id"].as_str().unwrap().to_string());
    }
    let (carol_member, dave_member) = (&member_ids[1], &member_ids[2]);

    // A plain member cannot remove anyone.
    let res = client
        .delete(srv.api(&format!("/member/{dave_member}")))
        .bearer_auth(&carol.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // The moderator can.
    let res = client
        .delete(srv.api(&format!("/member/{dave_member}")))
        .bearer_auth(&bob.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "status": true }));

    // So can the owner.
    let res = client
        .delete(srv.api(&format!("/member/{carol_member}")))
        .bearer_auth(&alice.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .delete(srv.api(&format!("/member/{carol_member}")))
        .bearer_auth(&alice.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Member not found");

    let res = client
        .get(srv.api(&format!("/community/{foo_id}/member")))
        .send()
        .await
        .unwrap();
    let members: Value = res.json().await.unwrap();
    assert_eq!(members["content"]["meta"]["total"], 1);
}
