//! Integration tests for the enriched movie detail endpoint.

mod common;

use common::TestHarness;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

fn details_json() -> serde_json::Value {
    serde_json::json!({
        "id": 27205,
        "title": "Inception",
        "poster_path": "/inception.jpg",
        "backdrop_path": "/inception-wide.jpg",
        "release_date": "2010-07-16",
        "tagline": "Your mind is the scene of the crime.",
        "overview": "A thief who steals corporate secrets.",
        "genres": [
            {"id": 28, "name": "Action"},
            {"id": 878, "name": "Science Fiction"}
        ],
        "vote_average": 8.4
    })
}

fn credits_json() -> serde_json::Value {
    serde_json::json!({
        "cast": [
            {"name": "Leonardo DiCaprio", "order": 0},
            {"name": "Joseph Gordon-Levitt", "order": 1},
            {"name": "Elliot Page", "order": 2},
            {"name": "Tom Hardy", "order": 3},
            {"name": "Ken Watanabe", "order": 4},
            {"name": "Cillian Murphy", "order": 5}
        ],
        "crew": [
            {"name": "Emma Thomas", "job": "Producer"},
            {"name": "Christopher Nolan", "job": "Director"}
        ]
    })
}

async fn mount_movie(h: &TestHarness, details: serde_json::Value, credits: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/movie/27205"))
        .respond_with(ResponseTemplate::new(200).set_body_json(details))
        .mount(&h.tmdb)
        .await;
    Mock::given(method("GET"))
        .and(path("/movie/27205/credits"))
        .respond_with(ResponseTemplate::new(200).set_body_json(credits))
        .mount(&h.tmdb)
        .await;
}

#[tokio::test]
async fn detail_joins_details_and_credits() {
    let h = TestHarness::start().await;
    mount_movie(&h, details_json(), credits_json()).await;

    let resp = reqwest::get(h.url("/api/movie/27205")).await.unwrap();
    assert_eq!(resp.status(), 200);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["id"], 27205);
    assert_eq!(json["title"], "Inception");
    assert_eq!(json["poster_path"], "/inception.jpg");
    assert_eq!(json["backdrop_path"], "/inception-wide.jpg");
    assert_eq!(json["director"], "Christopher Nolan");
    assert_eq!(json["tagline"], "YOUR MIND IS THE SCENE OF THE CRIME.");
    assert_eq!(
        json["genres"],
        serde_json::json!(["Action", "Science Fiction"])
    );

    let actors = json["actors"].as_array().unwrap();
    assert_eq!(actors.len(), 5);
    assert_eq!(actors[0], "Leonardo DiCaprio");
    assert_eq!(actors[4], "Ken Watanabe");
}

#[tokio::test]
async fn detail_falls_back_to_unknown_director() {
    let h = TestHarness::start().await;

    let mut credits = credits_json();
    credits["crew"] = serde_json::json!([{"name": "Emma Thomas", "job": "Producer"}]);
    mount_movie(&h, details_json(), credits).await;

    let resp = reqwest::get(h.url("/api/movie/27205")).await.unwrap();
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["director"], "Unknown");
}

#[tokio::test]
async fn detail_empty_tagline_stays_empty() {
    let h = TestHarness::start().await;

    let mut details = details_json();
    details["tagline"] = serde_json::Value::Null;
    mount_movie(&h, details, credits_json()).await;

    let resp = reqwest::get(h.url("/api/movie/27205")).await.unwrap();
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["tagline"], "");
}

#[tokio::test]
async fn detail_fails_whole_request_when_credits_fail() {
    let h = TestHarness::start().await;

    Mock::given(method("GET"))
        .and(path("/movie/27205"))
        .respond_with(ResponseTemplate::new(200).set_body_json(details_json()))
        .mount(&h.tmdb)
        .await;
    Mock::given(method("GET"))
        .and(path("/movie/27205/credits"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&h.tmdb)
        .await;

    let resp = reqwest::get(h.url("/api/movie/27205")).await.unwrap();
    assert_eq!(resp.status(), 500);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["error"], "Failed to get movie details");
}

#[tokio::test]
async fn detail_fails_when_movie_is_unknown_upstream() {
    let h = TestHarness::start().await;
    // Nothing mounted: the mock answers 404 for both endpoints.

    let resp = reqwest::get(h.url("/api/movie/99999")).await.unwrap();
    assert_eq!(resp.status(), 500);
}

#[tokio::test]
async fn detail_rejects_non_numeric_id() {
    let h = TestHarness::start().await;

    let resp = reqwest::get(h.url("/api/movie/inception")).await.unwrap();
    assert_eq!(resp.status(), 400);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["error"], "Invalid movie id");
}
