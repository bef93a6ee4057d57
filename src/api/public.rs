use rocket::{serde::json::Json, Route};

use crate::model::{post::Post, results::ResultsView, store::Store};

pub fn routes() -> Vec<Route> {
    routes![classes, dorms, posts, results]
}

#[get("/classes")]
async fn classes(store: Store) -> Json<Vec<String>> {
    Json(store.read(|dir| dir.classes.clone()).await)
}

#[get("/dorms")]
async fn dorms(store: Store) -> Json<Vec<String>> {
    Json(store.read(|dir| dir.dorms.clone()).await)
}

#[get("/posts")]
async fn posts(store: Store) -> Json<Vec<Post>> {
    Json(store.read(|dir| dir.posts.clone()).await)
}

/// Published results, or a marker saying they are not available yet.
#[get("/results")]
async fn results(store: Store) -> Json<ResultsView> {
    Json(store.read(|dir| dir.results()).await)
}

#[cfg(test)]
mod tests {
    use rocket::{http::Status, local::asynchronous::Client, serde::json::Value};

    use super::*;
    use crate::error::Error;
    use crate::model::{candidate::Candidate, vote::Vote};

    #[backend_test]
    async fn lists_are_public(client: Client, store: Store) {
        store
            .write(|dir| {
                dir.classes.push("Form 1".to_string());
                dir.dorms.push("Kenya".to_string());
                Ok::<_, Error>(())
            })
            .await
            .unwrap();

        let response = client.get(uri!(classes)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let classes: Vec<String> = response.into_json().await.unwrap();
        assert_eq!(classes, ["Form 1"]);

        let dorms: Vec<String> = client
            .get(uri!(dorms))
            .dispatch()
            .await
            .into_json()
            .await
            .unwrap();
        assert_eq!(dorms, ["Kenya"]);
    }

    #[backend_test]
    async fn results_are_gated(client: Client, store: Store) {
        store
            .write(|dir| {
                dir.candidates = vec![
                    Candidate::example("Bob", "President", "c1"),
                    Candidate::example("Alice", "President", "c2"),
                ];
                dir.votes = vec![
                    Vote::example("1001", "President", "Alice", chrono::Utc::now()),
                    Vote::example("1002", "President", "Alice", chrono::Utc::now()),
                    Vote::example("1003", "President", "Bob", chrono::Utc::now()),
                ];
                Ok::<_, Error>(())
            })
            .await
            .unwrap();

        let body: Value = client
            .get(uri!(results))
            .dispatch()
            .await
            .into_json()
            .await
            .unwrap();
        assert_eq!(body["status"], "notPublished");
        assert!(body.get("posts").is_none());

        store
            .write(|dir| {
                dir.set_results_published(true);
                Ok::<_, Error>(())
            })
            .await
            .unwrap();

        let body: Value = client
            .get(uri!(results))
            .dispatch()
            .await
            .into_json()
            .await
            .unwrap();
        assert_eq!(body["status"], "published");
        let president = &body["posts"][0];
        assert_eq!(president["post"], "President");
        assert_eq!(president["standings"][0]["name"], "Alice");
        assert_eq!(president["standings"][0]["votes"], 2);
        assert_eq!(president["standings"][0]["leader"], true);
        assert_eq!(president["standings"][1]["leader"], false);
    }
}
