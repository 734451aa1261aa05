//! GraphQL discussion retrieval.
//!
//! Discussions are only exposed through the GraphQL API. Access failures
//! (disabled discussions, insufficient token scope, transport errors) all
//! degrade to whatever has been collected so far; the caller never sees an
//! error from this path.

use octocrab::Octocrab;
use serde_json::{Value, json};
use tracing::debug;

use crate::github::locator::RepositoryLocator;
use crate::github::models::RawDiscussion;

const DISCUSSIONS_QUERY: &str = "
query($owner: String!, $repo: String!, $first: Int!, $after: String) {
    repository(owner: $owner, name: $repo) {
        discussions(first: $first, after: $after, orderBy: {field: CREATED_AT, direction: DESC}) {
            pageInfo {
                hasNextPage
                endCursor
            }
            nodes {
                number
                title
                body
                state
                createdAt
                updatedAt
                author {
                    login
                }
                comments {
                    totalCount
                }
                category {
                    name
                }
                labels(first: 10) {
                    nodes {
                        name
                    }
                }
            }
        }
    }
}
";

/// Fetches up to `max_count` discussions created at or after `since`.
pub(super) async fn fetch_discussions(
    client: &Octocrab,
    locator: &RepositoryLocator,
    since: Option<&str>,
    max_count: usize,
) -> Vec<RawDiscussion> {
    let mut collected: Vec<RawDiscussion> = Vec::new();
    let mut cursor: Option<String> = None;

    while collected.len() < max_count {
        let payload = json!({
            "query": DISCUSSIONS_QUERY,
            "variables": {
                "owner": locator.owner().as_str(),
                "repo": locator.repository().as_str(),
                "first": 100.min(max_count - collected.len()),
                "after": cursor,
            },
        });

        let response: Value = match client.graphql(&payload).await {
            Ok(response) => response,
            Err(error) => {
                debug!(%error, "discussion query failed; returning partial results");
                break;
            }
        };
        if response.get("errors").is_some() {
            debug!("discussion query returned errors; returning partial results");
            break;
        }

        let Some(discussions) = response.pointer("/data/repository/discussions") else {
            break;
        };
        let nodes = discussions
            .pointer("/nodes")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        if nodes.is_empty() {
            break;
        }

        for node in &nodes {
            if let Some(since) = since {
                let created_at = node.pointer("/createdAt").and_then(Value::as_str);
                if created_at.is_some_and(|created| created < since) {
                    continue;
                }
            }
            collected.push(discussion_from_node(node));
            if collected.len() >= max_count {
                break;
            }
        }

        let has_next = discussions
            .pointer("/pageInfo/hasNextPage")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if !has_next {
            break;
        }
        cursor = discussions
            .pointer("/pageInfo/endCursor")
            .and_then(Value::as_str)
            .map(ToOwned::to_owned);
    }

    collected
}

fn discussion_from_node(node: &Value) -> RawDiscussion {
    let string_at = |pointer: &str| {
        node.pointer(pointer)
            .and_then(Value::as_str)
            .map(ToOwned::to_owned)
    };

    let state = node.pointer("/state").and_then(Value::as_str).map(|state| {
        if state == "OPEN" {
            "open".to_owned()
        } else {
            "closed".to_owned()
        }
    });

    let labels = node
        .pointer("/labels/nodes")
        .and_then(Value::as_array)
        .map(|nodes| {
            nodes
                .iter()
                .filter_map(|label| label.pointer("/name").and_then(Value::as_str))
                .map(ToOwned::to_owned)
                .collect()
        })
        .unwrap_or_default();

    RawDiscussion {
        number: node.pointer("/number").and_then(Value::as_u64).unwrap_or(0),
        title: string_at("/title"),
        body: string_at("/body"),
        state,
        labels,
        created_at: string_at("/createdAt"),
        updated_at: string_at("/updatedAt"),
        author: string_at("/author/login"),
        comments: node
            .pointer("/comments/totalCount")
            .and_then(Value::as_u64)
            .unwrap_or(0),
        category: string_at("/category/name"),
    }
}
