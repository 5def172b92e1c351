use cynic::{MutationBuilder as _, QueryBuilder as _};
use futures::future::join_all;
use reqwest::StatusCode;
use reqwest::header::{ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN};
use serde_json::{Value, json};

use crate::client::{AddBook, AddBookArguments, Author, Book, Client, Library};
use crate::config::Transport;
use crate::server::Store;


use testserver::Server;

fn book(title: &str, author: &str) -> Book {
    Book {
        title: title.into(),
        author: Author {
            name: author.into(),
        },
    }
}

async fn library(client: &Client) -> Library {
    client.run(Library::build(())).await.data.unwrap()
}

async fn add_book(client: &Client, title: &str, author: &str) -> Vec<Book> {
    let op = AddBook::build(AddBookArguments {
        title: title.into(),
        author: author.into(),
    });
    client.run(op).await.data.unwrap().add_book
}

#[tokio::test]
async fn seeded_library() {
    let server = Server::start().await;
    let client = Client::new(server.graphql_url());

    let library = library(&client).await;

    assert_eq!(
        library.books,
        [
            book("The Awkening", "Kate Chopin"),
            book("City of Glass", "Paul Auster"),
        ]
    );
    let authors: Vec<_> = library.authors.into_iter().map(|a| a.name).collect();
    assert_eq!(authors, ["Robert Kyosaki", "Paul Auster"]);
}

#[tokio::test]
async fn add_book_appends_one_entry() {
    let server = Server::start().await;
    let client = Client::new(server.graphql_url());
    let before = library(&client).await;

    let returned = add_book(&client, "X", "Y").await;

    assert_eq!(returned.len(), before.books.len() + 1);
    assert_eq!(returned.last(), Some(&book("X", "Y")));

    let after = library(&client).await;
    assert_eq!(after.books, returned);
    assert_eq!(after.authors, before.authors);
}

#[tokio::test]
async fn sequential_additions_keep_call_order() {
    let server = Server::start().await;
    let client = Client::new(server.graphql_url());

    add_book(&client, "Moon Palace", "Paul Auster").await;
    add_book(&client, "Leviathan", "Paul Auster").await;

    let titles: Vec<_> = library(&client)
        .await
        .books
        .into_iter()
        .map(|b| b.title)
        .collect();
    assert_eq!(
        titles,
        ["The Awkening", "City of Glass", "Moon Palace", "Leviathan"]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_additions_are_all_applied() {
    let store = Store::seeded();
    let server = Server::with_store(Transport::Dual, store.clone()).await;
    let client = Client::new(server.graphql_url());

    let titles: Vec<String> = (0..16).map(|i| format!("Volume {i}")).collect();
    let results = join_all(titles.iter().map(|title| add_book(&client, title, "Anonymous"))).await;

    for (title, books) in titles.iter().zip(&results) {
        assert_eq!(books.last().map(|b| &b.title), Some(title));
    }

    let books = library(&client).await.books;
    assert_eq!(books.len(), 2 + titles.len());
    for title in &titles {
        assert_eq!(books.iter().filter(|b| &b.title == title).count(), 1);
    }
    // each mutation returned a prefix of the final list, so none interleaved
    for returned in &results {
        assert_eq!(returned[..], books[..returned.len()]);
    }
    // what went over the wire is what the store holds
    let stored: Vec<_> = store.books().into_iter().map(|b| b.title).collect();
    let served: Vec<_> = books.into_iter().map(|b| b.title).collect();
    assert_eq!(stored, served);
}

#[tokio::test]
async fn omitted_argument_is_a_graphql_error() {
    let server = Server::start().await;
    let http = reqwest::Client::new();

    let response: Value = http
        .post(server.graphql_url())
        .json(&json!({ "query": r#"mutation { addBook(title: "X") { title } }"# }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(response["errors"].as_array().is_some_and(|e| !e.is_empty()));

    let client = Client::new(server.graphql_url());
    assert_eq!(library(&client).await.books.len(), 2);
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let server = Server::start().await;

    let response = reqwest::Client::new()
        .post(server.graphql_url())
        .header(ORIGIN, "http://example.com")
        .json(&json!({ "query": "{ authors { name } }" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn graphiql_is_served_on_get() {
    let server = Server::start().await;

    let page = reqwest::get(server.graphql_url())
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(page.contains("/subscription"));
}

#[tokio::test]
async fn subscription_route_depends_on_transport() {
    let single = Server::with_store(Transport::Single, Store::seeded()).await;
    let status = reqwest::get(single.url(&single.config.subscription_path))
        .await
        .unwrap()
        .status();
    assert_eq!(status, StatusCode::NOT_FOUND);

    // A plain GET without the upgrade handshake still reaches the route.
    let dual = Server::start().await;
    let status = reqwest::get(dual.url(&dual.config.subscription_path))
        .await
        .unwrap()
        .status();
    assert_ne!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn shutdown_closes_the_port() {
    let server = Server::start().await;
    let socket = server.socket();
    let client = Client::new(server.graphql_url());
    library(&client).await;

    tokio::time::timeout(std::time::Duration::from_secs(10), server.shutdown())
        .await
        .expect("shutdown should drain both transports");

    assert!(tokio::net::TcpStream::connect(socket).await.is_err());
}
