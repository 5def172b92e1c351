use std::time::Duration;

use async_graphql::{Object, SimpleObject, Subscription};
use futures::Stream;
use tracing::debug;

use super::greetings::greetings;
use super::store::Store;

#[derive(SimpleObject, Clone, Debug, PartialEq, Eq)]
pub struct Author {
    pub name: String,
}

impl Author {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(SimpleObject, Clone, Debug, PartialEq, Eq)]
pub struct Book {
    pub title: String,
    /// Stored by value; not linked to the `authors` list.
    pub author: Author,
}

impl Book {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: Author::new(author),
        }
    }
}

pub struct QueryRoot {
    pub store: Store,
}

#[Object(name = "Query")]
impl QueryRoot {
    async fn books(&self) -> Vec<Book> {
        self.store.books()
    }

    async fn authors(&self) -> Vec<Author> {
        self.store.authors()
    }
}

pub struct MutationRoot {
    pub store: Store,
}

#[Object(name = "Mutation")]
impl MutationRoot {
    /// Appends a book and returns every book, the new one last.
    async fn add_book(&self, title: String, author: String) -> Vec<Book> {
        debug!(%title, %author, "adding book");
        self.store.add_book(title, author)
    }
}

pub struct SubscriptionRoot {
    pub greeting_interval: Duration,
}

#[Subscription(name = "Subscription")]
impl SubscriptionRoot {
    /// Says hello in three languages, then completes.
    async fn hello(&self) -> impl Stream<Item = String> {
        greetings(self.greeting_interval)
    }
}
