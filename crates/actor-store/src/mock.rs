//! # Mock Stores
//!
//! `MockClient<T>` hands out a real [`StoreClient<T>`] whose requests are
//! answered from a queue of expectations instead of a running actor. Use it
//! to test wrapper logic deterministically, including failures that are hard
//! to provoke with a real store (a closed actor, a persistence error).
//!
//! | | MockClient | Real StoreActor |
//! |---|---|---|
//! | **State** | None, scripted replies | Real collection + persistence |
//! | **Error Injection** | `return_err` | Requires a failing backend |
//! | **Use Case** | Logic *around* the client | The store itself, full system |
//!
//! ```rust
//! use actor_store::mock::MockClient;
//! use actor_store::{StoreEntity, StoreError};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Clone, Debug, Serialize, Deserialize)]
//! struct Shelf { id: u32 }
//! #[derive(Debug, thiserror::Error)] #[error("shelf")] struct ShelfError;
//!
//! impl StoreEntity for Shelf {
//!     type Id = u32; type Update = (); type Action = ();
//!     type ActionResult = (); type Error = ShelfError;
//!     fn id(&self) -> &u32 { &self.id }
//!     fn on_update(&mut self, _: ()) -> Result<(), ShelfError> { Ok(()) }
//!     fn handle_action(&mut self, _: ()) -> Result<(), ShelfError> { Ok(()) }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockClient::<Shelf>::new();
//!     mock.expect_get(1).return_err(StoreError::ActorClosed);
//!
//!     let result = mock.client().get(1).await;
//!     assert!(matches!(result, Err(StoreError::ActorClosed)));
//!     mock.verify();
//! }
//! ```
//!
//! For finer control, [`create_mock_client`] returns the raw receiver and the
//! `expect_*` helpers pull the next request off it.

use crate::client::StoreClient;
use crate::entity::StoreEntity;
use crate::error::StoreError;
use crate::message::StoreRequest;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Represents an expected request to the mock client.
enum Expectation<T: StoreEntity> {
    All {
        response: Result<Vec<T>, StoreError>,
    },
    Get {
        response: Result<Option<T>, StoreError>,
    },
    Upsert {
        response: Result<(), StoreError>,
    },
    Update {
        response: Result<T, StoreError>,
    },
    Action {
        response: Result<(T, T::ActionResult), StoreError>,
    },
}

type Expectations<T> = Arc<Mutex<VecDeque<Expectation<T>>>>;

/// A mock client with expectation tracking for fluent testing.
pub struct MockClient<T: StoreEntity> {
    client: StoreClient<T>,
    expectations: Expectations<T>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: StoreEntity> Default for MockClient<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: StoreEntity> MockClient<T> {
    /// Creates a new mock client with no expectations. Must be called inside a Tokio runtime.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<StoreRequest<T>>(100);
        let expectations: Expectations<T> = Arc::new(Mutex::new(VecDeque::new()));
        let queue = expectations.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let expectation = queue.lock().unwrap().pop_front();

                match (request, expectation) {
                    (StoreRequest::All { respond_to }, Some(Expectation::All { response })) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        StoreRequest::Get { respond_to, .. },
                        Some(Expectation::Get { response }),
                    ) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        StoreRequest::Upsert { respond_to, .. },
                        Some(Expectation::Upsert { response }),
                    ) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        StoreRequest::Update { respond_to, .. },
                        Some(Expectation::Update { response }),
                    ) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        StoreRequest::Action { respond_to, .. },
                        Some(Expectation::Action { response }),
                    ) => {
                        let _ = respond_to.send(response);
                    }
                    (request, _) => {
                        panic!("Unexpected request or expectation mismatch: {request:?}");
                    }
                }
            }
        });

        Self {
            client: StoreClient::new(sender),
            expectations,
            _handle: handle,
        }
    }

    /// Returns the client for use in tests.
    pub fn client(&self) -> StoreClient<T> {
        self.client.clone()
    }

    pub fn expect_all(&mut self) -> Expect<T, Vec<T>> {
        Expect::new(self.expectations.clone(), |response| Expectation::All {
            response,
        })
    }

    /// The id is accepted for readability at the call site; replies are matched by order.
    pub fn expect_get(&mut self, _id: T::Id) -> Expect<T, Option<T>> {
        Expect::new(self.expectations.clone(), |response| Expectation::Get {
            response,
        })
    }

    pub fn expect_upsert(&mut self) -> Expect<T, ()> {
        Expect::new(self.expectations.clone(), |response| Expectation::Upsert {
            response,
        })
    }

    pub fn expect_update(&mut self, _id: T::Id) -> Expect<T, T> {
        Expect::new(self.expectations.clone(), |response| Expectation::Update {
            response,
        })
    }

    pub fn expect_action(&mut self, _id: T::Id) -> Expect<T, (T, T::ActionResult)> {
        Expect::new(self.expectations.clone(), |response| Expectation::Action {
            response,
        })
    }

    /// Panics unless every expectation was consumed.
    pub fn verify(&self) {
        let remaining = self.expectations.lock().unwrap().len();
        if remaining != 0 {
            panic!("Not all expectations were met. {remaining} remaining");
        }
    }
}

/// Builder returned by the `expect_*` methods.
pub struct Expect<T: StoreEntity, R> {
    expectations: Expectations<T>,
    wrap: fn(Result<R, StoreError>) -> Expectation<T>,
}

impl<T: StoreEntity, R> Expect<T, R> {
    fn new(expectations: Expectations<T>, wrap: fn(Result<R, StoreError>) -> Expectation<T>) -> Self {
        Self { expectations, wrap }
    }

    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: R) {
        self.expectations
            .lock()
            .unwrap()
            .push_back((self.wrap)(Ok(value)));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: StoreError) {
        self.expectations
            .lock()
            .unwrap()
            .push_back((self.wrap)(Err(error)));
    }
}

/// Creates a client and the receiver its requests arrive on.
pub fn create_mock_client<T: StoreEntity>(
    buffer_size: usize,
) -> (StoreClient<T>, mpsc::Receiver<StoreRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (StoreClient::new(sender), receiver)
}

/// Pulls the next request and returns it if it is a Get.
pub async fn expect_get<T: StoreEntity>(
    receiver: &mut mpsc::Receiver<StoreRequest<T>>,
) -> Option<(T::Id, crate::message::Response<Option<T>>)> {
    match receiver.recv().await {
        Some(StoreRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Pulls the next request and returns it if it is an Upsert.
pub async fn expect_upsert<T: StoreEntity>(
    receiver: &mut mpsc::Receiver<StoreRequest<T>>,
) -> Option<(T, Option<T::Id>, crate::message::Response<()>)> {
    match receiver.recv().await {
        Some(StoreRequest::Upsert {
            item,
            replacing,
            respond_to,
        }) => Some((item, replacing, respond_to)),
        _ => None,
    }
}

/// Pulls the next request and returns it if it is an Action.
pub async fn expect_action<T: StoreEntity>(
    receiver: &mut mpsc::Receiver<StoreRequest<T>>,
) -> Option<(T::Id, T::Action, crate::message::Response<(T, T::ActionResult)>)> {
    match receiver.recv().await {
        Some(StoreRequest::Action {
            id,
            action,
            respond_to,
        }) => Some((id, action, respond_to)),
        _ => None,
    }
}
