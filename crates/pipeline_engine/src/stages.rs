//! Generic stages for composing pipelines without a dedicated type

use std::fmt;
use std::marker::PhantomData;

use contracts::{Inlet, Outlet, Stage};
use tracing::warn;

/// Source stage emitting a fixed sequence
///
/// Ignores its input conduit entirely: the input conduit of a pipeline is only
/// closed once every stage finished, so a source reading it would never end.
pub struct IterSource<It> {
    name: String,
    items: Option<It>,
}

impl<It> IterSource<It> {
    pub fn new(name: impl Into<String>, items: impl IntoIterator<IntoIter = It>) -> Self {
        Self {
            name: name.into(),
            items: Some(items.into_iter()),
        }
    }
}

impl<It> fmt::Debug for IterSource<It> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterSource")
            .field("name", &self.name)
            .field("exhausted", &self.items.is_none())
            .finish()
    }
}

impl<It> Stage for IterSource<It>
where
    It: Iterator + Send,
    It::Item: Send,
{
    type Input = ();
    type Output = It::Item;

    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&mut self, _input: Inlet<()>, output: Outlet<It::Item>) {
        let Some(items) = self.items.take() else {
            return;
        };
        for item in items {
            if output.send(item).await.is_err() {
                warn!(stage = %self.name, "Output conduit closed, stopping source");
                return;
            }
        }
    }
}

/// One-to-one transform
pub struct MapStage<In, Out, F> {
    name: String,
    f: F,
    _marker: PhantomData<fn(In) -> Out>,
}

impl<In, Out, F> MapStage<In, Out, F>
where
    F: FnMut(In) -> Out,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
            _marker: PhantomData,
        }
    }
}

impl<In, Out, F> Stage for MapStage<In, Out, F>
where
    In: Send,
    Out: Send,
    F: FnMut(In) -> Out + Send,
{
    type Input = In;
    type Output = Out;

    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&mut self, input: Inlet<In>, output: Outlet<Out>) {
        while let Some(item) = input.recv().await {
            let mapped = (self.f)(item);
            if output.send(mapped).await.is_err() {
                warn!(stage = %self.name, "Output conduit closed, stopping stage");
                return;
            }
        }
    }
}

/// Zero-or-more transform per item: filtering, fan-out, or both
pub struct FlatMapStage<In, Out, F> {
    name: String,
    f: F,
    _marker: PhantomData<fn(In) -> Out>,
}

impl<In, Out, F, It> FlatMapStage<In, Out, F>
where
    F: FnMut(In) -> It,
    It: IntoIterator<Item = Out>,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
            _marker: PhantomData,
        }
    }
}

impl<In, Out, F, It> Stage for FlatMapStage<In, Out, F>
where
    In: Send,
    Out: Send,
    F: FnMut(In) -> It + Send,
    It: IntoIterator<Item = Out>,
    It::IntoIter: Send,
{
    type Input = In;
    type Output = Out;

    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&mut self, input: Inlet<In>, output: Outlet<Out>) {
        while let Some(item) = input.recv().await {
            for produced in (self.f)(item) {
                if output.send(produced).await.is_err() {
                    warn!(stage = %self.name, "Output conduit closed, stopping stage");
                    return;
                }
            }
        }
    }
}
