//! Launch independent sub-operations together and keep every outcome.

use std::future::Future;

use futures::future::join_all;

/// Results of a settled fan-out, in launch order.
#[derive(Debug)]
pub struct Settled<T, E> {
    pub results: Vec<Result<T, E>>,
}

impl<T, E> Settled<T, E> {
    pub fn all_ok(&self) -> bool {
        self.results.iter().all(Result::is_ok)
    }

    /// Pair each result with the input it was launched for.
    pub fn zip<I>(self, inputs: I) -> impl Iterator<Item = (I::Item, Result<T, E>)>
    where
        I: IntoIterator,
    {
        inputs.into_iter().zip(self.results)
    }
}

/// Run all futures concurrently and wait for every one of them.
/// A failing future never cancels its siblings.
pub async fn join_settled<I, F, T, E>(futures: I) -> Settled<T, E>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T, E>>,
{
    Settled {
        results: join_all(futures).await,
    }
}
