use std::collections::VecDeque;

use futures_util::stream::{self, Stream, StreamExt};

use super::TransactionalExecutor;
use crate::driver::ConnectionProvider;
use crate::error::SqlMiddlewareDbError;
use crate::results::CustomDbRow;

struct PageState {
    buffer: VecDeque<CustomDbRow>,
    exhausted: bool,
}

impl<P: ConnectionProvider> TransactionalExecutor<P> {
    /// Lazily page through `query` by re-running it until it returns no rows.
    ///
    /// One page is buffered at a time and its rows are yielded in order. The stream ends
    /// on the first empty page, or after yielding the first error. The query is run
    /// without parameters, so it has to make progress on its own (for example by
    /// consuming a queue table or reading from a server-side cursor).
    pub fn stream<'a>(
        &'a self,
        query: &'a str,
    ) -> impl Stream<Item = Result<CustomDbRow, SqlMiddlewareDbError>> + 'a {
        let state = PageState {
            buffer: VecDeque::new(),
            exhausted: false,
        };
        stream::unfold(state, move |mut state| async move {
            loop {
                if let Some(row) = state.buffer.pop_front() {
                    return Some((Ok(row), state));
                }
                if state.exhausted {
                    return None;
                }
                match self.query(query, &[]).await {
                    Ok(page) if page.is_empty() => {
                        state.exhausted = true;
                    }
                    Ok(page) => state.buffer.extend(page),
                    Err(e) => {
                        state.exhausted = true;
                        return Some((Err(e), state));
                    }
                }
            }
        })
        .fuse()
    }
}
